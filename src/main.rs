use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use expense_tracker::app::build_router;
use expense_tracker::config::{AppConfig, StorageBackend};
use expense_tracker::repositories::expense_repository::{
    ExpenseRepository, InMemoryExpenseRepository,
};
use expense_tracker::repositories::json_file_repository::JsonFileExpenseRepository;
use expense_tracker::repositories::postgres_expense_repository::PostgresExpenseRepository;
use expense_tracker::repositories::seed_source::{
    default_seed, JsonSeedSource, SeedSource, StaticSeedSource,
};
use expense_tracker::services::expense_service::{ExpenseService, ExpenseServiceImpl};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Pick the storage backend
    let (expense_repository, seed_source): (Arc<dyn ExpenseRepository>, Arc<dyn SeedSource>) =
        match config.storage_backend {
            StorageBackend::JsonFile => {
                tracing::info!(
                    file = %config.expenses_file.display(),
                    seed = %config.seed_file.display(),
                    "using JSON file storage"
                );
                (
                    Arc::new(JsonFileExpenseRepository::new(&config.expenses_file)),
                    Arc::new(JsonSeedSource::new(&config.seed_file)),
                )
            }
            StorageBackend::Memory => {
                tracing::info!("using in-memory storage with the built-in seed");
                (
                    Arc::new(InMemoryExpenseRepository::with_expenses(default_seed())),
                    Arc::new(StaticSeedSource::builtin()),
                )
            }
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().unwrap_or_default();
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect(database_url)
                    .await?;
                tracing::info!("connected to database");

                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("migrations completed");

                (
                    Arc::new(PostgresExpenseRepository::new(pool)),
                    Arc::new(JsonSeedSource::new(&config.seed_file)),
                )
            }
        };

    let expense_service: Arc<dyn ExpenseService> =
        Arc::new(ExpenseServiceImpl::new(expense_repository, seed_source));

    let app = build_router(expense_service);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("server running on http://{}", addr);
    tracing::info!("  - Expenses: GET/POST http://{}/api/expenses", addr);
    tracing::info!("  - Reset: POST http://{}/api/expenses/reset", addr);
    tracing::info!("  - API Docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
