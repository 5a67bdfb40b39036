use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::expense_handlers::{
    create_expense_handler, health_check, list_expenses_handler, reset_expenses_handler,
    ErrorResponse,
};
use crate::models::expense::{Expense, NewExpenseRequest, ResetResponse, SortOrder};
use crate::services::expense_service::ExpenseService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::expense_handlers::list_expenses_handler,
        crate::handlers::expense_handlers::create_expense_handler,
        crate::handlers::expense_handlers::reset_expenses_handler,
        crate::handlers::expense_handlers::health_check,
    ),
    components(
        schemas(Expense, NewExpenseRequest, ResetResponse, SortOrder, ErrorResponse)
    ),
    tags(
        (name = "expenses", description = "Shared expense endpoints"),
        (name = "health", description = "Liveness probe")
    ),
    info(
        title = "Expense Tracker API",
        version = "0.1.0",
        description = "REST API for tracking shared expenses",
    )
)]
pub struct ApiDoc;

/// Build the application router around an expense service
pub fn build_router(expense_service: Arc<dyn ExpenseService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/expenses",
            get(list_expenses_handler).post(create_expense_handler),
        )
        .route("/api/expenses/reset", post(reset_expenses_handler))
        .with_state(expense_service)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
