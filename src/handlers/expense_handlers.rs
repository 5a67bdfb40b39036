use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::models::expense::{Expense, ListExpensesQuery, NewExpenseRequest, ResetResponse};
use crate::services::expense_service::{ExpenseError, ExpenseService};

/// Error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

fn bad_request(error_type: &str, message: &str) -> Response {
    let error_response = ErrorResponse::new(error_type, message);
    (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
}

/// Convert ExpenseError to HTTP response
impl IntoResponse for ExpenseError {
    fn into_response(self) -> Response {
        let (status, error_type) = match self {
            ExpenseError::MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
            ExpenseError::InvalidAmount => (StatusCode::BAD_REQUEST, "invalid_amount"),
            ExpenseError::DuplicateId(_) => (StatusCode::BAD_REQUEST, "duplicate_id"),
            ExpenseError::StorageReadFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_read_failure")
            }
            ExpenseError::StorageWriteFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_write_failure")
            }
            ExpenseError::SeedUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "seed_unavailable")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "expense request failed");
        }

        let error_response = ErrorResponse::new(error_type, &self.to_string());
        (status, Json(error_response)).into_response()
    }
}

/// Handler for listing expenses
///
/// Returns every stored expense in insertion order unless a sort order is given.
#[utoipa::path(
    get,
    path = "/api/expenses",
    params(ListExpensesQuery),
    responses(
        (status = 200, description = "List of expenses", body = Vec<Expense>),
        (status = 400, description = "Unknown sort order", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn list_expenses_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    query: Result<Query<ListExpensesQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, Response> {
    let Query(query) =
        query.map_err(|rejection| bad_request("invalid_query", &rejection.body_text()))?;

    let expenses = match query.sort {
        Some(order) => expense_service.get_sorted(order).await,
        None => expense_service.get_all().await,
    };
    Ok(Json(expenses))
}

/// Handler for adding an expense
#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = NewExpenseRequest,
    responses(
        (status = 201, description = "Expense successfully created", body = Expense),
        (status = 400, description = "Missing field, invalid amount or duplicate id", body = ErrorResponse),
        (status = 500, description = "Failed to save expense", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn create_expense_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
    payload: Result<Json<NewExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), Response> {
    let Json(request) =
        payload.map_err(|rejection| bad_request("invalid_body", &rejection.body_text()))?;

    match expense_service.add(request).await {
        Ok(expense) => Ok((StatusCode::CREATED, Json(expense))),
        Err(e) => Err(e.into_response()),
    }
}

/// Handler for resetting expenses
///
/// Overwrites the store with the seed dataset.
#[utoipa::path(
    post,
    path = "/api/expenses/reset",
    responses(
        (status = 200, description = "Expenses restored to seed data", body = ResetResponse),
        (status = 500, description = "Seed data unavailable or write failed", body = ErrorResponse)
    ),
    tag = "expenses"
)]
pub async fn reset_expenses_handler(
    State(expense_service): State<Arc<dyn ExpenseService>>,
) -> Result<Json<ResetResponse>, Response> {
    match expense_service.reset().await {
        Ok(data) => Ok(Json(ResetResponse {
            message: "Expenses reset to seed data".to_string(),
            count: data.len(),
            data,
        })),
        Err(e) => Err(e.into_response()),
    }
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String)),
    tag = "health"
)]
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::expense_repository::{
        ExpenseRepository, InMemoryExpenseRepository, RepositoryError,
    };
    use crate::repositories::seed_source::{default_seed, StaticSeedSource};
    use crate::services::expense_service::ExpenseServiceImpl;
    use async_trait::async_trait;
    use serde_json::json;

    // Mock ExpenseRepository whose writes always fail
    struct FailingExpenseRepository;

    #[async_trait]
    impl ExpenseRepository for FailingExpenseRepository {
        async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
            Err(RepositoryError::ReadFailed("unexpected end of file".to_string()))
        }

        async fn insert(&self, _expense: Expense) -> Result<Expense, RepositoryError> {
            Err(RepositoryError::WriteFailed("read-only file system".to_string()))
        }

        async fn replace_all(
            &self,
            _expenses: Vec<Expense>,
        ) -> Result<Vec<Expense>, RepositoryError> {
            Err(RepositoryError::WriteFailed("read-only file system".to_string()))
        }
    }

    fn seeded_service() -> Arc<dyn ExpenseService> {
        Arc::new(ExpenseServiceImpl::new(
            Arc::new(InMemoryExpenseRepository::with_expenses(default_seed())),
            Arc::new(StaticSeedSource::builtin()),
        ))
    }

    fn failing_service() -> Arc<dyn ExpenseService> {
        Arc::new(ExpenseServiceImpl::new(
            Arc::new(FailingExpenseRepository),
            Arc::new(StaticSeedSource::builtin()),
        ))
    }

    fn request(id: &str, amount: serde_json::Value) -> NewExpenseRequest {
        NewExpenseRequest {
            id: Some(json!(id)),
            date: Some("2025-09-19".to_string()),
            description: Some("Cinema Tickets".to_string()),
            payer: Some("Bob".to_string()),
            amount: Some(amount),
        }
    }

    #[tokio::test]
    async fn test_create_expense_handler_success() {
        let result =
            create_expense_handler(State(seeded_service()), Ok(Json(request("5", json!(24.5)))))
                .await;

        assert!(result.is_ok());
        let (status, Json(expense)) = result.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(expense.id, "5");
        assert_eq!(expense.amount.to_string(), "24.50");
    }

    #[tokio::test]
    async fn test_create_expense_handler_duplicate_id() {
        let result =
            create_expense_handler(State(seeded_service()), Ok(Json(request("1", json!(3)))))
                .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_expense_handler_negative_amount() {
        let result =
            create_expense_handler(State(seeded_service()), Ok(Json(request("5", json!(-5)))))
                .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_expense_handler_write_failure() {
        let result =
            create_expense_handler(State(failing_service()), Ok(Json(request("5", json!(5)))))
                .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_list_expenses_handler_returns_seed() {
        let result = list_expenses_handler(
            State(seeded_service()),
            Ok(Query(ListExpensesQuery::default())),
        )
        .await;

        let Json(expenses) = result.unwrap();
        assert_eq!(expenses, default_seed());
    }

    #[tokio::test]
    async fn test_list_expenses_handler_read_failure_is_empty() {
        let result = list_expenses_handler(
            State(failing_service()),
            Ok(Query(ListExpensesQuery::default())),
        )
        .await;

        let Json(expenses) = result.unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn test_reset_expenses_handler_success() {
        let service = seeded_service();
        service.add(request("5", json!(1))).await.unwrap();

        let Json(body) = reset_expenses_handler(State(service)).await.unwrap();
        assert_eq!(body.count, 4);
        assert_eq!(body.data, default_seed());
        assert_eq!(body.message, "Expenses reset to seed data");
    }

    #[tokio::test]
    async fn test_reset_expenses_handler_write_failure() {
        let result = reset_expenses_handler(State(failing_service())).await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_expense_error_into_response() {
        let cases = vec![
            (ExpenseError::MissingField("id"), StatusCode::BAD_REQUEST),
            (ExpenseError::InvalidAmount, StatusCode::BAD_REQUEST),
            (ExpenseError::DuplicateId("1".to_string()), StatusCode::BAD_REQUEST),
            (
                ExpenseError::StorageReadFailure("corrupt".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExpenseError::StorageWriteFailure("disk full".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ExpenseError::SeedUnavailable("missing".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }
}
