use async_trait::async_trait;
use std::sync::Arc;

use crate::models::expense::{Expense, NewExpenseRequest, SortOrder};
use crate::repositories::expense_repository::{ExpenseRepository, RepositoryError};
use crate::repositories::seed_source::SeedSource;
use crate::validation::validate_new_expense;

/// Expense service errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Amount must be a non-negative number")]
    InvalidAmount,

    #[error("Expense with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Storage read failed: {0}")]
    StorageReadFailure(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailure(String),

    #[error("Seed data unavailable: {0}")]
    SeedUnavailable(String),
}

/// Trait defining expense service operations
#[async_trait]
pub trait ExpenseService: Send + Sync {
    /// All expenses in insertion order; empty when storage cannot be read
    async fn get_all(&self) -> Vec<Expense>;

    /// All expenses reordered for display
    async fn get_sorted(&self, order: SortOrder) -> Vec<Expense> {
        let mut expenses = self.get_all().await;
        order.apply(&mut expenses);
        expenses
    }

    /// Validate, normalize and append a new expense
    async fn add(&self, request: NewExpenseRequest) -> Result<Expense, ExpenseError>;

    /// Replace every stored expense with the seed dataset
    async fn reset(&self) -> Result<Vec<Expense>, ExpenseError>;
}

/// Implementation of ExpenseService
pub struct ExpenseServiceImpl {
    expense_repository: Arc<dyn ExpenseRepository>,
    seed_source: Arc<dyn SeedSource>,
}

impl ExpenseServiceImpl {
    pub fn new(
        expense_repository: Arc<dyn ExpenseRepository>,
        seed_source: Arc<dyn SeedSource>,
    ) -> Self {
        Self {
            expense_repository,
            seed_source,
        }
    }
}

#[async_trait]
impl ExpenseService for ExpenseServiceImpl {
    async fn get_all(&self) -> Vec<Expense> {
        match self.expense_repository.find_all().await {
            Ok(expenses) => expenses,
            Err(e) => {
                tracing::warn!(error = %e, "could not read expenses, returning an empty list");
                Vec::new()
            }
        }
    }

    async fn add(&self, request: NewExpenseRequest) -> Result<Expense, ExpenseError> {
        let expense = validate_new_expense(request)?;
        let id = expense.id.clone();

        let created = self
            .expense_repository
            .insert(expense)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => ExpenseError::DuplicateId(id),
                RepositoryError::ReadFailed(msg) => ExpenseError::StorageReadFailure(msg),
                RepositoryError::WriteFailed(msg) => ExpenseError::StorageWriteFailure(msg),
            })?;

        tracing::info!(id = %created.id, amount = %created.amount, "expense added");
        Ok(created)
    }

    async fn reset(&self) -> Result<Vec<Expense>, ExpenseError> {
        let seed = self
            .seed_source
            .load()
            .await
            .map_err(|e| ExpenseError::SeedUnavailable(e.to_string()))?;

        let restored = self
            .expense_repository
            .replace_all(seed)
            .await
            .map_err(|e| match e {
                RepositoryError::ReadFailed(msg) => ExpenseError::StorageReadFailure(msg),
                RepositoryError::WriteFailed(msg) | RepositoryError::ConstraintViolation(msg) => {
                    ExpenseError::StorageWriteFailure(msg)
                }
            })?;

        tracing::info!(count = restored.len(), "expenses reset to seed data");
        Ok(restored)
    }
}
