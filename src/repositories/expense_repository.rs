use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::expense::Expense;

/// Repository errors for storage operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Trait defining expense storage operations
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// Every stored expense in insertion order
    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError>;

    /// Append an expense, failing with `ConstraintViolation` when the id is taken
    async fn insert(&self, expense: Expense) -> Result<Expense, RepositoryError>;

    /// Overwrite the whole store with the given sequence
    async fn replace_all(&self, expenses: Vec<Expense>) -> Result<Vec<Expense>, RepositoryError>;
}

pub(crate) fn duplicate_id(id: &str) -> RepositoryError {
    RepositoryError::ConstraintViolation(format!("expense id '{}' already exists", id))
}

/// In-memory implementation of ExpenseRepository
#[derive(Default)]
pub struct InMemoryExpenseRepository {
    expenses: RwLock<Vec<Expense>>,
}

impl InMemoryExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        Self {
            expenses: RwLock::new(expenses),
        }
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        Ok(self.expenses.read().await.clone())
    }

    async fn insert(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let mut expenses = self.expenses.write().await;
        if expenses.iter().any(|e| e.id == expense.id) {
            return Err(duplicate_id(&expense.id));
        }
        expenses.push(expense.clone());
        Ok(expense)
    }

    async fn replace_all(&self, expenses: Vec<Expense>) -> Result<Vec<Expense>, RepositoryError> {
        let mut stored = self.expenses.write().await;
        *stored = expenses.clone();
        Ok(expenses)
    }
}
