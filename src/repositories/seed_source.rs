use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::models::expense::{Expense, NewExpenseRequest};
use crate::validation::validate_new_expense;

/// Seed loading errors
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Seed file unreadable: {0}")]
    Unreadable(String),

    #[error("Seed file malformed: {0}")]
    Malformed(String),

    #[error("Seed record invalid: {0}")]
    InvalidRecord(String),
}

/// Source of the fixed dataset a reset restores
#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Expense>, SeedError>;
}

/// Reads seed records from a JSON array on disk
pub struct JsonSeedSource {
    path: PathBuf,
}

impl JsonSeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedSource for JsonSeedSource {
    async fn load(&self) -> Result<Vec<Expense>, SeedError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SeedError::Unreadable(format!("{}: {}", self.path.display(), e)))?;

        let records: Vec<NewExpenseRequest> = serde_json::from_slice(&bytes)
            .map_err(|e| SeedError::Malformed(format!("{}: {}", self.path.display(), e)))?;

        let mut seen = HashSet::new();
        let mut expenses = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let expense = validate_new_expense(record)
                .map_err(|e| SeedError::InvalidRecord(format!("record {}: {}", index, e)))?;
            if !seen.insert(expense.id.clone()) {
                return Err(SeedError::InvalidRecord(format!(
                    "record {}: duplicate id '{}'",
                    index, expense.id
                )));
            }
            expenses.push(expense);
        }

        Ok(expenses)
    }
}

/// Seed data held in memory
pub struct StaticSeedSource {
    expenses: Vec<Expense>,
}

impl StaticSeedSource {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    /// The dataset shipped in `data/seed_expenses.json`
    pub fn builtin() -> Self {
        Self::new(default_seed())
    }
}

#[async_trait]
impl SeedSource for StaticSeedSource {
    async fn load(&self) -> Result<Vec<Expense>, SeedError> {
        Ok(self.expenses.clone())
    }
}

pub fn default_seed() -> Vec<Expense> {
    let expense = |id: &str, date: &str, description: &str, payer: &str, cents: i64| Expense {
        id: id.to_string(),
        date: date.to_string(),
        description: description.to_string(),
        payer: payer.to_string(),
        amount: Decimal::new(cents, 2),
    };

    vec![
        expense("1", "2025-09-15", "Grocery Shopping", "Alice", 7550),
        expense("2", "2025-09-16", "Gas Station", "Bob", 4525),
        expense("3", "2025-09-17", "Restaurant Dinner", "Charlie", 12000),
        expense("4", "2025-09-18", "Coffee Shop", "Alice", 1275),
    ]
}
