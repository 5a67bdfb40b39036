use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::models::expense::Expense;
use crate::repositories::expense_repository::{duplicate_id, ExpenseRepository, RepositoryError};

/// JSON file implementation of ExpenseRepository
///
/// The whole list is stored as one pretty-printed JSON array. Every mutation
/// reads the file, applies the change and writes the full snapshot back
/// through a temporary file that is renamed over the original, so a failed
/// write never leaves a half-written file behind. The mutex serializes
/// read-modify-write cycles inside this process only.
pub struct JsonFileExpenseRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileExpenseRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// A missing or blank file is an empty list; unparseable content is an error
    async fn read_snapshot(&self) -> Result<Vec<Expense>, RepositoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RepositoryError::ReadFailed(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        let expenses: Vec<Expense> = serde_json::from_slice(&bytes).map_err(|e| {
            RepositoryError::ReadFailed(format!("{}: {}", self.path.display(), e))
        })?;

        Ok(expenses.into_iter().map(Expense::normalized).collect())
    }

    async fn write_snapshot(&self, expenses: &[Expense]) -> Result<(), RepositoryError> {
        let body = serde_json::to_vec_pretty(expenses).map_err(|e| self.write_error(e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|e| self.write_error(e))?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(self.write_error(e));
        }

        Ok(())
    }

    fn write_error(&self, e: impl std::fmt::Display) -> RepositoryError {
        RepositoryError::WriteFailed(format!("{}: {}", self.path.display(), e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "expenses.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ExpenseRepository for JsonFileExpenseRepository {
    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        self.read_snapshot().await
    }

    async fn insert(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let _guard = self.write_lock.lock().await;

        let mut expenses = self.read_snapshot().await?;
        if expenses.iter().any(|e| e.id == expense.id) {
            return Err(duplicate_id(&expense.id));
        }

        expenses.push(expense.clone());
        self.write_snapshot(&expenses).await?;

        Ok(expense)
    }

    async fn replace_all(&self, expenses: Vec<Expense>) -> Result<Vec<Expense>, RepositoryError> {
        let _guard = self.write_lock.lock().await;

        self.write_snapshot(&expenses).await?;

        Ok(expenses)
    }
}
