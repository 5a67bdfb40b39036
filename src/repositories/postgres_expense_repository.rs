use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::expense::Expense;
use crate::repositories::expense_repository::{duplicate_id, ExpenseRepository, RepositoryError};

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: String,
    date: String,
    description: String,
    payer: String,
    amount: Decimal,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            date: row.date,
            description: row.description,
            payer: row.payer,
            amount: row.amount,
        }
        .normalized()
    }
}

/// PostgreSQL implementation of ExpenseRepository
///
/// Inserts are keyed on the primary key instead of rewriting a snapshot, so
/// several processes can write to the same table. `seq` preserves insertion
/// order for reads.
pub struct PostgresExpenseRepository {
    pool: PgPool,
}

impl PostgresExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepository for PostgresExpenseRepository {
    async fn find_all(&self) -> Result<Vec<Expense>, RepositoryError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            r#"
            SELECT id, date, description, payer, amount
            FROM expenses
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::ReadFailed(e.to_string()))?;

        Ok(rows.into_iter().map(Expense::from).collect())
    }

    async fn insert(&self, expense: Expense) -> Result<Expense, RepositoryError> {
        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (id, date, description, payer, amount)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, date, description, payer, amount
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.date)
        .bind(&expense.description)
        .bind(&expense.payer)
        .bind(expense.amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;

        match row {
            Some(row) => Ok(row.into()),
            None => Err(duplicate_id(&expense.id)),
        }
    }

    async fn replace_all(&self, expenses: Vec<Expense>) -> Result<Vec<Expense>, RepositoryError> {
        // Dropping the transaction without commit rolls back, keeping the old rows
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;

        sqlx::query("DELETE FROM expenses")
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;

        for expense in &expenses {
            sqlx::query(
                r#"
                INSERT INTO expenses (id, date, description, payer, amount)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&expense.id)
            .bind(&expense.date)
            .bind(&expense.description)
            .bind(&expense.payer)
            .bind(expense.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    duplicate_id(&expense.id)
                }
                e => RepositoryError::WriteFailed(e.to_string()),
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;

        Ok(expenses)
    }
}
