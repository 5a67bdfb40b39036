pub mod expense;

pub use expense::{Expense, ListExpensesQuery, NewExpenseRequest, ResetResponse, SortOrder};
