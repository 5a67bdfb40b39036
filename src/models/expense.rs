use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::validation::{validate_amount, validate_expense_id};

/// A single shared-cost record: who paid, how much, when, and for what
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "1",
    "date": "2025-09-15",
    "description": "Grocery Shopping",
    "payer": "Alice",
    "amount": 75.50
}))]
pub struct Expense {
    pub id: String,
    /// Calendar date, kept as the client sent it
    pub date: String,
    pub description: String,
    pub payer: String,
    /// Non-negative, two fractional digits
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, minimum = 0.0)]
    pub amount: Decimal,
}

impl Expense {
    /// Rescales the amount to two fractional digits.
    ///
    /// Amounts decoded from JSON numbers go through `f64`, so anything read
    /// back from storage is passed through here before it leaves a
    /// repository.
    pub fn normalized(mut self) -> Self {
        self.amount = crate::validation::normalize_amount(self.amount);
        self
    }
}

/// Request payload for adding an expense
///
/// Every field is optional so that absent fields and wrong types are
/// reported as domain errors rather than body parse failures. `id` accepts a
/// string or a number; `amount` must be a JSON number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "id": "5",
    "date": "2025-09-19",
    "description": "Cinema Tickets",
    "payer": "Bob",
    "amount": 24.00
}))]
pub struct NewExpenseRequest {
    #[validate(required, custom(function = "validate_expense_id"))]
    #[schema(value_type = Option<String>, example = "5")]
    pub id: Option<serde_json::Value>,

    #[validate(required, length(min = 1))]
    #[schema(example = "2025-09-19")]
    pub date: Option<String>,

    #[validate(required, length(min = 1))]
    pub description: Option<String>,

    #[validate(required, length(min = 1))]
    pub payer: Option<String>,

    #[validate(required, custom(function = "validate_amount"))]
    #[schema(value_type = Option<f64>, minimum = 0.0)]
    pub amount: Option<serde_json::Value>,
}

/// Body returned by the reset endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub message: String,
    pub data: Vec<Expense>,
    pub count: usize,
}

/// Orderings offered to list consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    DateNewest,
    DateOldest,
    AmountHighest,
    AmountLowest,
}

impl SortOrder {
    /// Stable sort, so equal keys keep insertion order
    pub fn apply(self, expenses: &mut [Expense]) {
        match self {
            SortOrder::DateNewest => expenses.sort_by(|a, b| b.date.cmp(&a.date)),
            SortOrder::DateOldest => expenses.sort_by(|a, b| a.date.cmp(&b.date)),
            SortOrder::AmountHighest => expenses.sort_by(|a, b| b.amount.cmp(&a.amount)),
            SortOrder::AmountLowest => expenses.sort_by(|a, b| a.amount.cmp(&b.amount)),
        }
    }
}

/// Query string accepted by the list endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListExpensesQuery {
    /// One of `date-newest`, `date-oldest`, `amount-highest`, `amount-lowest`
    pub sort: Option<SortOrder>,
}
