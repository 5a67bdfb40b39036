use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::expense::{Expense, NewExpenseRequest};
use crate::services::expense_service::ExpenseError;

/// Fractional digits kept on every stored amount
pub const AMOUNT_SCALE: u32 = 2;

/// Field order used when reporting the first missing field
const EXPENSE_FIELDS: [&str; 5] = ["id", "date", "description", "payer", "amount"];

/// Validates that an id is a non-empty string or a non-zero number
pub fn validate_expense_id(id: &Value) -> Result<(), ValidationError> {
    if coerce_id(id).is_none() {
        let mut error = ValidationError::new("missing_id");
        error.message = Some("id must be a non-empty string or a non-zero number".into());
        return Err(error);
    }
    Ok(())
}

/// Validates that an amount is a JSON number greater than or equal to 0
pub fn validate_amount(amount: &Value) -> Result<(), ValidationError> {
    match parse_amount(amount) {
        Some(value) if value >= Decimal::ZERO => Ok(()),
        _ => {
            let mut error = ValidationError::new("invalid_amount");
            error.message = Some("Amount must be a non-negative number".into());
            Err(error)
        }
    }
}

/// String form of an id, or `None` when the value counts as absent
pub fn coerce_id(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a JSON number as a decimal. Strings are not accepted.
pub fn parse_amount(amount: &Value) -> Option<Decimal> {
    let Value::Number(n) = amount else {
        return None;
    };
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Rounds half away from zero and pins the scale, so `19.999` becomes `20.00`
pub fn normalize_amount(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// Checks a raw request and turns it into a normalized expense
pub fn validate_new_expense(request: NewExpenseRequest) -> Result<Expense, ExpenseError> {
    request.validate().map_err(|errors| classify(&errors))?;

    let id = request
        .id
        .as_ref()
        .and_then(coerce_id)
        .ok_or(ExpenseError::MissingField("id"))?;
    let amount = request
        .amount
        .as_ref()
        .and_then(parse_amount)
        .ok_or(ExpenseError::InvalidAmount)?;

    Ok(Expense {
        id,
        date: request.date.ok_or(ExpenseError::MissingField("date"))?,
        description: request
            .description
            .ok_or(ExpenseError::MissingField("description"))?,
        payer: request.payer.ok_or(ExpenseError::MissingField("payer"))?,
        amount: normalize_amount(amount),
    })
}

/// Missing fields win over a bad amount
fn classify(errors: &ValidationErrors) -> ExpenseError {
    let field_errors = errors.field_errors();
    for field in EXPENSE_FIELDS {
        let Some(list) = field_errors.get(field) else {
            continue;
        };
        if list.iter().any(|e| e.code != "invalid_amount") {
            return ExpenseError::MissingField(field);
        }
    }
    ExpenseError::InvalidAmount
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(amount: Value) -> NewExpenseRequest {
        NewExpenseRequest {
            id: Some(json!("10")),
            date: Some("2025-09-20".to_string()),
            description: Some("Train Tickets".to_string()),
            payer: Some("Bob".to_string()),
            amount: Some(amount),
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let expense = validate_new_expense(request(json!(19.999))).unwrap();
        assert_eq!(expense.id, "10");
        assert_eq!(expense.amount, Decimal::from_str("20.00").unwrap());
        assert_eq!(expense.amount.to_string(), "20.00");
    }

    #[test]
    fn test_amount_rounds_half_away_from_zero() {
        assert_eq!(normalize_amount(Decimal::from_str("0.125").unwrap()).to_string(), "0.13");
        assert_eq!(normalize_amount(Decimal::from_str("7").unwrap()).to_string(), "7.00");
        assert_eq!(normalize_amount(Decimal::from_str("45.254").unwrap()).to_string(), "45.25");
    }

    #[test]
    fn test_zero_amount_is_accepted() {
        let expense = validate_new_expense(request(json!(0))).unwrap();
        assert_eq!(expense.amount, Decimal::ZERO);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let result = validate_new_expense(request(json!(-5)));
        assert_eq!(result.unwrap_err(), ExpenseError::InvalidAmount);
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        for amount in [json!("12.50"), json!(true), json!([1]), json!({"value": 1})] {
            let result = validate_new_expense(request(amount));
            assert_eq!(result.unwrap_err(), ExpenseError::InvalidAmount);
        }
    }

    #[test]
    fn test_numeric_id_coerced_to_string() {
        let mut req = request(json!(3.5));
        req.id = Some(json!(42));
        let expense = validate_new_expense(req).unwrap();
        assert_eq!(expense.id, "42");
    }

    #[test]
    fn test_falsy_ids_count_as_missing() {
        for id in [json!(""), json!(0), json!(false), json!(null), json!({})] {
            let mut req = request(json!(1));
            req.id = Some(id);
            assert_eq!(
                validate_new_expense(req).unwrap_err(),
                ExpenseError::MissingField("id")
            );
        }
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut req = request(json!(1));
        req.description = None;
        req.payer = Some(String::new());
        assert_eq!(
            validate_new_expense(req).unwrap_err(),
            ExpenseError::MissingField("description")
        );

        let mut req = request(json!(1));
        req.amount = None;
        assert_eq!(
            validate_new_expense(req).unwrap_err(),
            ExpenseError::MissingField("amount")
        );
    }

    #[test]
    fn test_missing_field_wins_over_bad_amount() {
        let mut req = request(json!(-5));
        req.date = None;
        assert_eq!(
            validate_new_expense(req).unwrap_err(),
            ExpenseError::MissingField("date")
        );
    }

    #[test]
    fn test_empty_request_reports_id_first() {
        assert_eq!(
            validate_new_expense(NewExpenseRequest::default()).unwrap_err(),
            ExpenseError::MissingField("id")
        );
    }

    #[test]
    fn test_scientific_amount_parses() {
        let value: Value = serde_json::from_str("1.5e2").unwrap();
        assert_eq!(parse_amount(&value), Some(Decimal::from_str("150").unwrap()));
    }
}
