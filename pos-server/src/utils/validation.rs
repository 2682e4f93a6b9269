//! Input validation helpers
//!
//! Centralized limits and validation functions used by the handlers before
//! anything is written.

use crate::utils::AppError;
use shared::models::OrderItems;

// ── Text length limits ──────────────────────────────────────────────

/// Payment method names
pub const MAX_PAYMENT_METHOD_LEN: usize = 64;

/// Receipt notes
pub const MAX_NOTE_LEN: usize = 500;

/// Employee ids and item references
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Quantity ceiling for a single order line
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            shared::error::ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Money amounts entered by staff (tips) must be finite and non-negative
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}

/// Every order line needs a reference and a positive quantity
pub fn validate_order_items(items: &OrderItems) -> Result<(), AppError> {
    for (category, line) in items.lines() {
        validate_required_text(&line.item_ref, "item_ref", MAX_SHORT_TEXT_LEN)?;
        if line.quantity <= 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity for '{}' ({category:?}) must be between 1 and {MAX_LINE_QUANTITY}",
                line.item_ref
            )));
        }
        for extra in &line.extras {
            validate_required_text(extra, "extras", MAX_SHORT_TEXT_LEN)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;
    use shared::models::OrderLine;

    fn line(quantity: i32) -> OrderLine {
        OrderLine {
            item_ref: "cola".into(),
            quantity,
            size: Some("large".into()),
            extras: vec![],
        }
    }

    #[test]
    fn test_required_text() {
        let err = validate_required_text("  ", "payment_method", 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert!(validate_required_text("Cash", "payment_method", 10).is_ok());
        assert!(validate_required_text("Credit Card!", "payment_method", 5).is_err());
    }

    #[test]
    fn test_amount() {
        assert!(validate_amount(0.0, "tip_amount").is_ok());
        assert!(validate_amount(2.5, "tip_amount").is_ok());
        assert!(validate_amount(-1.0, "tip_amount").is_err());
        assert!(validate_amount(f64::NAN, "tip_amount").is_err());
    }

    #[test]
    fn test_order_items_quantity() {
        let ok = OrderItems {
            drinks: vec![line(2)],
            ..Default::default()
        };
        assert!(validate_order_items(&ok).is_ok());

        let zero = OrderItems {
            drinks: vec![line(0)],
            ..Default::default()
        };
        assert!(validate_order_items(&zero).is_err());
    }
}
