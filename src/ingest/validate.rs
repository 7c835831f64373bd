use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{MAX_REPORTED_ERRORS, ParsedBatch, RawRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RowError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl RowError {
    fn new(row: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Row-level problems found in a batch. `errors` is capped, `total` is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub errors: Vec<RowError>,
    pub total: usize,
    pub rows: usize,
}

/// Check every record; never stops at the first bad row.
pub fn validate(batch: &ParsedBatch) -> Result<(), ValidationFailure> {
    let mut errors = Vec::new();
    for record in &batch.records {
        validate_record(record, &mut errors);
    }
    if errors.is_empty() {
        return Ok(());
    }
    let total = errors.len();
    errors.truncate(MAX_REPORTED_ERRORS);
    Err(ValidationFailure {
        errors,
        total,
        rows: batch.len(),
    })
}

fn validate_record(record: &RawRecord, errors: &mut Vec<RowError>) {
    let row = record.row;

    if record.get("name").is_none() {
        errors.push(RowError::new(row, "name", "name is required"));
    }

    match record.get("price") {
        None => errors.push(RowError::new(row, "price", "price is required")),
        Some(raw) => match parse_price(raw) {
            Some(price) if price.is_sign_negative() && !price.is_zero() => errors.push(
                RowError::new(row, "price", format!("price must be non-negative, got {raw}")),
            ),
            Some(price) if price.round_dp(2) >= max_price() => errors.push(RowError::new(
                row,
                "price",
                format!("price must be below {}, got {raw}", max_price()),
            )),
            Some(_) => {}
            None => errors.push(RowError::new(
                row,
                "price",
                format!("price must be a number, got {raw:?}"),
            )),
        },
    }

    if record.get("url").is_none() {
        errors.push(RowError::new(row, "url", "url is required"));
    }

    if let Some(currency) = record.get("currency") {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            errors.push(RowError::new(
                row,
                "currency",
                format!("currency must be a 3-letter code, got {currency:?}"),
            ));
        }
    }
}

/// `NUMERIC(12, 2)` holds at most ten integer digits.
pub(crate) fn max_price() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

/// Accepts plain and scientific decimal notation.
pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
