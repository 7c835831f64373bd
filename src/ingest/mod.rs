//! Catalog upload pipeline: parse, validate, normalize.
//!
//! Everything here is pure. Committing the normalized rows is the job of
//! [`crate::services::ingest_service`], which only ever sees batches that
//! passed [`validate::validate`].

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub mod normalize;
pub mod parse;
pub mod validate;

pub use normalize::{NewProduct, normalize};
pub use parse::{parse_csv, parse_json};
pub use validate::{RowError, ValidationFailure, validate};

pub const REQUIRED_FIELDS: [&str; 3] = ["name", "price", "url"];
pub const OPTIONAL_FIELDS: [&str; 6] = [
    "description",
    "currency",
    "image_url",
    "sku",
    "category",
    "brand",
];

/// Row errors beyond this many are counted but not echoed back.
pub const MAX_REPORTED_ERRORS: usize = 20;

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Csv,
    Json,
}

/// One source record keyed by lower-cased field name.
///
/// `row` is the position a merchant would look up in their own file: the
/// spreadsheet line for CSV (header is line 1), the 1-based array index for JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub row: usize,
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(row: usize, fields: HashMap<String, String>) -> Self {
        Self { row, fields }
    }

    /// Trimmed value of `key`, `None` when absent or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBatch {
    pub format: UploadFormat,
    pub records: Vec<RawRecord>,
}

impl ParsedBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The upload does not satisfy the column/field contract at all.
#[derive(Debug, Error, PartialEq)]
pub enum StructuralError {
    #[error("Malformed CSV: {0}")]
    MalformedCsv(String),

    #[error("Malformed JSON upload: {0}")]
    MalformedJson(String),

    #[error("Missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Upload contains no products")]
    Empty,
}

/// Fail with [`StructuralError::MissingColumns`] unless every required field is in `found`.
pub(crate) fn require_columns(found: &[String]) -> Result<(), StructuralError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|required| !found.iter().any(|f| f == *required))
        .map(|required| (*required).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StructuralError::MissingColumns {
            missing,
            found: found.to_vec(),
        })
    }
}

/// Run the full pure pipeline on an already parsed batch.
pub fn prepare(batch: &ParsedBatch) -> Result<Vec<NewProduct>, ValidationFailure> {
    validate(batch)?;
    Ok(normalize(batch))
}
