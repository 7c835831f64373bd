use rust_decimal::Decimal;

use super::validate::parse_price;
use super::{DEFAULT_CURRENCY, ParsedBatch, RawRecord};

/// A validated, trimmed product ready to be inserted for some merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub image_url: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
}

/// Only call on a batch that passed validation; fallbacks here are never hit otherwise.
pub fn normalize(batch: &ParsedBatch) -> Vec<NewProduct> {
    batch.records.iter().map(normalize_record).collect()
}

fn normalize_record(record: &RawRecord) -> NewProduct {
    let text = |key: &str| record.get(key).map(str::to_string);
    NewProduct {
        name: text("name").unwrap_or_default(),
        description: text("description"),
        price: record
            .get("price")
            .and_then(parse_price)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2),
        currency: record
            .get("currency")
            .unwrap_or(DEFAULT_CURRENCY)
            .to_ascii_uppercase(),
        url: text("url").unwrap_or_default(),
        image_url: text("image_url"),
        sku: text("sku"),
        category: text("category"),
        brand: text("brand"),
    }
}
