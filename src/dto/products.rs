use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{ingest::UploadFormat, models::Product};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReplaceParams {
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestReport {
    pub format: UploadFormat,
    pub replace: bool,
    pub inserted: u64,
    pub deleted: u64,
    pub product_count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeReport {
    pub deleted: u64,
    pub product_count: i32,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
