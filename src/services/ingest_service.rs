use serde_json::Value;

use crate::{
    dto::products::{IngestReport, ProductList, PurgeReport},
    entity::merchants::Model as MerchantModel,
    error::{AppError, AppResult},
    ingest::{self, NewProduct, ParsedBatch, UploadFormat},
    models::product_from_entity,
    notify::CatalogUpdated,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
    store::TenantCatalog,
};

/// Rows per INSERT statement.
pub const INSERT_BATCH_SIZE: usize = 100;

/// Raw upload as received from the HTTP layer.
#[derive(Debug)]
pub enum Upload {
    Csv(String),
    Json(Value),
}

impl Upload {
    fn parse(self) -> Result<ParsedBatch, ingest::StructuralError> {
        match self {
            Upload::Csv(text) => ingest::parse_csv(&text),
            Upload::Json(value) => ingest::parse_json(value),
        }
    }
}

/// Parse and validate without touching storage.
pub fn prepare_upload(upload: Upload) -> AppResult<(UploadFormat, Vec<NewProduct>)> {
    let batch = upload.parse()?;
    let products = ingest::prepare(&batch).map_err(AppError::Validation)?;
    Ok((batch.format, products))
}

pub async fn ingest(
    state: &AppState,
    merchant: &MerchantModel,
    upload: Upload,
    replace: bool,
) -> AppResult<ApiResponse<IngestReport>> {
    // Nothing is written unless the whole upload passed validation.
    let (format, products) = prepare_upload(upload)?;
    let catalog = TenantCatalog::new(&state.orm, merchant.id);

    let deleted = if replace { catalog.delete_all().await? } else { 0 };

    let mut inserted = 0u64;
    for chunk in products.chunks(INSERT_BATCH_SIZE) {
        if let Err(source) = catalog.insert_batch(chunk).await {
            if let Err(err) = catalog.refresh_product_count().await {
                tracing::warn!(merchant_id = %merchant.id, error = %err, "product count refresh failed");
            }
            return Err(AppError::PartialCommit {
                inserted,
                total: products.len(),
                source,
            });
        }
        inserted += chunk.len() as u64;
    }

    let product_count = catalog.refresh_product_count().await?;

    tracing::info!(
        merchant_id = %merchant.id,
        slug = %merchant.slug,
        ?format,
        replace,
        inserted,
        deleted,
        product_count,
        "catalog ingested"
    );

    state.notifier.notify(CatalogUpdated::new(
        merchant.slug.clone(),
        product_count,
        inserted,
        deleted,
        replace,
    ));

    Ok(ApiResponse::success(
        "Products imported",
        IngestReport {
            format,
            replace,
            inserted,
            deleted,
            product_count,
        },
        None,
    ))
}

pub async fn list_mine(
    state: &AppState,
    merchant: &MerchantModel,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, per_page, offset) = pagination.normalize();
    let (items, total) = TenantCatalog::new(&state.orm, merchant.id)
        .list_all(per_page, offset)
        .await?;

    let items = items.into_iter().map(product_from_entity).collect();
    let meta = Meta::new(page, per_page, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn purge(
    state: &AppState,
    merchant: &MerchantModel,
) -> AppResult<ApiResponse<PurgeReport>> {
    let catalog = TenantCatalog::new(&state.orm, merchant.id);
    let deleted = catalog.delete_all().await?;
    let product_count = catalog.refresh_product_count().await?;

    tracing::info!(merchant_id = %merchant.id, deleted, "catalog purged");

    Ok(ApiResponse::success(
        "Products deleted",
        PurgeReport {
            deleted,
            product_count,
        },
        None,
    ))
}
