use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    routing::{get, post},
};
use serde_json::Value;

use crate::{
    dto::products::{IngestReport, ProductList, PurgeReport, ReplaceParams},
    error::{AppError, AppResult},
    extract::{AppJson, AppQuery},
    ingest::StructuralError,
    middleware::auth::AuthMerchant,
    response::ApiResponse,
    routes::params::Pagination,
    services::ingest_service::{self, Upload},
    state::AppState,
};

/// Multipart field carrying the CSV file.
pub const UPLOAD_FIELD: &str = "file";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products/upload", post(upload_csv))
        .route("/products/json", post(upload_json))
        .route("/products/mine", get(list_mine).delete(purge_mine))
}

/// Text of the `file` field, or of the first field when none is named `file`.
async fn read_upload(mut multipart: Multipart) -> AppResult<String> {
    let mut fallback = None;
    while let Some(field) = multipart.next_field().await? {
        let is_file = field.name() == Some(UPLOAD_FIELD);
        if !is_file && fallback.is_some() {
            continue;
        }
        let bytes = field.bytes().await?;
        let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
            StructuralError::MalformedCsv("upload is not valid UTF-8".to_string())
        })?;
        if is_file {
            return Ok(text);
        }
        fallback = Some(text);
    }
    fallback.ok_or_else(|| AppError::BadRequest(format!("Multipart field '{UPLOAD_FIELD}' is required")))
}

#[utoipa::path(
    post,
    path = "/products/upload",
    params(
        ("replace" = Option<bool>, Query, description = "Delete the current catalog first, default false"),
    ),
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in field `file`"),
    responses(
        (status = 200, description = "Catalog imported", body = ApiResponse<IngestReport>),
        (status = 400, description = "Structural or row validation failure"),
        (status = 401, description = "Invalid or missing API key"),
        (status = 413, description = "Upload too large"),
        (status = 500, description = "Insert stopped part way"),
    ),
    security(("api_key" = [])),
    tag = "Products"
)]
pub async fn upload_csv(
    State(state): State<AppState>,
    AuthMerchant(merchant): AuthMerchant,
    AppQuery(params): AppQuery<ReplaceParams>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ApiResponse<IngestReport>>> {
    let text = read_upload(multipart?).await?;
    let response =
        ingest_service::ingest(&state, &merchant, Upload::Csv(text), params.replace).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/products/json",
    params(
        ("replace" = Option<bool>, Query, description = "Delete the current catalog first, default false"),
    ),
    request_body(content = Object, description = "`{\"products\": [...]}` or a bare array"),
    responses(
        (status = 200, description = "Catalog imported", body = ApiResponse<IngestReport>),
        (status = 400, description = "Structural or row validation failure"),
        (status = 401, description = "Invalid or missing API key"),
        (status = 413, description = "Upload too large"),
        (status = 500, description = "Insert stopped part way"),
    ),
    security(("api_key" = [])),
    tag = "Products"
)]
pub async fn upload_json(
    State(state): State<AppState>,
    AuthMerchant(merchant): AuthMerchant,
    AppQuery(params): AppQuery<ReplaceParams>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<ApiResponse<IngestReport>>> {
    let response =
        ingest_service::ingest(&state, &merchant, Upload::Json(body), params.replace).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/products/mine",
    params(Pagination),
    responses(
        (status = 200, description = "The merchant's own products, active or not", body = ApiResponse<ProductList>),
        (status = 401, description = "Invalid or missing API key"),
    ),
    security(("api_key" = [])),
    tag = "Products"
)]
pub async fn list_mine(
    State(state): State<AppState>,
    AuthMerchant(merchant): AuthMerchant,
    AppQuery(pagination): AppQuery<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let response = ingest_service::list_mine(&state, &merchant, pagination).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/products/mine",
    responses(
        (status = 200, description = "All of the merchant's products deleted", body = ApiResponse<PurgeReport>),
        (status = 401, description = "Invalid or missing API key"),
    ),
    security(("api_key" = [])),
    tag = "Products"
)]
pub async fn purge_mine(
    State(state): State<AppState>,
    AuthMerchant(merchant): AuthMerchant,
) -> AppResult<Json<ApiResponse<PurgeReport>>> {
    let response = ingest_service::purge(&state, &merchant).await?;
    Ok(Json(response))
}
