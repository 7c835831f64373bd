use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::merchants::{MerchantAccount, MerchantDeleted, RegisterMerchantRequest, RegisterMerchantResponse},
    error::AppResult,
    extract::AppJson,
    middleware::{auth::AuthMerchant, base_url::BaseUrl},
    response::ApiResponse,
    services::merchant_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/merchants/register", post(register))
        .route("/merchants/me", get(me).delete(delete_me))
}

#[utoipa::path(
    post,
    path = "/merchants/register",
    request_body = RegisterMerchantRequest,
    responses(
        (status = 201, description = "Merchant registered; the API key is shown only here", body = ApiResponse<RegisterMerchantResponse>),
        (status = 400, description = "Invalid registration"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Merchants"
)]
pub async fn register(
    State(state): State<AppState>,
    base: BaseUrl,
    AppJson(payload): AppJson<RegisterMerchantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisterMerchantResponse>>)> {
    let response = merchant_service::register_merchant(&state, &base, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/merchants/me",
    responses(
        (status = 200, description = "Authenticated merchant", body = ApiResponse<MerchantAccount>),
        (status = 401, description = "Invalid or missing API key"),
    ),
    security(("api_key" = [])),
    tag = "Merchants"
)]
pub async fn me(
    AuthMerchant(merchant): AuthMerchant,
    base: BaseUrl,
) -> Json<ApiResponse<MerchantAccount>> {
    Json(merchant_service::account(merchant, &base))
}

#[utoipa::path(
    delete,
    path = "/merchants/me",
    responses(
        (status = 200, description = "Merchant and catalog erased", body = ApiResponse<MerchantDeleted>),
        (status = 401, description = "Invalid or missing API key"),
    ),
    security(("api_key" = [])),
    tag = "Merchants"
)]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthMerchant(merchant): AuthMerchant,
) -> AppResult<Json<ApiResponse<MerchantDeleted>>> {
    let response = merchant_service::delete_merchant(&state, merchant).await?;
    Ok(Json(response))
}
