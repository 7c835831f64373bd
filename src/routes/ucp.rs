use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
};

use crate::{
    dto::ucp::{MerchantDirectory, MerchantProfile, PlatformProfile, ProductFeed},
    error::AppResult,
    extract::AppQuery,
    middleware::base_url::BaseUrl,
    routes::params::FeedQuery,
    services::discovery_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/.well-known/ucp", get(platform_profile))
        .route("/.well-known/ucp/{slug}", get(merchant_profile))
        .route("/merchants", get(list_merchants))
        .route("/{slug}/products", get(product_feed))
}

#[utoipa::path(
    get,
    path = "/.well-known/ucp",
    responses(
        (status = 200, description = "Platform discovery profile", body = PlatformProfile)
    ),
    tag = "Discovery"
)]
pub async fn platform_profile(base: BaseUrl) -> Json<PlatformProfile> {
    Json(discovery_service::platform_profile(&base))
}

#[utoipa::path(
    get,
    path = "/.well-known/ucp/{slug}",
    params(
        ("slug" = String, Path, description = "Merchant slug")
    ),
    responses(
        (status = 200, description = "Merchant discovery profile", body = MerchantProfile),
        (status = 404, description = "Unknown or inactive merchant"),
    ),
    tag = "Discovery"
)]
pub async fn merchant_profile(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(slug): Path<String>,
) -> AppResult<Json<MerchantProfile>> {
    let profile = discovery_service::merchant_profile(&state, &base, &slug).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/merchants",
    responses(
        (status = 200, description = "Merchants with a published catalog", body = MerchantDirectory)
    ),
    tag = "Discovery"
)]
pub async fn list_merchants(
    State(state): State<AppState>,
    base: BaseUrl,
) -> AppResult<Json<MerchantDirectory>> {
    let directory = discovery_service::list_merchants(&state, &base).await?;
    Ok(Json(directory))
}

#[utoipa::path(
    get,
    path = "/{slug}/products",
    params(
        ("slug" = String, Path, description = "Merchant slug"),
        FeedQuery,
    ),
    responses(
        (status = 200, description = "Product feed page", body = ProductFeed),
        (status = 404, description = "Unknown or inactive merchant"),
    ),
    tag = "Discovery"
)]
pub async fn product_feed(
    State(state): State<AppState>,
    base: BaseUrl,
    headers: HeaderMap,
    Path(slug): Path<String>,
    AppQuery(query): AppQuery<FeedQuery>,
) -> AppResult<Json<ProductFeed>> {
    let feed = discovery_service::product_feed(&state, &base, &headers, &slug, query).await?;
    Ok(Json(feed))
}
