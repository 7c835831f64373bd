use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::state::AppState;

pub mod checkout;
pub mod doc;
pub mod health;
pub mod merchants;
pub mod params;
pub mod products;
pub mod ucp;

// Build the router without binding state; it will be provided at the top level.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness))
        .merge(merchants::router())
        .merge(products::router())
        .merge(checkout::router())
        .merge(ucp::router())
}

/// Routes, API docs and the JSON fallback, bound to `state`.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    create_router()
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not Found", "path": uri.path() })),
    )
}
