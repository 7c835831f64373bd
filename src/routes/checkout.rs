use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    checkout::SessionPatch,
    dto::checkout::{CheckoutSessionView, CreateSessionRequest},
    error::AppResult,
    extract::AppJson,
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout-sessions", post(create_session))
        .route("/checkout-sessions/{id}", get(get_session).put(update_session))
        .route("/checkout-sessions/{id}/complete", post(complete_session))
}

#[utoipa::path(
    post,
    path = "/checkout-sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created, always incomplete", body = CheckoutSessionView),
        (status = 400, description = "Invalid line items"),
    ),
    tag = "Checkout"
)]
pub async fn create_session(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<CheckoutSessionView>)> {
    let view = checkout_service::create_session(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/checkout-sessions/{id}",
    params(
        ("id" = String, Path, description = "Checkout session id")
    ),
    responses(
        (status = 200, description = "Session with its computed status", body = CheckoutSessionView),
        (status = 404, description = "Unknown session"),
    ),
    tag = "Checkout"
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CheckoutSessionView>> {
    let view = checkout_service::get_session(&state, &id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/checkout-sessions/{id}",
    params(
        ("id" = String, Path, description = "Checkout session id")
    ),
    request_body = SessionPatch,
    responses(
        (status = 200, description = "Session updated", body = CheckoutSessionView),
        (status = 400, description = "Invalid patch or session already completed"),
        (status = 404, description = "Unknown session"),
    ),
    tag = "Checkout"
)]
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(patch): AppJson<SessionPatch>,
) -> AppResult<Json<CheckoutSessionView>> {
    let view = checkout_service::update_session(&state, &id, patch).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/checkout-sessions/{id}/complete",
    params(
        ("id" = String, Path, description = "Checkout session id")
    ),
    responses(
        (status = 200, description = "Session completed with an order id", body = CheckoutSessionView),
        (status = 400, description = "Session not ready or already completed"),
        (status = 404, description = "Unknown session"),
    ),
    tag = "Checkout"
)]
pub async fn complete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CheckoutSessionView>> {
    let view = checkout_service::complete_session(&state, &id).await?;
    Ok(Json(view))
}
