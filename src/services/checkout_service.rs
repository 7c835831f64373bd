use crate::{
    checkout::{CheckoutStatus, SessionPatch, SessionState, completed_message},
    dto::checkout::{CheckoutSessionView, CreateSessionRequest},
    error::{AppError, AppResult},
    state::AppState,
    store::{SessionStore, sessions::state_from_model},
    token::generate_session_id,
};

const ALREADY_COMPLETED: &str = "Checkout session is already completed";

async fn load(state: &AppState, session_id: &str) -> AppResult<SessionState> {
    let model = SessionStore::new(&state.orm)
        .find(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Checkout session not found".into()))?;
    Ok(state_from_model(&model)?)
}

/// Persist `session` unless another request completed it in the meantime.
async fn store(state: &AppState, session_id: &str, session: &SessionState) -> AppResult<()> {
    let sessions = SessionStore::new(&state.orm);
    if sessions.save(session_id, session).await? > 0 {
        return Ok(());
    }
    match sessions.find(session_id).await? {
        Some(_) => {
            tracing::warn!(session_id = %session_id, "write refused, session already completed");
            Err(AppError::checkout(ALREADY_COMPLETED, vec![completed_message()]))
        }
        None => Err(AppError::NotFound("Checkout session not found".into())),
    }
}

pub async fn create_session(
    state: &AppState,
    payload: CreateSessionRequest,
) -> AppResult<CheckoutSessionView> {
    let session = SessionState::create(&payload.line_items)
        .map_err(|messages| AppError::checkout("Invalid line items", messages))?;
    let session_id = generate_session_id();
    SessionStore::new(&state.orm)
        .insert(&session_id, &session)
        .await?;

    tracing::info!(
        session_id = %session_id,
        line_items = session.line_items.len(),
        "checkout session created"
    );
    Ok(CheckoutSessionView::new(&session_id, &session))
}

pub async fn get_session(state: &AppState, session_id: &str) -> AppResult<CheckoutSessionView> {
    let session = load(state, session_id).await?;
    Ok(CheckoutSessionView::new(session_id, &session))
}

pub async fn update_session(
    state: &AppState,
    session_id: &str,
    patch: SessionPatch,
) -> AppResult<CheckoutSessionView> {
    let mut session = load(state, session_id).await?;
    let was_completed = session.status() == CheckoutStatus::Completed;
    session.apply(patch).map_err(|messages| {
        let message = if was_completed {
            ALREADY_COMPLETED
        } else {
            "Invalid line items"
        };
        AppError::checkout(message, messages)
    })?;
    store(state, session_id, &session).await?;

    tracing::debug!(session_id = %session_id, status = session.status().as_str(), "checkout session updated");
    Ok(CheckoutSessionView::new(session_id, &session))
}

pub async fn complete_session(
    state: &AppState,
    session_id: &str,
) -> AppResult<CheckoutSessionView> {
    let mut session = load(state, session_id).await?;
    let was_completed = session.status() == CheckoutStatus::Completed;
    let order_id = session.complete().map_err(|messages| {
        let message = if was_completed {
            ALREADY_COMPLETED
        } else {
            "Checkout session is not ready for completion"
        };
        AppError::checkout(message, messages)
    })?;
    store(state, session_id, &session).await?;

    tracing::info!(session_id = %session_id, order_id = %order_id, "checkout session completed");
    Ok(CheckoutSessionView::new(session_id, &session))
}
