//! Contact form route handler.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use super::{ApiJson, Success};
use crate::error::AppError;
use crate::services::contact::{ContactRequest, submit_contact};
use crate::state::AppState;

/// Queue a contact message. Answers 202: delivery happens later.
#[instrument(skip(state, request))]
pub async fn submit(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<Success>), AppError> {
    submit_contact(state.pool(), request).await?;
    Ok((StatusCode::ACCEPTED, Json(Success::OK)))
}
