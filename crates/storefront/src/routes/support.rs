//! Support assistant route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use super::ApiJson;
use crate::error::AppError;
use crate::services::support::{self, ChatReply, ChatRequest};
use crate::state::AppState;

/// Answer the latest message of a support conversation.
#[instrument(skip(state, request))]
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = support::chat(state.claude(), state.config(), request).await?;
    Ok(Json(reply))
}
