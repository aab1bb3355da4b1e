//! Chat handler

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{body::Bytes, extract::State, Json};
use rivers_conversation::{parse_turns, PipelineError};
use rivers_types::ChatReply;
use tracing::error;

/// Answer one chat turn
///
/// The body is taken raw so malformed JSON maps onto the pipeline's own
/// validation messages.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<ChatReply>> {
    let turns = parse_turns(&body).map_err(chat_error)?;
    let reply = state.pipeline.respond(&turns).await.map_err(chat_error)?;
    Ok(Json(reply))
}

fn chat_error(err: PipelineError) -> ApiError {
    if err.is_client_error() {
        return ApiError::BadRequest(err.to_string());
    }

    error!(error = %err, "chat turn failed");
    ApiError::Internal("Something went wrong".to_string())
}
