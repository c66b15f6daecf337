use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use skills_core::membership::parse_conversation_id;
use skills_core::messages::{SendTarget, page_from_query};
use skills_types::api::{MessageEnvelope, MessageList, MessageQuery, SendMessageRequest};
use skills_types::models::Principal;

use crate::error::{ApiError, path_id};
use crate::state::AppState;

pub async fn send_message(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(req), _): WithRejection<Json<SendMessageRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let target = SendTarget {
        conversation_id: req.conversation_id,
        peer_id: req.peer_id,
    };
    let message = state
        .messages
        .send(principal.user_id, target, req.text.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(MessageEnvelope { message })))
}

/// Newest first. Pass the `created_at` of the oldest message from the
/// previous page as `before` to walk further back.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Query(query), _): WithRejection<Query<MessageQuery>, ApiError>,
) -> Result<Json<MessageList>, ApiError> {
    let conversation_id = parse_conversation_id(query.conversation_id.as_deref())?;
    let page = page_from_query(query.limit.as_deref(), query.before.as_deref())?;

    let messages = state
        .messages
        .fetch(principal.user_id, conversation_id, page)
        .await?;
    Ok(Json(MessageList { messages }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(message_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let message_id = path_id(&message_id, "Message not found")?;
    state.messages.delete(principal.user_id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
