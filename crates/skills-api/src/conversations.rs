use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::WithRejection;

use skills_types::api::{ConversationEnvelope, ConversationList, CreateConversationRequest};
use skills_types::models::Principal;

use crate::error::ApiError;
use crate::state::AppState;

/// 201 when this call created the row, 200 when it already existed.
pub async fn create_conversation(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    WithRejection(Json(req), _): WithRejection<Json<CreateConversationRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let resolved = state
        .conversations
        .resolve_or_create(principal.user_id, req.peer_id.as_deref())
        .await?;

    let status = if resolved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ConversationEnvelope {
            conversation: resolved.conversation,
        }),
    ))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<ConversationList>, ApiError> {
    let conversations = state.conversations.list_for_user(principal.user_id).await?;
    Ok(Json(ConversationList { conversations }))
}
