use uuid::Uuid;

use skills_types::models::Conversation;

use crate::ports::ConversationStore;
use crate::{CoreError, CoreResult};

/// Loads the conversation and checks that `user_id` is one of its two
/// participants. Required before touching the conversation's messages or
/// opening a stream on it.
pub async fn check_membership(
    store: &dyn ConversationStore,
    user_id: Uuid,
    conversation_id: Uuid,
) -> CoreResult<Conversation> {
    let conversation = store
        .get_conversation(conversation_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Conversation not found"))?;

    if !conversation.has_participant(user_id) {
        return Err(CoreError::forbidden("Not a participant in this conversation"));
    }

    Ok(conversation)
}

/// Parses a conversation id coming from a request.
pub fn parse_conversation_id(raw: Option<&str>) -> CoreResult<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::invalid("conversation_id is required"))?;
    // A malformed id can never name a row.
    raw.parse()
        .map_err(|_| CoreError::not_found("Conversation not found"))
}
