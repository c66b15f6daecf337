use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Conversation, Message};

/// A committed insert reported by the store's change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "table", content = "record", rename_all = "snake_case")]
pub enum ChangeEvent {
    Messages(Message),
    Conversations(Conversation),
}

/// A change-feed watch: one table and a single equality predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeFilter {
    /// `messages.conversation_id = id`
    MessageConversation(Uuid),
    /// `conversations.user1_id = id`
    ConversationUser1(Uuid),
    /// `conversations.user2_id = id`
    ConversationUser2(Uuid),
}

impl ChangeFilter {
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (Self::MessageConversation(id), ChangeEvent::Messages(m)) => m.conversation_id == *id,
            (Self::ConversationUser1(id), ChangeEvent::Conversations(c)) => c.user1_id == *id,
            (Self::ConversationUser2(id), ChangeEvent::Conversations(c)) => c.user2_id == *id,
            _ => false,
        }
    }
}

/// Frames pushed down a live subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Message(Message),
    Conversation(Conversation),
    Heartbeat,
}

impl StreamEvent {
    /// SSE event name, `None` for heartbeats (sent as comments).
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            Self::Message(_) => Some("message"),
            Self::Conversation(_) => Some("conversation"),
            Self::Heartbeat => None,
        }
    }

    pub fn data(&self) -> Option<serde_json::Result<String>> {
        match self {
            Self::Message(m) => Some(serde_json::to_string(m)),
            Self::Conversation(c) => Some(serde_json::to_string(c)),
            Self::Heartbeat => None,
        }
    }
}

impl From<ChangeEvent> for StreamEvent {
    fn from(event: ChangeEvent) -> Self {
        match event {
            ChangeEvent::Messages(m) => Self::Message(m),
            ChangeEvent::Conversations(c) => Self::Conversation(c),
        }
    }
}
