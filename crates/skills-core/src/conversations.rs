use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use skills_types::models::{Conversation, ConversationPair};

use crate::ports::ConversationStore;
use crate::{CoreError, CoreResult};

/// Result of `resolve_or_create`: the row, and whether this call inserted it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub conversation: Conversation,
    pub created: bool,
}

/// Finds or creates the single conversation row for a pair of users.
#[derive(Clone)]
pub struct Conversations {
    store: Arc<dyn ConversationStore>,
}

impl Conversations {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn ConversationStore {
        self.store.as_ref()
    }

    /// Idempotent: resolving (A,B) and (B,A) yields the same row, and at most
    /// one row ever exists for the pair.
    pub async fn resolve_or_create(&self, requester: Uuid, peer: Option<&str>) -> CoreResult<Resolved> {
        let peer = parse_peer_id(peer)?;
        let pair = ConversationPair::new(requester, peer)
            .ok_or_else(|| CoreError::invalid("Cannot create conversation with yourself"))?;

        if let Some(conversation) = self.store.find_conversation_between(requester, peer).await? {
            debug!(conversation_id = %conversation.id, "conversation already exists");
            return Ok(Resolved {
                conversation,
                created: false,
            });
        }

        match self.store.insert_conversation(pair).await? {
            Some(conversation) => {
                info!(
                    conversation_id = %conversation.id,
                    user1 = %pair.user1(),
                    user2 = %pair.user2(),
                    "conversation created"
                );
                Ok(Resolved {
                    conversation,
                    created: true,
                })
            }
            None => {
                // Lost an insert race for the same pair; the winner's row is
                // the answer.
                let conversation = self
                    .store
                    .find_conversation_between(requester, peer)
                    .await?
                    .ok_or_else(|| CoreError::Internal("conversation vanished after conflict".into()))?;
                Ok(Resolved {
                    conversation,
                    created: false,
                })
            }
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<Conversation>> {
        self.store.list_conversations_for(user_id).await
    }
}

pub fn parse_peer_id(raw: Option<&str>) -> CoreResult<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::invalid("peer_id is required"))?;
    raw.parse()
        .map_err(|_| CoreError::invalid("peer_id must be a valid user id"))
}
