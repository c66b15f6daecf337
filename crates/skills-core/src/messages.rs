use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use skills_types::models::{Message, MessagePage, NewMessage};

use crate::conversations::Conversations;
use crate::membership::check_membership;
use crate::ports::{ConversationStore, MessageStore};
use crate::{CoreError, CoreResult};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Where a message goes: an existing conversation, or the conversation with
/// a peer (created on demand).
#[derive(Debug, Clone, Default)]
pub struct SendTarget {
    pub conversation_id: Option<String>,
    pub peer_id: Option<String>,
}

/// Appends, pages and deletes messages, always behind the membership check.
#[derive(Clone)]
pub struct Messages {
    conversations: Conversations,
    store: Arc<dyn MessageStore>,
}

impl Messages {
    pub fn new(conversations: Conversations, store: Arc<dyn MessageStore>) -> Self {
        Self {
            conversations,
            store,
        }
    }

    fn conversation_store(&self) -> &dyn ConversationStore {
        self.conversations.store()
    }

    pub async fn send(&self, sender: Uuid, target: SendTarget, text: Option<&str>) -> CoreResult<Message> {
        let text = text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| CoreError::invalid("text is required"))?;

        let conversation_id = match non_blank(target.conversation_id.as_deref()) {
            Some(raw) => raw
                .parse::<Uuid>()
                .map_err(|_| CoreError::not_found("Conversation not found"))?,
            None => match non_blank(target.peer_id.as_deref()) {
                Some(peer) => {
                    self.conversations
                        .resolve_or_create(sender, Some(peer))
                        .await?
                        .conversation
                        .id
                }
                None => {
                    return Err(CoreError::invalid("conversation_id or peer_id is required"));
                }
            },
        };

        check_membership(self.conversation_store(), sender, conversation_id).await?;

        let message = self
            .store
            .insert_message(NewMessage {
                conversation_id,
                sender_id: sender,
                text: text.to_string(),
            })
            .await?;

        info!(message_id = %message.id, %conversation_id, "message sent");
        Ok(message)
    }

    pub async fn fetch(
        &self,
        caller: Uuid,
        conversation_id: Uuid,
        page: MessagePage,
    ) -> CoreResult<Vec<Message>> {
        check_membership(self.conversation_store(), caller, conversation_id).await?;
        self.store.list_messages(conversation_id, page).await
    }

    /// Sender-only, permanent.
    pub async fn delete(&self, caller: Uuid, message_id: Uuid) -> CoreResult<()> {
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Message not found"))?;

        if message.sender_id != caller {
            return Err(CoreError::forbidden("Not allowed to delete this message"));
        }

        if !self.store.delete_message(message_id).await? {
            return Err(CoreError::not_found("Message not found"));
        }

        info!(%message_id, "message deleted");
        Ok(())
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Reads the leading integer of `raw`, so `"5abc"` and `"2.5"` give 5 and 2.
/// Digit runs too long for `i64` saturate.
fn leading_int(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Builds a page request from raw query values. A missing, non-numeric or
/// zero limit means the default; anything else is clamped to [1, 100].
pub fn page_from_query(limit: Option<&str>, before: Option<&str>) -> CoreResult<MessagePage> {
    let limit = match limit.and_then(leading_int) {
        None | Some(0) => DEFAULT_PAGE_SIZE,
        Some(n) => n.clamp(1, MAX_PAGE_SIZE as i64) as u32,
    };

    let before = match non_blank(before) {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| CoreError::invalid("before must be an RFC 3339 timestamp"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    Ok(MessagePage { limit, before })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use std::collections::HashSet;

    struct Fixture {
        messages: Messages,
        store: Arc<MemoryStore>,
        a: Uuid,
        b: Uuid,
        conversation_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let conversations = Conversations::new(store.clone());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let conversation_id = conversations
            .resolve_or_create(a, Some(&b.to_string()))
            .await
            .unwrap()
            .conversation
            .id;
        Fixture {
            messages: Messages::new(conversations, store.clone()),
            store,
            a,
            b,
            conversation_id,
        }
    }

    fn to(conversation_id: Uuid) -> SendTarget {
        SendTarget {
            conversation_id: Some(conversation_id.to_string()),
            peer_id: None,
        }
    }

    fn page(limit: u32, before: Option<DateTime<Utc>>) -> MessagePage {
        MessagePage { limit, before }
    }

    #[tokio::test]
    async fn send_and_fetch() {
        let f = fixture().await;
        let sent = f.messages.send(f.a, to(f.conversation_id), Some("hi")).await.unwrap();
        assert_eq!(sent.sender_id, f.a);
        assert_eq!(sent.conversation_id, f.conversation_id);

        let fetched = f.messages.fetch(f.b, f.conversation_id, page(10, None)).await.unwrap();
        assert_eq!(fetched, vec![sent]);
    }

    #[tokio::test]
    async fn send_by_peer_resolves_same_conversation() {
        let f = fixture().await;
        let target = SendTarget {
            conversation_id: None,
            peer_id: Some(f.a.to_string()),
        };
        let sent = f.messages.send(f.b, target, Some("yo")).await.unwrap();
        assert_eq!(sent.conversation_id, f.conversation_id);
    }

    #[tokio::test]
    async fn blank_text_creates_nothing() {
        let f = fixture().await;
        for text in [None, Some(""), Some("   \n\t")] {
            assert!(matches!(
                f.messages.send(f.a, to(f.conversation_id), text).await,
                Err(CoreError::InvalidArgument(_))
            ));
        }
        let rows = f.store.list_messages(f.conversation_id, page(100, None)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn send_requires_a_target() {
        let f = fixture().await;
        assert!(matches!(
            f.messages.send(f.a, SendTarget::default(), Some("hi")).await,
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn outsiders_are_forbidden() {
        let f = fixture().await;
        let outsider = Uuid::new_v4();
        assert!(matches!(
            f.messages.send(outsider, to(f.conversation_id), Some("hi")).await,
            Err(CoreError::Forbidden(_))
        ));
        assert!(matches!(
            f.messages.fetch(outsider, f.conversation_id, page(10, None)).await,
            Err(CoreError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn unknown_conversation_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.messages.send(f.a, to(Uuid::new_v4()), Some("hi")).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn pages_chain_without_duplicates_or_gaps() {
        let f = fixture().await;
        let mut sent = Vec::new();
        for i in 0..25 {
            let sender = if i % 2 == 0 { f.a } else { f.b };
            let msg = f
                .messages
                .send(sender, to(f.conversation_id), Some(&format!("m{i}")))
                .await
                .unwrap();
            sent.push(msg.id);
        }

        let mut seen = Vec::new();
        let mut before = None;
        loop {
            let batch = f
                .messages
                .fetch(f.a, f.conversation_id, page(10, before))
                .await
                .unwrap();
            assert!(batch.len() <= 10);
            assert!(batch.windows(2).all(|w| w[0].created_at > w[1].created_at));
            if let Some(last) = batch.last() {
                before = Some(last.created_at);
            }
            let full = batch.len() == 10;
            seen.extend(batch.into_iter().map(|m| m.id));
            if !full {
                break;
            }
        }

        assert_eq!(seen.len(), 25);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 25);
        sent.reverse();
        assert_eq!(seen, sent);
    }

    #[tokio::test]
    async fn only_sender_deletes() {
        let f = fixture().await;
        let msg = f.messages.send(f.a, to(f.conversation_id), Some("oops")).await.unwrap();

        assert!(matches!(
            f.messages.delete(f.b, msg.id).await,
            Err(CoreError::Forbidden(_))
        ));
        f.messages.delete(f.a, msg.id).await.unwrap();
        assert!(f.messages.fetch(f.b, f.conversation_id, page(10, None)).await.unwrap().is_empty());
        assert!(matches!(
            f.messages.delete(f.a, msg.id).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn page_limit_rules() {
        let limit = |raw: Option<&str>| page_from_query(raw, None).unwrap().limit;
        assert_eq!(limit(None), 20);
        assert_eq!(limit(Some("abc")), 20);
        assert_eq!(limit(Some("0")), 20);
        assert_eq!(limit(Some("-5")), 1);
        assert_eq!(limit(Some("7")), 7);
        assert_eq!(limit(Some("1000")), 100);
        assert_eq!(limit(Some("5abc")), 5);
        assert_eq!(limit(Some("2.5")), 2);
        assert_eq!(limit(Some(" 12 ")), 12);
        assert_eq!(limit(Some("-")), 20);
        assert_eq!(limit(Some("99999999999999999999999")), 100);
    }

    #[test]
    fn page_before_must_parse() {
        assert!(matches!(
            page_from_query(None, Some("yesterday")),
            Err(CoreError::InvalidArgument(_))
        ));
        let page = page_from_query(None, Some("2024-05-01T10:00:00.123456Z")).unwrap();
        assert_eq!(page.before.unwrap().timestamp_subsec_micros(), 123456);
    }
}
