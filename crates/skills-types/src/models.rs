use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles that may read and modify any profile.
pub const ADMIN_ROLES: &[&str] = &["admin", "service_role"];

/// The authenticated identity attached to a request by the access gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        ADMIN_ROLES.contains(&self.role.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl Profile {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            skills: Vec::new(),
            bio: None,
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    pub fn pair(&self) -> Option<ConversationPair> {
        ConversationPair::new(self.user1_id, self.user2_id)
    }
}

/// An unordered pair of distinct participants, stored lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationPair {
    low: Uuid,
    high: Uuid,
}

impl ConversationPair {
    /// Returns `None` when both ids are the same user.
    pub fn new(a: Uuid, b: Uuid) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn user1(&self) -> Uuid {
        self.low
    }

    pub fn user2(&self) -> Uuid {
        self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a message; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
}

/// One page request over a conversation's history, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePage {
    pub limit: u32,
    pub before: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
}

/// Credentials row owned by the built-in identity provider.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
