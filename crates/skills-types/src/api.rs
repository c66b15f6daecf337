use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Conversation, Message, Profile};

// -- JWT Claims --

/// Claims carried by tokens minted by the built-in identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: AuthUser,
    pub session: Session,
}

// -- Conversations --

#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub peer_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationEnvelope {
    pub conversation: Conversation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub peer_id: Option<String>,
    pub text: Option<String>,
}

/// Query for `GET /messages`. Everything arrives as text so malformed values
/// can be reported (or defaulted) by the handler instead of the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub conversation_id: Option<String>,
    pub limit: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: Message,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
}

// -- Profiles --

#[derive(Debug, Serialize, Deserialize)]
pub struct UserIdList {
    pub users: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub profile: Profile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileUpdated {
    pub message: String,
    pub profile: Profile,
}

/// Whitelisted profile fields; any other key in the body is ignored.
/// `bio` and `location` distinguish an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skills: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
}

/// Only runs when the key is present, so `null` lands as `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.skills.is_none()
            && self.bio.is_none()
            && self.location.is_none()
    }

    pub fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(email) = self.email {
            profile.email = email;
        }
        if let Some(skills) = self.skills {
            profile.skills = skills;
        }
        if let Some(bio) = self.bio {
            profile.bio = bio;
        }
        if let Some(location) = self.location {
            profile.location = location;
        }
    }
}

// -- Tasks --

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<TextList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// -- Matching --

/// A list of short strings given either as a JSON array or as one string
/// separated by commas or newlines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextList {
    Items(Vec<Value>),
    Text(String),
    Other(Value),
}

impl TextList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::Items(items) => items.into_iter().filter_map(value_text).collect(),
            Self::Text(text) => text
                .split([',', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Self::Other(value) => value_text(value).into_iter().collect(),
        }
    }
}

/// Stringifies a JSON value, dropping falsy ones (null, false, 0, "").
fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Deserialize)]
pub struct AiMatchRequest {
    pub skills: Option<TextList>,
    pub requirements: Option<TextList>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub match_score: f64,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub user_id: Option<String>,
    pub task_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchResponse {
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub match_score: f64,
    pub comment: String,
}
