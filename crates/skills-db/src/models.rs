//! Database row types. These map directly to SQLite rows and are converted
//! into the shared models at the edge of the DB layer.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use skills_types::models::{Account, Conversation, Message, Profile, Task};

/// Fixed-width so that text comparison in SQL orders like time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub fn format_ts(ts: DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Cursor text for `created_at < ?`. Stored stamps stop at microseconds, so a
/// finer cursor rounds up to the next microsecond instead of truncating.
pub fn format_cursor(ts: DateTime<Utc>) -> String {
    let sub_micro = ts.timestamp_subsec_nanos() % 1_000;
    if sub_micro == 0 {
        format_ts(ts)
    } else {
        format_ts(ts + Duration::nanoseconds(i64::from(1_000 - sub_micro)))
    }
}

pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|ndt| ndt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .with_context(|| format!("corrupt timestamp '{raw}'"))
}

fn parse_id(raw: &str, column: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("corrupt {column} '{raw}'"))
}

fn parse_list(raw: &str, column: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).with_context(|| format!("corrupt {column} '{raw}'"))
}

pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

pub struct ConversationRow {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub created_at: String,
}

impl ConversationRow {
    pub fn into_model(self) -> Result<Conversation> {
        Ok(Conversation {
            id: parse_id(&self.id, "conversation id")?,
            user1_id: parse_id(&self.user1_id, "user1_id")?,
            user2_id: parse_id(&self.user2_id, "user2_id")?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub text: String,
    pub created_at: String,
}

impl MessageRow {
    pub fn into_model(self) -> Result<Message> {
        Ok(Message {
            id: parse_id(&self.id, "message id")?,
            conversation_id: parse_id(&self.conversation_id, "conversation_id")?,
            sender_id: parse_id(&self.sender_id, "sender_id")?,
            text: self.text,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub skills: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl ProfileRow {
    pub fn into_model(self) -> Result<Profile> {
        Ok(Profile {
            id: parse_id(&self.id, "profile id")?,
            email: self.email,
            name: self.name,
            skills: parse_list(&self.skills, "skills")?,
            bio: self.bio,
            location: self.location,
        })
    }
}

pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub requirements: String,
    pub created_at: String,
}

impl TaskRow {
    pub fn into_model(self) -> Result<Task> {
        Ok(Task {
            id: parse_id(&self.id, "task id")?,
            title: self.title,
            description: self.description,
            requirements: parse_list(&self.requirements, "requirements")?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

pub struct AccountRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl AccountRow {
    pub fn into_model(self) -> Result<Account> {
        Ok(Account {
            id: parse_id(&self.id, "account id")?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}
