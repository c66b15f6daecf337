use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use skills_types::api::ProfileUpdate;
use skills_types::events::ChangeEvent;
use skills_types::models::{
    Account, Conversation, ConversationPair, Message, MessagePage, NewMessage, NewTask, Profile,
    Task, TaskChanges,
};

use crate::Database;
use crate::models::{
    AccountRow, ConversationRow, MessageRow, ProfileRow, TaskRow, encode_list, format_cursor, format_ts,
};

impl Database {
    // -- Conversations --

    /// Matches the pair in either column order.
    pub fn find_conversation_between(&self, a: Uuid, b: Uuid) -> Result<Option<Conversation>> {
        let (a, b) = (a.to_string(), b.to_string());
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user1_id, user2_id, created_at FROM conversations
                 WHERE (user1_id = ?1 AND user2_id = ?2) OR (user1_id = ?2 AND user2_id = ?1)
                 LIMIT 1",
                params![a, b],
                conversation_row,
            )
            .optional()?
            .map(ConversationRow::into_model)
            .transpose()
        })
    }

    /// `None` when the pair already has a row.
    pub fn insert_conversation(&self, pair: ConversationPair) -> Result<Option<Conversation>> {
        self.with_conn_mut(|conn| {
            let conversation = Conversation {
                id: Uuid::new_v4(),
                user1_id: pair.user1(),
                user2_id: pair.user2(),
                created_at: self.clock.now(),
            };
            let inserted = conn.execute(
                "INSERT INTO conversations (id, user1_id, user2_id, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user1_id, user2_id) DO NOTHING",
                params![
                    conversation.id.to_string(),
                    conversation.user1_id.to_string(),
                    conversation.user2_id.to_string(),
                    format_ts(conversation.created_at),
                ],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            self.publish(ChangeEvent::Conversations(conversation.clone()));
            Ok(Some(conversation))
        })
    }

    pub fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, user1_id, user2_id, created_at FROM conversations WHERE id = ?1",
                [id.to_string()],
                conversation_row,
            )
            .optional()?
            .map(ConversationRow::into_model)
            .transpose()
        })
    }

    pub fn list_conversations_for(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user1_id, user2_id, created_at FROM conversations
                 WHERE user1_id = ?1 OR user2_id = ?1
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([user_id.to_string()], conversation_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(ConversationRow::into_model).collect()
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: NewMessage) -> Result<Message> {
        self.with_conn_mut(|conn| {
            let row = Message {
                id: Uuid::new_v4(),
                conversation_id: message.conversation_id,
                sender_id: message.sender_id,
                text: message.text,
                created_at: self.clock.now(),
            };
            conn.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.to_string(),
                    row.conversation_id.to_string(),
                    row.sender_id.to_string(),
                    row.text,
                    format_ts(row.created_at),
                ],
            )?;
            self.publish(ChangeEvent::Messages(row.clone()));
            Ok(row)
        })
    }

    pub fn list_messages(&self, conversation_id: Uuid, page: MessagePage) -> Result<Vec<Message>> {
        let before = page.before.map(format_cursor);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, text, created_at FROM messages
                 WHERE conversation_id = ?1 AND (?2 IS NULL OR created_at < ?2)
                 ORDER BY created_at DESC
                 LIMIT ?3",
            )?;
            let rows = stmt
                .query_map(
                    params![conversation_id.to_string(), before, page.limit],
                    message_row,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(MessageRow::into_model).collect()
        })
    }

    pub fn get_message(&self, id: Uuid) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, conversation_id, sender_id, text, created_at FROM messages WHERE id = ?1",
                [id.to_string()],
                message_row,
            )
            .optional()?
            .map(MessageRow::into_model)
            .transpose()
        })
    }

    pub fn delete_message(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM messages WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
    }

    // -- Profiles --

    pub fn list_profile_ids(&self) -> Result<Vec<Uuid>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM profiles ORDER BY id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids.iter()
                .map(|id| {
                    id.parse::<Uuid>()
                        .map_err(|e| anyhow::anyhow!("corrupt profile id '{}': {}", id, e))
                })
                .collect()
        })
    }

    pub fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        self.with_conn(|conn| query_profile(conn, id))
    }

    /// Inserts the profile, or refreshes email and name if it exists.
    pub fn upsert_profile(&self, profile: Profile) -> Result<Profile> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, email, name, skills, bio, location)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (id) DO UPDATE SET email = excluded.email, name = excluded.name",
                params![
                    profile.id.to_string(),
                    profile.email,
                    profile.name,
                    encode_list(&profile.skills),
                    profile.bio,
                    profile.location,
                ],
            )?;
            query_profile(conn, profile.id)?
                .ok_or_else(|| anyhow::anyhow!("profile {} missing after upsert", profile.id))
        })
    }

    pub fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<Profile>> {
        self.with_conn_mut(|conn| {
            let Some(mut profile) = query_profile(conn, id)? else {
                return Ok(None);
            };
            update.apply(&mut profile);
            conn.execute(
                "UPDATE profiles SET email = ?2, name = ?3, skills = ?4, bio = ?5, location = ?6
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    profile.email,
                    profile.name,
                    encode_list(&profile.skills),
                    profile.bio,
                    profile.location,
                ],
            )?;
            Ok(Some(profile))
        })
    }

    pub fn delete_profile(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM profiles WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
    }

    // -- Tasks --

    pub fn insert_task(&self, task: NewTask) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let row = Task {
                id: Uuid::new_v4(),
                title: task.title,
                description: task.description,
                requirements: task.requirements,
                created_at: self.clock.now(),
            };
            conn.execute(
                "INSERT INTO tasks (id, title, description, requirements, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.to_string(),
                    row.title,
                    row.description,
                    encode_list(&row.requirements),
                    format_ts(row.created_at),
                ],
            )?;
            Ok(row)
        })
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        self.with_conn(|conn| query_task(conn, id))
    }

    pub fn update_task(&self, id: Uuid, changes: TaskChanges) -> Result<Option<Task>> {
        self.with_conn_mut(|conn| {
            let Some(mut task) = query_task(conn, id)? else {
                return Ok(None);
            };
            if let Some(title) = changes.title {
                task.title = title;
            }
            if changes.description.is_some() {
                task.description = changes.description;
            }
            if let Some(requirements) = changes.requirements {
                task.requirements = requirements;
            }
            conn.execute(
                "UPDATE tasks SET title = ?2, description = ?3, requirements = ?4 WHERE id = ?1",
                params![
                    id.to_string(),
                    task.title,
                    task.description,
                    encode_list(&task.requirements),
                ],
            )?;
            Ok(Some(task))
        })
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
    }

    pub fn list_tasks(&self, limit: u32, offset: u32) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, requirements, created_at FROM tasks
                 ORDER BY created_at DESC
                 LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt
                .query_map(params![limit, offset], task_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            rows.into_iter().map(TaskRow::into_model).collect()
        })
    }

    // -- Accounts --

    /// `false` when the email is taken.
    pub fn insert_account(&self, account: Account) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT INTO accounts (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (email) DO NOTHING",
                params![
                    account.id.to_string(),
                    account.email,
                    account.password_hash,
                    format_ts(account.created_at),
                ],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, email, password_hash, created_at FROM accounts WHERE email = ?1",
                [email],
                account_row,
            )
            .optional()?
            .map(AccountRow::into_model)
            .transpose()
        })
    }
}

fn query_profile(conn: &Connection, id: Uuid) -> Result<Option<Profile>> {
    conn.query_row(
        "SELECT id, email, name, skills, bio, location FROM profiles WHERE id = ?1",
        [id.to_string()],
        |row| {
            Ok(ProfileRow {
                id: row.get(0)?,
                email: row.get(1)?,
                name: row.get(2)?,
                skills: row.get(3)?,
                bio: row.get(4)?,
                location: row.get(5)?,
            })
        },
    )
    .optional()?
    .map(ProfileRow::into_model)
    .transpose()
}

fn query_task(conn: &Connection, id: Uuid) -> Result<Option<Task>> {
    conn.query_row(
        "SELECT id, title, description, requirements, created_at FROM tasks WHERE id = ?1",
        [id.to_string()],
        task_row,
    )
    .optional()?
    .map(TaskRow::into_model)
    .transpose()
}

fn conversation_row(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    Ok(ConversationRow {
        id: row.get(0)?,
        user1_id: row.get(1)?,
        user2_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        sender_id: row.get(2)?,
        text: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn task_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        requirements: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn account_row(row: &Row<'_>) -> rusqlite::Result<AccountRow> {
    Ok(AccountRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}
