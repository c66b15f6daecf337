//! Async adapter that exposes [`Database`] through the core storage ports.
//! Every call runs on the blocking pool.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use skills_core::ports::{
    AccountStore, BoxFuture, ConversationStore, MessageStore, ProfileStore, TaskStore,
};
use skills_core::{CoreError, CoreResult};
use skills_types::api::ProfileUpdate;
use skills_types::models::{
    Account, Conversation, ConversationPair, Message, MessagePage, NewMessage, NewTask, Profile,
    Task, TaskChanges,
};

use crate::Database;

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn blocking<T, F>(&self, op: &'static str, f: F) -> BoxFuture<'static, CoreResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || f(&db))
                .await
                .map_err(|e| {
                    error!("spawn_blocking join error in {}: {}", op, e);
                    CoreError::Internal("storage task failed".into())
                })?
                .map_err(|e| {
                    error!("{} failed: {:#}", op, e);
                    CoreError::storage(e)
                })
        })
    }
}

impl ConversationStore for SqliteStore {
    fn find_conversation_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.blocking("find_conversation_between", move |db| {
            db.find_conversation_between(a, b)
        })
    }

    fn insert_conversation(
        &self,
        pair: ConversationPair,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.blocking("insert_conversation", move |db| db.insert_conversation(pair))
    }

    fn get_conversation(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.blocking("get_conversation", move |db| db.get_conversation(id))
    }

    fn list_conversations_for(&self, user_id: Uuid) -> BoxFuture<'_, CoreResult<Vec<Conversation>>> {
        self.blocking("list_conversations_for", move |db| {
            db.list_conversations_for(user_id)
        })
    }
}

impl MessageStore for SqliteStore {
    fn insert_message(&self, message: NewMessage) -> BoxFuture<'_, CoreResult<Message>> {
        self.blocking("insert_message", move |db| db.insert_message(message))
    }

    fn list_messages(
        &self,
        conversation_id: Uuid,
        page: MessagePage,
    ) -> BoxFuture<'_, CoreResult<Vec<Message>>> {
        self.blocking("list_messages", move |db| {
            db.list_messages(conversation_id, page)
        })
    }

    fn get_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Message>>> {
        self.blocking("get_message", move |db| db.get_message(id))
    }

    fn delete_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.blocking("delete_message", move |db| db.delete_message(id))
    }
}

impl ProfileStore for SqliteStore {
    fn list_profile_ids(&self) -> BoxFuture<'_, CoreResult<Vec<Uuid>>> {
        self.blocking("list_profile_ids", |db| db.list_profile_ids())
    }

    fn get_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Profile>>> {
        self.blocking("get_profile", move |db| db.get_profile(id))
    }

    fn upsert_profile(&self, profile: Profile) -> BoxFuture<'_, CoreResult<Profile>> {
        self.blocking("upsert_profile", move |db| db.upsert_profile(profile))
    }

    fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, CoreResult<Option<Profile>>> {
        self.blocking("update_profile", move |db| db.update_profile(id, update))
    }

    fn delete_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.blocking("delete_profile", move |db| db.delete_profile(id))
    }
}

impl TaskStore for SqliteStore {
    fn insert_task(&self, task: NewTask) -> BoxFuture<'_, CoreResult<Task>> {
        self.blocking("insert_task", move |db| db.insert_task(task))
    }

    fn get_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Task>>> {
        self.blocking("get_task", move |db| db.get_task(id))
    }

    fn update_task(&self, id: Uuid, changes: TaskChanges) -> BoxFuture<'_, CoreResult<Option<Task>>> {
        self.blocking("update_task", move |db| db.update_task(id, changes))
    }

    fn delete_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.blocking("delete_task", move |db| db.delete_task(id))
    }

    fn list_tasks(&self, limit: u32, offset: u32) -> BoxFuture<'_, CoreResult<Vec<Task>>> {
        self.blocking("list_tasks", move |db| db.list_tasks(limit, offset))
    }
}

impl AccountStore for SqliteStore {
    fn insert_account(&self, account: Account) -> BoxFuture<'_, CoreResult<bool>> {
        self.blocking("insert_account", move |db| db.insert_account(account))
    }

    fn find_account_by_email(&self, email: &str) -> BoxFuture<'_, CoreResult<Option<Account>>> {
        let email = email.to_string();
        self.blocking("find_account_by_email", move |db| {
            db.find_account_by_email(&email)
        })
    }
}
