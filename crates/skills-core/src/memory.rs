//! In-memory store with the same semantics as the SQLite one. Backs tests and
//! local experiments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use skills_types::api::ProfileUpdate;
use skills_types::events::ChangeEvent;
use skills_types::models::{
    Account, Conversation, ConversationPair, Message, MessagePage, NewMessage, NewTask, Profile,
    Task, TaskChanges,
};

use crate::CoreResult;
use crate::clock::MonotonicClock;
use crate::feed::FeedHub;
use crate::ports::{
    AccountStore, BoxFuture, ConversationStore, MessageStore, ProfileStore, TaskStore,
};

#[derive(Default)]
struct Tables {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    profiles: HashMap<Uuid, Profile>,
    tasks: Vec<Task>,
    accounts: Vec<Account>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: MonotonicClock,
    feed: Option<FeedHub>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock: MonotonicClock::new(),
            feed: None,
            queries: AtomicUsize::new(0),
        }
    }

    /// Publishes committed inserts to `feed`.
    pub fn with_feed(feed: FeedHub) -> Self {
        Self {
            feed: Some(feed),
            ..Self::new()
        }
    }

    /// Number of store operations issued so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    fn publish(&self, event: ChangeEvent) {
        if let Some(feed) = &self.feed {
            feed.publish(event);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore for MemoryStore {
    fn find_conversation_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .conversations
                .iter()
                .find(|c| (c.user1_id == a && c.user2_id == b) || (c.user1_id == b && c.user2_id == a))
                .cloned())
        })
    }

    fn insert_conversation(
        &self,
        pair: ConversationPair,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if tables.conversations.iter().any(|c| c.pair() == Some(pair)) {
                return Ok(None);
            }
            let conversation = Conversation {
                id: Uuid::new_v4(),
                user1_id: pair.user1(),
                user2_id: pair.user2(),
                created_at: self.clock.now(),
            };
            tables.conversations.push(conversation.clone());
            // Publish under the lock so feed order is commit order.
            self.publish(ChangeEvent::Conversations(conversation.clone()));
            Ok(Some(conversation))
        })
    }

    fn get_conversation(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Conversation>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.conversations.iter().find(|c| c.id == id).cloned())
        })
    }

    fn list_conversations_for(&self, user_id: Uuid) -> BoxFuture<'_, CoreResult<Vec<Conversation>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut rows: Vec<_> = tables
                .conversations
                .iter()
                .filter(|c| c.has_participant(user_id))
                .cloned()
                .collect();
            rows.sort_by(|x, y| y.created_at.cmp(&x.created_at));
            Ok(rows)
        })
    }
}

impl MessageStore for MemoryStore {
    fn insert_message(&self, message: NewMessage) -> BoxFuture<'_, CoreResult<Message>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let row = Message {
                id: Uuid::new_v4(),
                conversation_id: message.conversation_id,
                sender_id: message.sender_id,
                text: message.text,
                created_at: self.clock.now(),
            };
            tables.messages.push(row.clone());
            self.publish(ChangeEvent::Messages(row.clone()));
            Ok(row)
        })
    }

    fn list_messages(
        &self,
        conversation_id: Uuid,
        page: MessagePage,
    ) -> BoxFuture<'_, CoreResult<Vec<Message>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut rows: Vec<_> = tables
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation_id)
                .filter(|m| page.before.is_none_or(|before| m.created_at < before))
                .cloned()
                .collect();
            rows.sort_by(|x, y| y.created_at.cmp(&x.created_at));
            rows.truncate(page.limit as usize);
            Ok(rows)
        })
    }

    fn get_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Message>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.messages.iter().find(|m| m.id == id).cloned())
        })
    }

    fn delete_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let before = tables.messages.len();
            tables.messages.retain(|m| m.id != id);
            Ok(tables.messages.len() != before)
        })
    }
}

impl ProfileStore for MemoryStore {
    fn list_profile_ids(&self) -> BoxFuture<'_, CoreResult<Vec<Uuid>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut ids: Vec<_> = tables.profiles.keys().copied().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn get_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Profile>>> {
        self.touch();
        Box::pin(async move { Ok(self.tables.read().await.profiles.get(&id).cloned()) })
    }

    fn upsert_profile(&self, profile: Profile) -> BoxFuture<'_, CoreResult<Profile>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let row = match tables.profiles.get(&profile.id) {
                // Upsert only overwrites the columns supplied at signup.
                Some(existing) => Profile {
                    email: profile.email,
                    name: profile.name,
                    ..existing.clone()
                },
                None => profile,
            };
            tables.profiles.insert(row.id, row.clone());
            Ok(row)
        })
    }

    fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, CoreResult<Option<Profile>>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            Ok(tables.profiles.get_mut(&id).map(|profile| {
                update.apply(profile);
                profile.clone()
            }))
        })
    }

    fn delete_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.touch();
        Box::pin(async move { Ok(self.tables.write().await.profiles.remove(&id).is_some()) })
    }
}

impl TaskStore for MemoryStore {
    fn insert_task(&self, task: NewTask) -> BoxFuture<'_, CoreResult<Task>> {
        self.touch();
        Box::pin(async move {
            let row = Task {
                id: Uuid::new_v4(),
                title: task.title,
                description: task.description,
                requirements: task.requirements,
                created_at: self.clock.now(),
            };
            self.tables.write().await.tasks.push(row.clone());
            Ok(row)
        })
    }

    fn get_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Task>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
        })
    }

    fn update_task(
        &self,
        id: Uuid,
        changes: TaskChanges,
    ) -> BoxFuture<'_, CoreResult<Option<Task>>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            Ok(tables.tasks.iter_mut().find(|t| t.id == id).map(|task| {
                if let Some(title) = changes.title {
                    task.title = title;
                }
                if changes.description.is_some() {
                    task.description = changes.description;
                }
                if let Some(requirements) = changes.requirements {
                    task.requirements = requirements;
                }
                task.clone()
            }))
        })
    }

    fn delete_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let before = tables.tasks.len();
            tables.tasks.retain(|t| t.id != id);
            Ok(tables.tasks.len() != before)
        })
    }

    fn list_tasks(&self, limit: u32, offset: u32) -> BoxFuture<'_, CoreResult<Vec<Task>>> {
        self.touch();
        Box::pin(async move {
            let tables = self.tables.read().await;
            let mut rows = tables.tasks.clone();
            rows.sort_by(|x, y| y.created_at.cmp(&x.created_at));
            Ok(rows
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        })
    }
}

impl AccountStore for MemoryStore {
    fn insert_account(&self, account: Account) -> BoxFuture<'_, CoreResult<bool>> {
        self.touch();
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            if tables
                .accounts
                .iter()
                .any(|a| a.email.eq_ignore_ascii_case(&account.email))
            {
                return Ok(false);
            }
            tables.accounts.push(account);
            Ok(true)
        })
    }

    fn find_account_by_email(&self, email: &str) -> BoxFuture<'_, CoreResult<Option<Account>>> {
        self.touch();
        let email = email.to_string();
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .accounts
                .iter()
                .find(|a| a.email.eq_ignore_ascii_case(&email))
                .cloned())
        })
    }
}
