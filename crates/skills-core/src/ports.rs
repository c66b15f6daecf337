//! Seams to the collaborators the core depends on. Every handle is built once
//! at startup and injected as a trait object.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::BoxStream;
use uuid::Uuid;

use skills_types::api::{AuthUser, ProfileUpdate, Session};
use skills_types::events::{ChangeEvent, ChangeFilter};
use skills_types::models::{
    Account, Conversation, ConversationPair, Message, MessagePage, NewMessage, NewTask, Principal,
    Profile, Task, TaskChanges,
};

use crate::CoreResult;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ConversationStore: Send + Sync {
    /// Finds the row for an unordered pair, matching either column order.
    fn find_conversation_between(
        &self,
        a: Uuid,
        b: Uuid,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>>;

    /// Inserts the canonical pair. Returns `None` when a row for the pair
    /// already exists (uniqueness enforced by the store).
    fn insert_conversation(
        &self,
        pair: ConversationPair,
    ) -> BoxFuture<'_, CoreResult<Option<Conversation>>>;

    fn get_conversation(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Conversation>>>;

    fn list_conversations_for(&self, user_id: Uuid) -> BoxFuture<'_, CoreResult<Vec<Conversation>>>;
}

pub trait MessageStore: Send + Sync {
    fn insert_message(&self, message: NewMessage) -> BoxFuture<'_, CoreResult<Message>>;

    /// Newest first, strictly older than `page.before` when set.
    fn list_messages(
        &self,
        conversation_id: Uuid,
        page: MessagePage,
    ) -> BoxFuture<'_, CoreResult<Vec<Message>>>;

    fn get_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Message>>>;

    /// Returns whether a row was removed.
    fn delete_message(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>>;
}

pub trait ProfileStore: Send + Sync {
    fn list_profile_ids(&self) -> BoxFuture<'_, CoreResult<Vec<Uuid>>>;

    fn get_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Profile>>>;

    fn upsert_profile(&self, profile: Profile) -> BoxFuture<'_, CoreResult<Profile>>;

    fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, CoreResult<Option<Profile>>>;

    fn delete_profile(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>>;
}

pub trait TaskStore: Send + Sync {
    fn insert_task(&self, task: NewTask) -> BoxFuture<'_, CoreResult<Task>>;

    fn get_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<Option<Task>>>;

    fn update_task(&self, id: Uuid, changes: TaskChanges)
    -> BoxFuture<'_, CoreResult<Option<Task>>>;

    fn delete_task(&self, id: Uuid) -> BoxFuture<'_, CoreResult<bool>>;

    /// Newest first.
    fn list_tasks(&self, limit: u32, offset: u32) -> BoxFuture<'_, CoreResult<Vec<Task>>>;
}

/// Credential rows for the built-in identity provider.
pub trait AccountStore: Send + Sync {
    /// Returns `false` when the email is already registered.
    fn insert_account(&self, account: Account) -> BoxFuture<'_, CoreResult<bool>>;

    fn find_account_by_email(&self, email: &str) -> BoxFuture<'_, CoreResult<Option<Account>>>;
}

/// Everything a full storage backend provides.
pub trait Store: ConversationStore + MessageStore + ProfileStore + TaskStore + AccountStore {}

impl<T> Store for T where T: ConversationStore + MessageStore + ProfileStore + TaskStore + AccountStore
{}

/// Change-data-capture over committed inserts. The returned stream is
/// infinite; dropping it cancels the watch.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, filter: ChangeFilter) -> BoxStream<'static, FeedItem>;
}

/// One item of a change-feed watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedItem {
    Change(ChangeEvent),
    /// The watch lost events and can no longer be trusted.
    Lagged(u64),
}

#[derive(Debug, Clone)]
pub struct SignIn {
    pub user: AuthUser,
    pub session: Session,
}

pub trait IdentityProvider: Send + Sync {
    fn sign_up<'a>(&'a self, email: &'a str, password: &'a str)
    -> BoxFuture<'a, CoreResult<AuthUser>>;

    fn sign_in_with_password<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, CoreResult<SignIn>>;

    /// Resolves a bearer token. Rejected tokens are `Unauthenticated`.
    fn get_user<'a>(&'a self, token: &'a str) -> BoxFuture<'a, CoreResult<Principal>>;
}

/// Single-shot prompt completion.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, CoreResult<String>>;
}
