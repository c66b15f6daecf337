use std::sync::Arc;
use std::time::Duration;

use skills_core::accounts::Accounts;
use skills_core::conversations::Conversations;
use skills_core::live::Broadcaster;
use skills_core::matching::Matcher;
use skills_core::messages::Messages;
use skills_core::ports::{ChangeFeed, IdentityProvider, Store, TextGenerator};
use skills_core::profiles::Profiles;
use skills_core::tasks::Tasks;

pub type AppState = Arc<AppStateInner>;

/// Services shared by every handler, wired once at startup.
pub struct AppStateInner {
    pub identity: Arc<dyn IdentityProvider>,
    pub accounts: Accounts,
    pub conversations: Conversations,
    pub messages: Messages,
    pub broadcaster: Broadcaster,
    pub profiles: Profiles,
    pub tasks: Tasks,
    pub matcher: Matcher,
}

impl AppStateInner {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        feed: Arc<dyn ChangeFeed>,
        identity: Arc<dyn IdentityProvider>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let conversations = Conversations::new(store.clone());
        Self {
            accounts: Accounts::new(identity.clone(), store.clone()),
            messages: Messages::new(conversations.clone(), store.clone()),
            broadcaster: Broadcaster::new(store.clone(), feed),
            profiles: Profiles::new(store.clone()),
            tasks: Tasks::new(store),
            matcher: Matcher::new(generator),
            conversations,
            identity,
        }
    }

    pub fn with_heartbeat(mut self, period: Duration) -> Self {
        self.broadcaster = self.broadcaster.with_heartbeat(period);
        self
    }
}
