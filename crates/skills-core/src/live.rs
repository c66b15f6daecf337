use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use skills_types::events::{ChangeFilter, StreamEvent};

use crate::CoreResult;
use crate::membership::check_membership;
use crate::ports::{ChangeFeed, ConversationStore, FeedItem};

/// Idle heartbeat so proxies keep long-lived streams open.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

pub type LiveStream = BoxStream<'static, StreamEvent>;

/// Turns change-feed watches into per-client push streams.
///
/// A stream owns its heartbeat timer and its feed registrations; dropping it
/// (the client went away) releases both.
#[derive(Clone)]
pub struct Broadcaster {
    conversations: Arc<dyn ConversationStore>,
    feed: Arc<dyn ChangeFeed>,
    heartbeat: Duration,
}

impl Broadcaster {
    pub fn new(conversations: Arc<dyn ConversationStore>, feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            conversations,
            feed,
            heartbeat: HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// New messages in one conversation. Only its participants may subscribe.
    pub async fn message_stream(&self, user_id: Uuid, conversation_id: Uuid) -> CoreResult<LiveStream> {
        check_membership(self.conversations.as_ref(), user_id, conversation_id).await?;

        let watch = self
            .feed
            .subscribe(ChangeFilter::MessageConversation(conversation_id));
        info!(%user_id, %conversation_id, "message stream opened");
        Ok(heartbeat_stream(watch, self.heartbeat))
    }

    /// New conversations the user takes part in, on either side of the pair.
    pub fn conversation_stream(&self, user_id: Uuid) -> LiveStream {
        // One equality predicate per watch, so each column gets its own.
        let as_user1 = self.feed.subscribe(ChangeFilter::ConversationUser1(user_id));
        let as_user2 = self.feed.subscribe(ChangeFilter::ConversationUser2(user_id));
        info!(%user_id, "conversation stream opened");
        heartbeat_stream(stream::select(as_user1, as_user2).boxed(), self.heartbeat)
    }
}

fn heartbeat_stream(mut source: BoxStream<'static, FeedItem>, period: Duration) -> LiveStream {
    async_stream::stream! {
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let frame = tokio::select! {
                item = source.next() => match item {
                    Some(FeedItem::Change(event)) => StreamEvent::from(event),
                    Some(FeedItem::Lagged(missed)) => {
                        warn!("live stream missed {} events, closing", missed);
                        break;
                    }
                    None => {
                        debug!("change feed closed, ending live stream");
                        break;
                    }
                },
                _ = heartbeat.tick() => StreamEvent::Heartbeat,
            };
            yield frame;
        }
    }
    .boxed()
}
