use std::sync::Arc;

use futures_util::stream::{BoxStream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use skills_types::events::{ChangeEvent, ChangeFilter};

use crate::ports::{ChangeFeed, FeedItem};

const FEED_CAPACITY: usize = 1024;

/// In-process change feed. Stores publish every committed insert here and
/// each watch filters the shared broadcast down to its own predicate.
#[derive(Clone)]
pub struct FeedHub {
    inner: Arc<FeedHubInner>,
}

struct FeedHubInner {
    tx: broadcast::Sender<ChangeEvent>,
}

impl FeedHub {
    pub fn new() -> Self {
        Self::with_capacity(FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(FeedHubInner { tx }),
        }
    }

    /// Fan an event out to every open watch. No-op without watchers.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.inner.tx.send(event);
    }

    /// Number of live watches, across all filters.
    pub fn watcher_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for FeedHub {
    fn subscribe(&self, filter: ChangeFilter) -> BoxStream<'static, FeedItem> {
        // Register now, not on first poll, so nothing committed after
        // subscribe() returns is missed.
        let mut rx = self.inner.tx.subscribe();
        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if filter.matches(&event) {
                            yield FeedItem::Change(event);
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(?filter, "change feed watch lagged by {} events", n);
                        yield FeedItem::Lagged(n);
                        break;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        .boxed()
    }
}
