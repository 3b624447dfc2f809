//! Change feed for live queries.

use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use crate::{Collection, Document, Filter};

/// Capacity of the change broadcast channel
const CHANNEL_CAPACITY: usize = 1024;

/// Kind of change applied to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A committed change. For deletions `document` holds the last stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub collection: Collection,
    pub document: Document,
}

/// Fan-out of committed changes to subscribers.
#[derive(Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    /// Creates a feed with no subscribers.
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(CHANNEL_CAPACITY).0,
        }
    }

    /// Publishes a change to every current subscriber.
    pub fn publish(&self, kind: ChangeKind, collection: Collection, document: Document) {
        // Sending only fails when nobody is listening
        let _ = self.sender.send(ChangeEvent {
            kind,
            collection,
            document,
        });
    }

    /// Subscribes to changes in `collection` matching `filter`.
    pub fn subscribe(&self, collection: Collection, filter: Filter) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            collection,
            filter,
        }
    }
}

/// A live subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    collection: Collection,
    filter: Filter,
}

impl Subscription {
    /// Waits for the next matching change. Returns None once the store is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if event.collection == self.collection && self.filter.matches(&event.document)
                    {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        collection = %self.collection,
                        skipped,
                        "Change subscriber lagged behind"
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Runs `on_change` for every matching change on a background task.
    ///
    /// The listener stops when the returned handle is unsubscribed or dropped.
    pub fn on_change<F>(mut self, on_change: F) -> UnsubscribeHandle
    where
        F: Fn(ChangeEvent) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(event) = self.next().await {
                on_change(event);
            }
        });
        UnsubscribeHandle { task }
    }
}

/// Handle returned by [`Subscription::on_change`].
#[derive(Debug)]
pub struct UnsubscribeHandle {
    task: JoinHandle<()>,
}

impl UnsubscribeHandle {
    /// Stops the listener.
    pub fn unsubscribe(self) {
        self.task.abort();
    }

    /// Returns true once the listener has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for UnsubscribeHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
