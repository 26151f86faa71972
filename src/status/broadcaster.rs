use futures::Stream;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// One progress notification. Serialized as a socket text frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEvent {
    #[serde(skip)]
    pub subscriber_id: String,
    /// Human-readable message
    pub status: String,
    /// Key or lifecycle step that caused the event
    pub step: Option<String>,
    pub data: serde_json::Value,
}

struct Channel {
    id: u64,
    tx: mpsc::UnboundedSender<StatusEvent>,
}

/// Fan-out of status events to every open channel of a subscriber.
///
/// Events are never queued for subscribers without channels and never
/// replayed to channels opened later.
#[derive(Default)]
pub struct StatusBroadcaster {
    channels: RwLock<HashMap<String, Vec<Channel>>>,
    next_id: AtomicU64,
}

impl StatusBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new delivery channel for `subscriber_id`.
    pub fn subscribe(&self, subscriber_id: &str) -> StatusSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut channels = self.channels.write();
        prune_closed(&mut channels);
        let open = channels.entry(subscriber_id.to_string()).or_default();
        open.push(Channel { id, tx });
        tracing::debug!(subscriber_id, channel = id, open = open.len(), "status channel opened");

        StatusSubscription {
            subscriber_id: subscriber_id.to_string(),
            channel_id: id,
            rx,
        }
    }

    /// Close one channel. Returns whether it was still registered.
    pub fn unsubscribe(&self, subscriber_id: &str, channel_id: u64) -> bool {
        let mut channels = self.channels.write();
        let Some(open) = channels.get_mut(subscriber_id) else {
            return false;
        };

        let before = open.len();
        open.retain(|c| c.id != channel_id);
        let removed = open.len() != before;
        if open.is_empty() {
            channels.remove(subscriber_id);
        }

        if removed {
            tracing::debug!(subscriber_id, channel = channel_id, "status channel closed");
        }
        removed
    }

    /// Deliver to every open channel of `subscriber_id`, best-effort.
    ///
    /// Returns the number of channels that accepted the event. Channels whose
    /// receiving side is gone are dropped without affecting the others.
    pub fn publish(
        &self,
        subscriber_id: &str,
        message: impl Into<String>,
        step: Option<&str>,
        data: serde_json::Value,
    ) -> usize {
        let mut channels = self.channels.write();
        let Some(open) = channels.get_mut(subscriber_id) else {
            return 0;
        };

        let event = StatusEvent {
            subscriber_id: subscriber_id.to_string(),
            status: message.into(),
            step: step.map(str::to_string),
            data,
        };

        let mut delivered = 0;
        open.retain(|channel| match channel.tx.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                tracing::debug!(
                    subscriber_id,
                    channel = channel.id,
                    "dropping dead status channel"
                );
                false
            }
        });
        if open.is_empty() {
            channels.remove(subscriber_id);
        }

        delivered
    }

    /// Open channels for one subscriber.
    pub fn connection_count(&self, subscriber_id: &str) -> usize {
        self.channels
            .read()
            .get(subscriber_id)
            .map(|open| open.iter().filter(|c| !c.tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Subscribers with at least one open channel.
    pub fn subscriber_count(&self) -> usize {
        self.channels
            .read()
            .values()
            .filter(|open| open.iter().any(|c| !c.tx.is_closed()))
            .count()
    }
}

/// Drop channels whose subscription was dropped without `unsubscribe`.
fn prune_closed(channels: &mut HashMap<String, Vec<Channel>>) {
    channels.retain(|subscriber_id, open| {
        open.retain(|c| {
            let closed = c.tx.is_closed();
            if closed {
                tracing::debug!(%subscriber_id, channel = c.id, "pruning abandoned status channel");
            }
            !closed
        });
        !open.is_empty()
    });
}

impl std::fmt::Debug for StatusBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBroadcaster")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Receiving end of one channel.
#[derive(Debug)]
pub struct StatusSubscription {
    subscriber_id: String,
    channel_id: u64,
    rx: mpsc::UnboundedReceiver<StatusEvent>,
}

impl StatusSubscription {
    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    pub async fn recv(&mut self) -> Option<StatusEvent> {
        self.rx.recv().await
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<StatusEvent> {
        self.rx.try_recv().ok()
    }
}

impl Stream for StatusSubscription {
    type Item = StatusEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
