use crate::agents::keys;
use crate::status::broadcaster::StatusBroadcaster;
use crate::workflows::state::{StateDelta, StateObserver};
use std::collections::HashMap;
use std::sync::Arc;

/// Static key-to-message table. Keys without an entry are silent.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPhrases {
    phrases: HashMap<String, String>,
}

impl Default for StatusPhrases {
    fn default() -> Self {
        let phrases = [
            (keys::FLIGHTS, "Found flight options"),
            (keys::HOTELS, "Found accommodation options"),
            (keys::VISA, "Retrieved visa requirements"),
            (keys::ACTIVITIES, "Discovered things to do"),
            (keys::ITINERARY, "Completed your personalized itinerary"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { phrases }
    }
}

impl StatusPhrases {
    /// Defaults with configured entries layered on top.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        table
            .phrases
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        table
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.phrases.get(key).map(String::as_str)
    }
}

/// Turns store writes of one run into status events for its subscriber.
pub struct StatusRelay {
    subscriber_id: String,
    phrases: StatusPhrases,
    broadcaster: Arc<StatusBroadcaster>,
}

impl StatusRelay {
    pub fn new(
        subscriber_id: impl Into<String>,
        phrases: StatusPhrases,
        broadcaster: Arc<StatusBroadcaster>,
    ) -> Self {
        Self {
            subscriber_id: subscriber_id.into(),
            phrases,
            broadcaster,
        }
    }
}

impl StateObserver for StatusRelay {
    fn on_write(&self, delta: &StateDelta) {
        let Some(phrase) = self.phrases.lookup(&delta.key) else {
            return;
        };

        let delivered = self.broadcaster.publish(
            &self.subscriber_id,
            phrase,
            Some(&delta.key),
            delta.value.summary(),
        );
        tracing::trace!(
            run_id = %delta.run_id,
            key = %delta.key,
            subscriber_id = %self.subscriber_id,
            delivered,
            "status relayed"
        );
    }
}
