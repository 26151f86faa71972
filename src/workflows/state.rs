//! Run State Store
//!
//! Per-run key/value store that leaf tasks write their results into. Each
//! write is reported to the registered [`StateObserver`]s in the order the
//! writes were applied.

use crate::types::{Activity, FlightList, Hotel, ItineraryDay, VisaInfo};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Declared result type of a leaf task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    Flights,
    Hotels,
    Visa,
    Activities,
    Itinerary,
    Value,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::Flights => "flights",
            OutputKind::Hotels => "hotels",
            OutputKind::Visa => "visa",
            OutputKind::Activities => "activities",
            OutputKind::Itinerary => "itinerary",
            OutputKind::Value => "value",
        };
        f.write_str(name)
    }
}

/// Value stored under a key: a well-formed typed payload or the `Empty`
/// sentinel written when a collaborator failed or found nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TaskOutput {
    Flights(FlightList),
    Hotels(Vec<Hotel>),
    Visa(VisaInfo),
    Activities(Vec<Activity>),
    Itinerary(Vec<ItineraryDay>),
    /// Generic payload for leaves outside the travel domain
    Value(serde_json::Value),
    Empty,
}

impl TaskOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, TaskOutput::Empty)
    }

    /// Kind of the payload, `None` for the sentinel.
    pub fn kind(&self) -> Option<OutputKind> {
        match self {
            TaskOutput::Flights(_) => Some(OutputKind::Flights),
            TaskOutput::Hotels(_) => Some(OutputKind::Hotels),
            TaskOutput::Visa(_) => Some(OutputKind::Visa),
            TaskOutput::Activities(_) => Some(OutputKind::Activities),
            TaskOutput::Itinerary(_) => Some(OutputKind::Itinerary),
            TaskOutput::Value(_) => Some(OutputKind::Value),
            TaskOutput::Empty => None,
        }
    }

    /// Small structured summary attached to status events.
    pub fn summary(&self) -> serde_json::Value {
        match self {
            TaskOutput::Flights(list) => json!({
                "outbound": list.outbound_flights.len(),
                "return": list.return_flights.len(),
            }),
            TaskOutput::Hotels(items) => json!({ "count": items.len() }),
            TaskOutput::Visa(visa) => json!({ "required": visa.required }),
            TaskOutput::Activities(items) => json!({ "count": items.len() }),
            TaskOutput::Itinerary(days) => json!({ "count": days.len() }),
            TaskOutput::Value(_) => json!({}),
            TaskOutput::Empty => json!({ "empty": true }),
        }
    }
}

/// One applied write, as seen by observers.
#[derive(Debug, Clone)]
pub struct StateDelta {
    pub run_id: Uuid,
    pub key: String,
    pub value: TaskOutput,
    /// 1-based position of this write within the run
    pub sequence: u64,
    /// A value was already stored under `key`
    pub overwrote: bool,
}

/// Receives every write applied to a [`RunState`].
///
/// Called while the store lock is held: implementations must be quick, must
/// not block and must not call back into the store.
pub trait StateObserver: Send + Sync {
    fn on_write(&self, delta: &StateDelta);
}

struct Entries {
    values: HashMap<String, TaskOutput>,
    sequence: u64,
}

/// Concurrency-safe store owned by exactly one run.
pub struct RunState {
    run_id: Uuid,
    entries: RwLock<Entries>,
    observers: Vec<Arc<dyn StateObserver>>,
}

impl RunState {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            entries: RwLock::new(Entries {
                values: HashMap::new(),
                sequence: 0,
            }),
            observers: Vec::new(),
        }
    }

    /// Attach an observer. Observers are fixed once the store is shared.
    pub fn with_observer(mut self, observer: Arc<dyn StateObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record `value` under `key`, replacing any earlier value.
    pub fn write(&self, key: impl Into<String>, value: TaskOutput) {
        let key = key.into();
        let mut entries = self.entries.write();
        let overwrote = entries.values.insert(key.clone(), value.clone()).is_some();
        entries.sequence += 1;

        if overwrote {
            tracing::debug!(run_id = %self.run_id, key = %key, "overwriting state key");
        }

        let delta = StateDelta {
            run_id: self.run_id,
            key,
            value,
            sequence: entries.sequence,
            overwrote,
        };
        for observer in &self.observers {
            observer.on_write(&delta);
        }
    }

    pub fn read(&self, key: &str) -> Option<TaskOutput> {
        self.entries.read().values.get(key).cloned()
    }

    pub fn read_or(&self, key: &str, default: TaskOutput) -> TaskOutput {
        self.read(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().values.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Owned copy of every entry, for aggregation.
    pub fn snapshot(&self) -> StateSnapshot {
        let entries = self.entries.read();
        StateSnapshot {
            run_id: self.run_id,
            sequence: entries.sequence,
            values: entries.values.clone(),
        }
    }
}

impl fmt::Debug for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunState")
            .field("run_id", &self.run_id)
            .field("keys", &self.keys())
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Immutable view of a run's final state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    run_id: Uuid,
    sequence: u64,
    values: HashMap<String, TaskOutput>,
}

impl StateSnapshot {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Number of writes applied before the snapshot was taken.
    pub fn writes(&self) -> u64 {
        self.sequence
    }

    pub fn get(&self, key: &str) -> Option<&TaskOutput> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TaskOutput)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, u64, bool)>>,
    }

    impl StateObserver for Recorder {
        fn on_write(&self, delta: &StateDelta) {
            self.seen
                .lock()
                .push((delta.key.clone(), delta.sequence, delta.overwrote));
        }
    }

    #[test]
    fn test_read_returns_default_when_absent() {
        let state = RunState::new(Uuid::new_v4());
        assert_eq!(state.read("hotels"), None);
        assert_eq!(state.read_or("hotels", TaskOutput::Empty), TaskOutput::Empty);
    }

    #[test]
    fn test_second_write_overwrites() {
        let recorder = Arc::new(Recorder::default());
        let state = RunState::new(Uuid::new_v4()).with_observer(recorder.clone());

        state.write("k", TaskOutput::Value(json!(1)));
        state.write("k", TaskOutput::Value(json!(2)));

        assert_eq!(state.read("k"), Some(TaskOutput::Value(json!(2))));
        let seen = recorder.seen.lock().clone();
        assert_eq!(
            seen,
            vec![("k".to_string(), 1, false), ("k".to_string(), 2, true)]
        );
    }

    #[test]
    fn test_snapshot_is_detached() {
        let state = RunState::new(Uuid::new_v4());
        state.write("visa", TaskOutput::Empty);
        let snapshot = state.snapshot();

        state.write("hotels", TaskOutput::Hotels(vec![]));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.writes(), 1);
        assert!(snapshot.get("hotels").is_none());
        assert_eq!(state.keys(), vec!["hotels".to_string(), "visa".to_string()]);
    }

    #[test]
    fn test_concurrent_writers_lose_nothing() {
        let recorder = Arc::new(Recorder::default());
        let state = Arc::new(RunState::new(Uuid::new_v4()).with_observer(recorder.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        state.write(format!("k{}-{}", i, j), TaskOutput::Value(json!(j)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(state.snapshot().len(), 400);
        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 400);
        let sequences: Vec<u64> = seen.iter().map(|(_, s, _)| *s).collect();
        assert_eq!(sequences, (1..=400).collect::<Vec<u64>>());
    }

    #[test]
    fn test_summary_shapes() {
        assert_eq!(TaskOutput::Empty.summary(), json!({"empty": true}));
        assert_eq!(TaskOutput::Hotels(vec![]).summary(), json!({"count": 0}));
        assert_eq!(
            TaskOutput::Flights(FlightList::default()).summary(),
            json!({"outbound": 0, "return": 0})
        );
    }
}
