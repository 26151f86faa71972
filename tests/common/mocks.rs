//! Mock implementations for testing.
//!
//! A canned travel LLM, scripted agents and a recording store observer shared by
//! the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tripflow::agents::{keys, Agent, AgentContext, TravelAgents};
use tripflow::llm::LLMClient;
use tripflow::types::{AppError, Result};
use tripflow::workflows::{OutputKind, StateDelta, StateObserver, TaskOutput};

/// Answers each travel agent by recognising its system prompt.
///
/// Agents listed in `failing` get an error instead of their canned answer.
pub struct TravelLLM {
    failing: Vec<&'static str>,
}

impl TravelLLM {
    pub fn new() -> Self {
        Self { failing: vec![] }
    }

    pub fn failing(keys: &[&'static str]) -> Self {
        Self {
            failing: keys.to_vec(),
        }
    }

    fn answer(key: &str) -> String {
        let value = match key {
            keys::FLIGHTS => json!({
                "outbound_flights": [
                    {"airline": "Iberia", "price": "USD 420", "departure": "07:10 AM", "arrival": "10:05 AM", "duration": "2h 55m"},
                    {"airline": "Vueling", "price": "USD 380", "departure": "01:40 PM", "arrival": "04:30 PM", "duration": "2h 50m"}
                ],
                "return_flights": [
                    {"airline": "Iberia", "price": "USD 1,050", "departure": "06:00 PM", "arrival": "08:55 PM", "duration": "2h 55m"}
                ]
            }),
            keys::HOTELS => json!({
                "hotels": [
                    {"name": "Hotel Arts", "price_per_night": "USD 250", "rating": 4.7, "description": "Seafront tower", "amenities": ["pool", "spa"]}
                ]
            }),
            keys::VISA => json!({
                "country": "Spain", "required": false, "requirements": ["Valid passport"],
                "processing_time": "N/A", "application_url": null, "application_steps": []
            }),
            keys::ACTIVITIES => json!({
                "activities": [
                    {"name": "Sagrada Familia", "description": "Gaudi basilica", "price": "USD 30", "duration": "2 hours"},
                    {"name": "Park Guell", "description": "Mosaic park", "price": "USD 12", "duration": "2 hours"}
                ]
            }),
            _ => json!({
                "days": [
                    {"day": 1, "activities": [{"name": "Sagrada Familia", "description": "Morning visit", "price": "USD 30", "duration": "2 hours"}]},
                    {"day": 2, "activities": [{"name": "Barceloneta", "description": "Beach afternoon", "price": "Free", "duration": "3 hours"}]}
                ]
            }),
        };
        // Wrapped in a fence the way chat models tend to answer
        format!("```json\n{}\n```", value)
    }
}

#[async_trait]
impl LLMClient for TravelLLM {
    async fn generate_with_system(&self, system: &str, _prompt: &str) -> Result<String> {
        let key = if system.starts_with("You are a flight search") {
            keys::FLIGHTS
        } else if system.starts_with("You are a hotel search") {
            keys::HOTELS
        } else if system.starts_with("You are a visa") {
            keys::VISA
        } else if system.starts_with("You are a local activities") {
            keys::ACTIVITIES
        } else {
            keys::ITINERARY
        };

        if self.failing.contains(&key) {
            return Err(AppError::LLM(format!("{} backend unavailable", key)));
        }
        Ok(Self::answer(key))
    }

    fn model_name(&self) -> &str {
        "travel-mock"
    }
}

/// What a [`FakeAgent`] does when run.
#[derive(Clone)]
pub enum Script {
    /// Return the value after the delay
    Return(TaskOutput),
    Fail,
    Panic,
    /// Read `key` from the run state and return it (`Empty` when absent)
    Echo(&'static str),
}

/// Agent with scripted behaviour and an optional delay.
pub struct FakeAgent {
    key: &'static str,
    kind: OutputKind,
    delay: Duration,
    script: Script,
}

impl FakeAgent {
    pub fn new(key: &'static str, kind: OutputKind, script: Script) -> Self {
        Self {
            key,
            kind,
            delay: Duration::ZERO,
            script,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn arc(self) -> Arc<dyn Agent> {
        Arc::new(self)
    }
}

#[async_trait]
impl Agent for FakeAgent {
    fn name(&self) -> &str {
        self.key
    }

    fn output_key(&self) -> &str {
        self.key
    }

    fn output_kind(&self) -> OutputKind {
        self.kind
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.script {
            Script::Return(value) => Ok(value.clone()),
            Script::Fail => Err(AppError::Collaborator(format!("{} exploded", self.key))),
            Script::Panic => panic!("{} panicked", self.key),
            Script::Echo(key) => Ok(context.state.read_or(key, TaskOutput::Empty)),
        }
    }
}

/// Travel agents that all return an empty result after `delay`.
pub fn empty_travel_agents(delay: Duration) -> TravelAgents {
    let agent = |key, kind| {
        FakeAgent::new(key, kind, Script::Return(TaskOutput::Empty))
            .with_delay(delay)
            .arc()
    };
    TravelAgents {
        flights: agent(keys::FLIGHTS, OutputKind::Flights),
        hotels: agent(keys::HOTELS, OutputKind::Hotels),
        visa: agent(keys::VISA, OutputKind::Visa),
        activities: agent(keys::ACTIVITIES, OutputKind::Activities),
        itinerary: agent(keys::ITINERARY, OutputKind::Itinerary),
    }
}

/// Records every delta it sees.
#[derive(Default)]
pub struct RecordingObserver {
    deltas: Mutex<Vec<StateDelta>>,
}

impl RecordingObserver {
    pub fn deltas(&self) -> Vec<StateDelta> {
        self.deltas.lock().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.deltas.lock().iter().map(|d| d.key.clone()).collect()
    }
}

impl StateObserver for RecordingObserver {
    fn on_write(&self, delta: &StateDelta) {
        self.deltas.lock().push(delta.clone());
    }
}
