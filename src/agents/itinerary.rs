use crate::{
    agents::{keys, parse_structured, Agent, AgentContext},
    llm::LLMClient,
    types::{ItineraryDay, Result, TripRequest},
    workflows::state::{OutputKind, RunState, TaskOutput},
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct Itinerary {
    days: Vec<ItineraryDay>,
}

/// Plans a day-by-day itinerary from the data gathered earlier in the run.
pub struct ItineraryAgent {
    llm: Arc<dyn LLMClient>,
}

impl ItineraryAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Keys from the gathering group, skipping anything that came back empty.
    fn gathered_info(state: &RunState) -> Value {
        let mut gathered = Map::new();
        for key in [keys::FLIGHTS, keys::HOTELS, keys::ACTIVITIES, keys::VISA] {
            match state.read(key) {
                Some(TaskOutput::Empty) | None => {}
                Some(output) => {
                    if let Ok(value) = serde_json::to_value(&output) {
                        gathered.insert(key.to_string(), value["data"].clone());
                    }
                }
            }
        }
        Value::Object(gathered)
    }

    fn system_prompt(request: &TripRequest, gathered: &Value) -> String {
        let origin = if request.origin().is_empty() {
            "their home"
        } else {
            request.origin()
        };

        format!(
            r#"You are an expert travel planner. Create a day-by-day itinerary.
Context (flights, hotels, activities found so far): {gathered}

Generate a {days}-day itinerary for {destination}. Include 1-2 cultural tips useful for someone travelling from {origin}.

Respond with ONLY a JSON object (no explanation, no markdown):
{{
  "days": [
    {{"day": 1, "activities": [{{"name": "Activity", "description": "What and why", "price": "{currency} XX or Free", "duration": "2 hours"}}]}}
  ]
}}"#,
            gathered = gathered,
            days = request.days.unwrap_or(3),
            destination = request.destination(),
            origin = origin,
            currency = request.currency,
        )
    }
}

#[async_trait]
impl Agent for ItineraryAgent {
    fn name(&self) -> &str {
        "ItineraryPlannerAgent"
    }

    fn output_key(&self) -> &str {
        keys::ITINERARY
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Itinerary
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        let gathered = Self::gathered_info(&context.state);
        let system = Self::system_prompt(&context.request, &gathered);
        let response = self
            .llm
            .generate_with_system(&system, &context.request.summary())
            .await?;

        let itinerary: Itinerary = parse_structured(&response)?;
        Ok(TaskOutput::Itinerary(itinerary.days))
    }
}
