use crate::{
    agents::{keys, parse_structured, today, Agent, AgentContext},
    llm::LLMClient,
    types::{Hotel, Result, TripRequest},
    workflows::state::{OutputKind, TaskOutput},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct HotelList {
    hotels: Vec<Hotel>,
}

/// Searches accommodation at the destination.
pub struct HotelAgent {
    llm: Arc<dyn LLMClient>,
}

impl HotelAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn system_prompt(request: &TripRequest) -> String {
        let tier = if request.strict_budget {
            "Prefer affordable, well-rated hotels."
        } else {
            "Mix mid-range and premium hotels."
        };
        let budget = request
            .budget
            .as_deref()
            .map(|b| format!(" The overall budget is {}.", b))
            .unwrap_or_default();

        format!(
            r#"You are a hotel search assistant. Today's date is {today}.

Find 3 hotels in {destination} for {travelers} traveler(s). {tier}{budget}

Respond with ONLY a JSON object (no explanation, no markdown):
{{
  "hotels": [
    {{"name": "Hotel Name", "price_per_night": "{currency} XXX", "rating": 4.5, "description": "Short description", "amenities": ["WiFi", "Pool"]}}
  ]
}}"#,
            today = today(),
            destination = request.destination(),
            travelers = request.travelers,
            tier = tier,
            budget = budget,
            currency = request.currency,
        )
    }
}

#[async_trait]
impl Agent for HotelAgent {
    fn name(&self) -> &str {
        "HotelSearchAgent"
    }

    fn output_key(&self) -> &str {
        keys::HOTELS
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Hotels
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        let system = Self::system_prompt(&context.request);
        let response = self
            .llm
            .generate_with_system(&system, &context.request.summary())
            .await?;

        let list: HotelList = parse_structured(&response)?;
        Ok(TaskOutput::Hotels(list.hotels))
    }
}
