use crate::{
    agents::{keys, parse_structured, today, Agent, AgentContext},
    llm::LLMClient,
    types::{FlightList, Result, TripRequest},
    workflows::state::{OutputKind, TaskOutput},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Searches roundtrip flight options.
pub struct FlightAgent {
    llm: Arc<dyn LLMClient>,
}

impl FlightAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn system_prompt(request: &TripRequest) -> String {
        let origin = if request.origin().is_empty() {
            "a major city"
        } else {
            request.origin()
        };
        let window = request
            .travel_time
            .as_deref()
            .or(request.dates.as_deref())
            .unwrap_or("the next available dates");
        let budget_hint = if request.strict_budget {
            "Focus on budget-friendly options."
        } else {
            "Mix budget and premium options."
        };

        format!(
            r#"You are a flight search assistant. Today's date is {today}.

Find roundtrip flight options from {origin} to {destination} for {travelers} traveler(s), travelling {window}.
Trip duration: {days} days. {budget_hint}

Respond with ONLY a JSON object (no explanation, no markdown):
{{
  "outbound_flights": [
    {{"airline": "Airline Name", "price": "{currency} XXX", "departure": "HH:MM AM/PM", "arrival": "HH:MM AM/PM", "duration": "Xh Xm"}}
  ],
  "return_flights": [ ...same shape... ]
}}
Include exactly 3 outbound flights ({origin} to {destination}) and 3 return flights ({destination} to {origin})."#,
            today = today(),
            origin = origin,
            destination = request.destination(),
            travelers = request.travelers,
            window = window,
            days = request.days.unwrap_or(3),
            budget_hint = budget_hint,
            currency = request.currency,
        )
    }
}

#[async_trait]
impl Agent for FlightAgent {
    fn name(&self) -> &str {
        "FlightSearchAgent"
    }

    fn output_key(&self) -> &str {
        keys::FLIGHTS
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Flights
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        let system = Self::system_prompt(&context.request);
        let response = self
            .llm
            .generate_with_system(&system, &context.request.summary())
            .await?;

        let flights: FlightList = parse_structured(&response)?;
        tracing::debug!(
            run_id = %context.run_id,
            outbound = flights.outbound_flights.len(),
            returning = flights.return_flights.len(),
            "parsed flight options"
        );
        Ok(TaskOutput::Flights(flights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_route_and_currency() {
        let request = TripRequest {
            destination: Some("Rome".to_string()),
            origin: Some("Berlin".to_string()),
            currency: "EUR".to_string(),
            strict_budget: true,
            ..TripRequest::default()
        };

        let prompt = FlightAgent::system_prompt(&request);
        assert!(prompt.contains("from Berlin to Rome"));
        assert!(prompt.contains("EUR XXX"));
        assert!(prompt.contains("budget-friendly"));
    }

    #[test]
    fn test_prompt_without_origin() {
        let prompt = FlightAgent::system_prompt(&TripRequest::to_destination("Oslo"));
        assert!(prompt.contains("from a major city to Oslo"));
    }
}
