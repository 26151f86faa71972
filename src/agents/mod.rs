//! Leaf collaborators
//!
//! Every leaf of a workflow tree wraps one [`Agent`]: a single call to an
//! external collaborator that produces the value for one declared output key.
//! The travel agents in this module ask an LLM for structured JSON and parse
//! it into the typed records from [`crate::types`].

pub mod activity;
pub mod flight;
pub mod hotel;
pub mod itinerary;
pub mod visa;

use crate::llm::LLMClient;
use crate::types::{AppError, Result, TripRequest};
use crate::workflows::state::{OutputKind, RunState, TaskOutput};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

pub use activity::ActivityAgent;
pub use flight::FlightAgent;
pub use hotel::HotelAgent;
pub use itinerary::ItineraryAgent;
pub use visa::VisaAgent;

/// Output keys written by the travel workflow.
pub mod keys {
    pub const FLIGHTS: &str = "flights";
    pub const HOTELS: &str = "hotels";
    pub const VISA: &str = "visa";
    pub const ACTIVITIES: &str = "activities";
    pub const ITINERARY: &str = "itinerary";
}

/// What a collaborator sees of its run.
///
/// `request` is immutable and shared by every leaf; `state` lets later leaves
/// read keys written by earlier sequential groups.
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub run_id: Uuid,
    pub request: Arc<TripRequest>,
    pub state: Arc<RunState>,
}

impl AgentContext {
    pub fn new(request: Arc<TripRequest>, state: Arc<RunState>) -> Self {
        Self {
            run_id: state.run_id(),
            request,
            state,
        }
    }
}

/// Base trait for all leaf collaborators
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name used in logs and node reports
    fn name(&self) -> &str;

    /// Key this agent's result is stored under
    fn output_key(&self) -> &str;

    /// Declared result type
    fn output_kind(&self) -> OutputKind;

    /// Perform the collaborator call. Errors are contained by the leaf that
    /// runs the agent and stored as [`TaskOutput::Empty`].
    async fn run(&self, context: &AgentContext) -> Result<TaskOutput>;
}

/// The five collaborators making up the travel workflow.
#[derive(Clone)]
pub struct TravelAgents {
    pub flights: Arc<dyn Agent>,
    pub hotels: Arc<dyn Agent>,
    pub visa: Arc<dyn Agent>,
    pub activities: Arc<dyn Agent>,
    pub itinerary: Arc<dyn Agent>,
}

impl TravelAgents {
    /// Build the LLM-backed agents sharing one client.
    pub fn with_llm(llm: Arc<dyn LLMClient>) -> Self {
        tracing::info!(model = llm.model_name(), "travel agents ready");
        Self {
            flights: Arc::new(FlightAgent::new(Arc::clone(&llm))),
            hotels: Arc::new(HotelAgent::new(Arc::clone(&llm))),
            visa: Arc::new(VisaAgent::new(Arc::clone(&llm))),
            activities: Arc::new(ActivityAgent::new(Arc::clone(&llm))),
            itinerary: Arc::new(ItineraryAgent::new(llm)),
        }
    }

    /// Agents of the data-gathering group, in declaration order.
    pub fn gatherers(&self) -> Vec<Arc<dyn Agent>> {
        vec![
            Arc::clone(&self.flights),
            Arc::clone(&self.hotels),
            Arc::clone(&self.visa),
            Arc::clone(&self.activities),
        ]
    }
}

/// Parse a structured LLM answer, tolerating markdown code fences.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(AppError::Collaborator("empty response".to_string()));
    }
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::Collaborator(format!("unparsable structured output: {}", e)))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```json") {
        let body = &trimmed[start + 7..];
        return match body.rfind("```") {
            Some(end) => body[..end].trim(),
            None => body.trim(),
        };
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the rest of the opening fence line (a language tag, if any)
        let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
        return body.trim_end().trim_end_matches("```").trim();
    }

    trimmed
}

/// Current date line shared by the prompts.
pub(crate) fn today() -> String {
    chrono::Utc::now().format("%B %d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VisaInfo;

    const VISA_JSON: &str = r#"{"country": "Japan", "required": false, "requirements": [], "processing_time": "N/A", "application_url": null}"#;

    #[test]
    fn test_parse_plain_json() {
        let visa: VisaInfo = parse_structured(VISA_JSON).unwrap();
        assert_eq!(visa.country, "Japan");
        assert!(visa.application_steps.is_empty());
    }

    #[test]
    fn test_parse_json_fence() {
        let raw = format!("Here you go:\n```json\n{}\n```\nEnjoy!", VISA_JSON);
        let visa: VisaInfo = parse_structured(&raw).unwrap();
        assert!(!visa.required);
    }

    #[test]
    fn test_parse_bare_fence() {
        let raw = format!("```\n{}\n```", VISA_JSON);
        let visa: VisaInfo = parse_structured(&raw).unwrap();
        assert_eq!(visa.processing_time, "N/A");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let result: Result<VisaInfo> = parse_structured(r#"{"country": "Japan"}"#);
        assert!(matches!(result, Err(AppError::Collaborator(_))));

        let result: Result<VisaInfo> = parse_structured("   ");
        assert!(matches!(result, Err(AppError::Collaborator(_))));
    }
}
