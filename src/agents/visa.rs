use crate::{
    agents::{keys, parse_structured, today, Agent, AgentContext},
    llm::LLMClient,
    types::{Result, TripRequest, VisaInfo},
    workflows::state::{OutputKind, TaskOutput},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Looks up entry requirements for the destination.
pub struct VisaAgent {
    llm: Arc<dyn LLMClient>,
}

impl VisaAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn system_prompt(request: &TripRequest) -> String {
        let origin = if request.origin().is_empty() {
            "the traveler's home country"
        } else {
            request.origin()
        };

        format!(
            r#"You are a visa requirements assistant. Today's date is {today}.

Determine the visa requirements for citizens travelling from {origin} to {destination}.

Respond with ONLY a JSON object (no explanation, no markdown):
{{
  "country": "{destination}",
  "required": true,
  "requirements": ["Passport valid for 6 months"],
  "processing_time": "5-10 business days",
  "application_url": "https://...",
  "application_steps": ["Step 1", "Step 2"]
}}"#,
            today = today(),
            origin = origin,
            destination = request.destination(),
        )
    }
}

#[async_trait]
impl Agent for VisaAgent {
    fn name(&self) -> &str {
        "VisaInfoAgent"
    }

    fn output_key(&self) -> &str {
        keys::VISA
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Visa
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        let system = Self::system_prompt(&context.request);
        let response = self
            .llm
            .generate_with_system(&system, &context.request.summary())
            .await?;

        let visa: VisaInfo = parse_structured(&response)?;
        Ok(TaskOutput::Visa(visa))
    }
}
