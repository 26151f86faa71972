use crate::{
    agents::{keys, parse_structured, today, Agent, AgentContext},
    llm::LLMClient,
    types::{Activity, Result, TripRequest},
    workflows::state::{OutputKind, TaskOutput},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ActivityList {
    activities: Vec<Activity>,
}

/// Finds things to do at the destination.
pub struct ActivityAgent {
    llm: Arc<dyn LLMClient>,
}

impl ActivityAgent {
    pub fn new(llm: Arc<dyn LLMClient>) -> Self {
        Self { llm }
    }

    fn system_prompt(request: &TripRequest) -> String {
        format!(
            r#"You are a local activities expert. Today's date is {today}.

List 5 top things to do in {destination}{budget_hint}.

Respond with ONLY a JSON object (no explanation, no markdown):
{{
  "activities": [
    {{"name": "Activity", "description": "Short description", "price": "{currency} XX or Free", "duration": "2 hours"}}
  ]
}}"#,
            today = today(),
            destination = request.destination(),
            budget_hint = if request.strict_budget {
                ", favouring free or cheap options"
            } else {
                ""
            },
            currency = request.currency,
        )
    }
}

#[async_trait]
impl Agent for ActivityAgent {
    fn name(&self) -> &str {
        "ActivitySearchAgent"
    }

    fn output_key(&self) -> &str {
        keys::ACTIVITIES
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Activities
    }

    async fn run(&self, context: &AgentContext) -> Result<TaskOutput> {
        let system = Self::system_prompt(&context.request);
        let response = self
            .llm
            .generate_with_system(&system, &context.request.summary())
            .await?;

        let list: ActivityList = parse_structured(&response)?;
        Ok(TaskOutput::Activities(list.activities))
    }
}
