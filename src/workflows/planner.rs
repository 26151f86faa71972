//! Trip planning runs
//!
//! [`TripPlanner`] is the surface the transport layer talks to: it validates
//! the run parameters, gives every run a fresh [`RunState`], executes the
//! travel workflow and hands back the aggregated [`TripPlan`].

use crate::aggregate::ResultAggregator;
use crate::agents::{AgentContext, TravelAgents};
use crate::status::{StatusBroadcaster, StatusPhrases, StatusRelay, StatusSubscription};
use crate::types::{AppError, Result, TripPlan, TripRequest};
use crate::utils::toml_config::TripflowConfigManager;
use crate::workflows::engine::WorkflowEngine;
use crate::workflows::node::TaskNode;
use crate::workflows::state::RunState;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const ROOT_NODE: &str = "TravelPlannerAgent";
pub const GATHER_NODE: &str = "DataGathererAgent";

/// Identity of one planning execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub run_id: Uuid,
    pub subscriber_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Run {
    fn new(subscriber_id: Option<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            subscriber_id: subscriber_id.filter(|s| !s.trim().is_empty()),
            created_at: Utc::now(),
        }
    }
}

/// A started run. Dropping the handle does not cancel the run.
#[derive(Debug)]
pub struct RunHandle {
    run: Run,
    task: JoinHandle<TripPlan>,
}

impl RunHandle {
    pub fn run_id(&self) -> Uuid {
        self.run.run_id
    }

    pub fn subscriber_id(&self) -> Option<&str> {
        self.run.subscriber_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.run.created_at
    }

    /// Wait for the aggregated result.
    ///
    /// A started run always produces a plan; `RunFailed` only reports that
    /// the runtime task itself was lost.
    pub async fn await_result(self) -> Result<TripPlan> {
        let run_id = self.run.run_id;
        self.task.await.map_err(|e| {
            tracing::error!(%run_id, error = %e, "run task did not complete");
            AppError::RunFailed(format!("run {} did not complete: {}", run_id, e))
        })
    }
}

/// Starts travel planning runs. Cheap to clone; clones share the agents,
/// broadcaster and configuration.
#[derive(Clone)]
pub struct TripPlanner {
    agents: TravelAgents,
    engine: WorkflowEngine,
    broadcaster: Arc<StatusBroadcaster>,
    config: Arc<TripflowConfigManager>,
}

impl TripPlanner {
    pub fn new(
        agents: TravelAgents,
        broadcaster: Arc<StatusBroadcaster>,
        config: Arc<TripflowConfigManager>,
    ) -> Self {
        Self {
            agents,
            engine: WorkflowEngine::new(),
            broadcaster,
            config,
        }
    }

    pub fn broadcaster(&self) -> &Arc<StatusBroadcaster> {
        &self.broadcaster
    }

    /// Open a status channel for `subscriber_id`.
    pub fn subscribe(&self, subscriber_id: &str) -> StatusSubscription {
        self.broadcaster.subscribe(subscriber_id)
    }

    /// Gather in parallel, then plan the itinerary from what was gathered.
    pub fn build_workflow(&self) -> TaskNode {
        let gatherers = self
            .agents
            .gatherers()
            .into_iter()
            .map(TaskNode::leaf)
            .collect();

        TaskNode::sequential(
            ROOT_NODE,
            vec![
                TaskNode::parallel(GATHER_NODE, gatherers),
                TaskNode::leaf(Arc::clone(&self.agents.itinerary)),
            ],
        )
    }

    /// Validate `request` and start a run in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_run(
        &self,
        request: TripRequest,
        subscriber_id: Option<String>,
    ) -> Result<RunHandle> {
        request.validate()?;

        let run = Run::new(subscriber_id);
        tracing::info!(
            run_id = %run.run_id,
            subscriber_id = ?run.subscriber_id,
            destination = request.destination(),
            "run started"
        );

        let planner = self.clone();
        let task = tokio::spawn(planner.execute(run.clone(), request));

        Ok(RunHandle { run, task })
    }

    /// Start a run and wait for its result.
    pub async fn plan(
        &self,
        request: TripRequest,
        subscriber_id: Option<String>,
    ) -> Result<TripPlan> {
        self.start_run(request, subscriber_id)?.await_result().await
    }

    async fn execute(self, run: Run, request: TripRequest) -> TripPlan {
        let config = self.config.config();
        let request = Arc::new(request);

        let mut state = RunState::new(run.run_id);
        if let Some(subscriber_id) = &run.subscriber_id {
            let phrases = StatusPhrases::with_overrides(&config.status.phrases);
            state = state.with_observer(Arc::new(StatusRelay::new(
                subscriber_id.clone(),
                phrases,
                Arc::clone(&self.broadcaster),
            )));
        }
        let state = Arc::new(state);

        self.notify(
            &run,
            format!(
                "Searching for flights, hotels, and activities in {}...",
                request.destination()
            ),
            "start",
            json!({}),
        );

        let root = self.build_workflow();
        let context = AgentContext::new(Arc::clone(&request), Arc::clone(&state));
        let output = self.engine.run(&root, &context).await;

        let snapshot = state.snapshot();
        drop(context);
        drop(state);

        self.notify(&run, "Finalizing your personalized trip plan...", "post_process", json!({}));

        let plan = ResultAggregator::new(config.aggregation.clone()).aggregate(&snapshot, &request);

        self.notify(
            &run,
            "Your trip plan is ready",
            "complete",
            json!({ "defaults_applied": plan.defaults_applied }),
        );

        tracing::info!(
            run_id = %run.run_id,
            failed = output.failed_keys.len(),
            defaults = plan.defaults_applied.len(),
            duration_ms = output.duration_ms,
            "run finished"
        );

        plan
    }

    fn notify(&self, run: &Run, message: impl Into<String>, step: &str, data: serde_json::Value) {
        if let Some(subscriber_id) = &run.subscriber_id {
            self.broadcaster.publish(subscriber_id, message, Some(step), data);
        }
    }
}

impl std::fmt::Debug for TripPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripPlanner")
            .field("broadcaster", &self.broadcaster)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{keys, Agent};
    use crate::utils::toml_config::TripflowConfig;
    use crate::workflows::node::NodeKind;
    use crate::workflows::state::{OutputKind, TaskOutput};
    use async_trait::async_trait;

    struct Silent {
        key: &'static str,
        kind: OutputKind,
    }

    #[async_trait]
    impl Agent for Silent {
        fn name(&self) -> &str {
            self.key
        }

        fn output_key(&self) -> &str {
            self.key
        }

        fn output_kind(&self) -> OutputKind {
            self.kind
        }

        async fn run(&self, _context: &AgentContext) -> Result<TaskOutput> {
            Ok(TaskOutput::Empty)
        }
    }

    fn planner() -> TripPlanner {
        let agent = |key, kind| -> Arc<dyn Agent> { Arc::new(Silent { key, kind }) };
        let agents = TravelAgents {
            flights: agent(keys::FLIGHTS, OutputKind::Flights),
            hotels: agent(keys::HOTELS, OutputKind::Hotels),
            visa: agent(keys::VISA, OutputKind::Visa),
            activities: agent(keys::ACTIVITIES, OutputKind::Activities),
            itinerary: agent(keys::ITINERARY, OutputKind::Itinerary),
        };
        TripPlanner::new(
            agents,
            Arc::new(StatusBroadcaster::new()),
            Arc::new(TripflowConfigManager::from_config(TripflowConfig::default())),
        )
    }

    #[test]
    fn test_workflow_shape() {
        let root = planner().build_workflow();

        assert_eq!(root.name(), ROOT_NODE);
        assert_eq!(root.kind(), NodeKind::Sequential);
        assert_eq!(
            root.declared_keys(),
            vec!["flights", "hotels", "visa", "activities", "itinerary"]
        );
    }

    #[tokio::test]
    async fn test_invalid_request_creates_no_run() {
        let result = planner().start_run(TripRequest::default(), Some("c1".to_string()));
        assert!(matches!(result, Err(AppError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_lifecycle_messages_reach_subscriber() {
        let planner = planner();
        let mut subscription = planner.subscribe("c1");

        let handle = planner
            .start_run(TripRequest::to_destination("Porto"), Some("c1".to_string()))
            .unwrap();
        assert_eq!(handle.subscriber_id(), Some("c1"));
        let plan = handle.await_result().await.unwrap();
        assert_eq!(plan.destination, "Porto");

        let mut steps = Vec::new();
        while let Some(event) = subscription.try_recv() {
            steps.push(event.step.unwrap_or_default());
        }
        assert_eq!(steps.first().map(String::as_str), Some("start"));
        assert_eq!(steps.len(), 8);
        assert_eq!(&steps[6..], ["post_process", "complete"]);
    }

    #[tokio::test]
    async fn test_blank_subscriber_is_ignored() {
        let handle = planner()
            .start_run(TripRequest::to_destination("Porto"), Some("  ".to_string()))
            .unwrap();
        assert_eq!(handle.subscriber_id(), None);
        assert!(handle.await_result().await.is_ok());
    }
}
