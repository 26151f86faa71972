//! Workflow Engine
//!
//! Interprets a [`TaskNode`] tree against one run's state store and reports
//! when the root is terminal. The engine neither retries nor times individual
//! leaves; that is up to the collaborators.

use crate::agents::AgentContext;
use crate::workflows::node::{NodeReport, NodeStatus, TaskNode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// Output from a workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutput {
    pub run_id: Uuid,
    /// Execution record of the whole tree
    pub report: NodeReport,
    /// Number of leaves executed
    pub steps_executed: usize,
    /// Output keys of leaves that failed and stored the empty sentinel
    pub failed_keys: Vec<String>,
    pub duration_ms: u64,
}

impl WorkflowOutput {
    pub fn is_degraded(&self) -> bool {
        !self.failed_keys.is_empty()
    }
}

/// Stateless tree interpreter, shareable across concurrent runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowEngine;

impl WorkflowEngine {
    pub fn new() -> Self {
        Self
    }

    /// Drive `root` to completion. Returns once every node is terminal.
    pub async fn run(&self, root: &TaskNode, context: &AgentContext) -> WorkflowOutput {
        let started = Instant::now();
        tracing::info!(
            run_id = %context.run_id,
            root = root.name(),
            leaves = root.declared_keys().len(),
            "workflow started"
        );

        let report = root.execute(context).await;

        let leaves = report.leaves();
        let failed_keys: Vec<String> = leaves
            .iter()
            .filter(|leaf| leaf.status == NodeStatus::Failed)
            .filter_map(|leaf| leaf.output_key.clone())
            .collect();
        let steps_executed = leaves.len();
        let duration_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            run_id = %context.run_id,
            steps_executed,
            failed = failed_keys.len(),
            duration_ms,
            "workflow finished"
        );

        WorkflowOutput {
            run_id: context.run_id,
            report,
            steps_executed,
            failed_keys,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::types::{AppError, Result, TripRequest};
    use crate::workflows::state::{OutputKind, RunState, TaskOutput};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    struct Echo {
        key: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Agent for Echo {
        fn name(&self) -> &str {
            self.key
        }

        fn output_key(&self) -> &str {
            self.key
        }

        fn output_kind(&self) -> OutputKind {
            OutputKind::Value
        }

        async fn run(&self, _context: &AgentContext) -> Result<TaskOutput> {
            if self.fail {
                return Err(AppError::Collaborator("no data".to_string()));
            }
            Ok(TaskOutput::Value(json!(self.key)))
        }
    }

    #[tokio::test]
    async fn test_run_reports_failed_keys() {
        let root = TaskNode::sequential(
            "root",
            vec![
                TaskNode::parallel(
                    "gather",
                    vec![
                        TaskNode::leaf(Arc::new(Echo { key: "a", fail: false })),
                        TaskNode::leaf(Arc::new(Echo { key: "b", fail: true })),
                    ],
                ),
                TaskNode::leaf(Arc::new(Echo { key: "c", fail: false })),
            ],
        );
        let state = Arc::new(RunState::new(Uuid::new_v4()));
        let context =
            AgentContext::new(Arc::new(TripRequest::to_destination("Quito")), state.clone());

        let output = WorkflowEngine::new().run(&root, &context).await;

        assert_eq!(output.run_id, state.run_id());
        assert_eq!(output.steps_executed, 3);
        assert_eq!(output.failed_keys, vec!["b".to_string()]);
        assert!(output.is_degraded());
        assert_eq!(output.report.status, NodeStatus::Completed);
        assert_eq!(state.keys(), vec!["a", "b", "c"]);
    }
}
