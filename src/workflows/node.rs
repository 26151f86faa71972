//! Task Node
//!
//! A workflow is a tree of [`TaskNode`]s. Leaves call one collaborator and
//! write one key; `Parallel` groups run their children concurrently and join
//! on all of them; `Sequential` groups run children strictly in order so a
//! child can read everything its predecessors wrote.

use crate::agents::{Agent, AgentContext};
use crate::workflows::state::TaskOutput;
use chrono::Utc;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle of a node: `Pending -> Running -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl NodeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Leaf,
    Parallel,
    Sequential,
}

/// Execution record of one node and its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeReport {
    pub name: String,
    pub kind: NodeKind,
    pub status: NodeStatus,
    /// Key written by a leaf
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Collaborator failure contained by a leaf
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix timestamp (ms) when the node started running
    pub started_at: i64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeReport>,
}

impl NodeReport {
    /// All leaf reports in tree order.
    pub fn leaves(&self) -> Vec<&NodeReport> {
        match self.kind {
            NodeKind::Leaf => vec![self],
            _ => self.children.iter().flat_map(|c| c.leaves()).collect(),
        }
    }

    fn group(
        name: &str,
        kind: NodeKind,
        started_at: i64,
        started: Instant,
        children: Vec<NodeReport>,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            status: NodeStatus::Completed,
            output_key: None,
            error: None,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            children,
        }
    }
}

/// Immutable node tree, built fresh for each run.
pub enum TaskNode {
    Leaf(Arc<dyn Agent>),
    Parallel { name: String, children: Vec<TaskNode> },
    Sequential { name: String, children: Vec<TaskNode> },
}

impl TaskNode {
    pub fn leaf(agent: Arc<dyn Agent>) -> Self {
        TaskNode::Leaf(agent)
    }

    pub fn parallel(name: impl Into<String>, children: Vec<TaskNode>) -> Self {
        TaskNode::Parallel {
            name: name.into(),
            children,
        }
    }

    pub fn sequential(name: impl Into<String>, children: Vec<TaskNode>) -> Self {
        TaskNode::Sequential {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaskNode::Leaf(agent) => agent.name(),
            TaskNode::Parallel { name, .. } | TaskNode::Sequential { name, .. } => name,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TaskNode::Leaf(_) => NodeKind::Leaf,
            TaskNode::Parallel { .. } => NodeKind::Parallel,
            TaskNode::Sequential { .. } => NodeKind::Sequential,
        }
    }

    /// Output keys of every leaf below this node, in tree order.
    pub fn declared_keys(&self) -> Vec<&str> {
        match self {
            TaskNode::Leaf(agent) => vec![agent.output_key()],
            TaskNode::Parallel { children, .. } | TaskNode::Sequential { children, .. } => {
                children.iter().flat_map(|c| c.declared_keys()).collect()
            }
        }
    }

    /// Drive this node to a terminal state. Never fails: leaf errors end up
    /// in the report and as [`TaskOutput::Empty`] in the store.
    pub fn execute<'a>(&'a self, context: &'a AgentContext) -> BoxFuture<'a, NodeReport> {
        async move {
            let started_at = Utc::now().timestamp_millis();
            let started = Instant::now();

            match self {
                TaskNode::Leaf(agent) => {
                    execute_leaf(agent.as_ref(), context, started_at, started).await
                }
                TaskNode::Parallel { name, children } => {
                    tracing::debug!(
                        run_id = %context.run_id,
                        group = %name,
                        size = children.len(),
                        "parallel group running"
                    );
                    let reports = join_all(children.iter().map(|c| c.execute(context))).await;
                    NodeReport::group(name, NodeKind::Parallel, started_at, started, reports)
                }
                TaskNode::Sequential { name, children } => {
                    tracing::debug!(
                        run_id = %context.run_id,
                        group = %name,
                        size = children.len(),
                        "sequential group running"
                    );
                    let mut reports = Vec::with_capacity(children.len());
                    for child in children {
                        reports.push(child.execute(context).await);
                    }
                    NodeReport::group(name, NodeKind::Sequential, started_at, started, reports)
                }
            }
        }
        .boxed()
    }
}

async fn execute_leaf(
    agent: &dyn Agent,
    context: &AgentContext,
    started_at: i64,
    started: Instant,
) -> NodeReport {
    let key = agent.output_key();
    tracing::debug!(
        run_id = %context.run_id,
        agent = agent.name(),
        key,
        status = ?NodeStatus::Running,
        "leaf running"
    );

    let outcome = AssertUnwindSafe(agent.run(context)).catch_unwind().await;

    let (value, error) = match outcome {
        Ok(Ok(value)) => match value.kind() {
            Some(kind) if kind != agent.output_kind() => (
                TaskOutput::Empty,
                Some(format!("expected {} output, got {}", agent.output_kind(), kind)),
            ),
            _ => (value, None),
        },
        Ok(Err(e)) => (TaskOutput::Empty, Some(e.to_string())),
        Err(_) => (TaskOutput::Empty, Some("collaborator panicked".to_string())),
    };

    // Written even on failure so downstream readers always find something
    context.state.write(key, value);

    let duration_ms = started.elapsed().as_millis() as u64;
    let status = match &error {
        None => NodeStatus::Completed,
        Some(reason) => {
            tracing::warn!(
                run_id = %context.run_id,
                agent = agent.name(),
                key,
                duration_ms,
                error = %reason,
                "leaf failed, stored empty result"
            );
            NodeStatus::Failed
        }
    };

    NodeReport {
        name: agent.name().to_string(),
        kind: NodeKind::Leaf,
        status,
        output_key: Some(key.to_string()),
        error,
        started_at,
        duration_ms,
        children: Vec::new(),
    }
}
