//! # Tripflow - concurrent trip-planning workflow engine
//!
//! Tripflow plans a trip by running independent data-gathering collaborators
//! (flights, hotels, visa, activities) concurrently, then an itinerary planner
//! that reads what they found. Progress is pushed live to any connected
//! observer and the partial results are merged into one [`TripPlan`], even
//! when some collaborators fail.
//!
//! ## Overview
//!
//! Tripflow can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `tripflow-server` binary
//! 2. **As a library** - Embed the [`TripPlanner`] in your own service
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use tripflow::{StatusBroadcaster, TripPlanner, TripRequest, TripflowConfigManager};
//! use tripflow::agents::TravelAgents;
//! use std::sync::Arc;
//!
//! let config = Arc::new(TripflowConfigManager::new("tripflow.toml")?);
//! let llm = tripflow::llm::Provider::from_config(&config.config().provider)?.create_client()?;
//! let planner = TripPlanner::new(
//!     TravelAgents::with_llm(llm.into()),
//!     Arc::new(StatusBroadcaster::new()),
//!     config,
//! );
//!
//! let plan = planner.plan(TripRequest::to_destination("Kyoto"), None).await?;
//! println!("{} ({})", plan.destination, plan.total_budget);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API support |
//!
//! ## Modules
//!
//! - [`workflows`] - Run state store, task nodes, engine and planner
//! - [`status`] - Status broadcaster and the store-to-status relay
//! - [`aggregate`] - Result aggregation and the budget estimate
//! - [`agents`] - Leaf collaborator contract and the travel agents
//! - [`llm`] - LLM client implementations
//! - [`api`] - REST and WebSocket handlers
//! - [`types`] - Run parameters, domain records and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Result aggregation.
pub mod aggregate;
/// Leaf collaborators.
pub mod agents;
/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// LLM provider clients.
pub mod llm;
/// Live status delivery.
pub mod status;
/// Core types (requests, records, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Workflow orchestration.
pub mod workflows;

// Re-export commonly used types
pub use agents::{Agent, AgentContext, TravelAgents};
pub use aggregate::ResultAggregator;
pub use llm::{LLMClient, Provider};
pub use status::{StatusBroadcaster, StatusEvent, StatusSubscription};
pub use types::{AppError, Result, TripPlan, TripRequest};
pub use utils::toml_config::{TripflowConfig, TripflowConfigManager};
pub use workflows::{RunHandle, TaskNode, TripPlanner, WorkflowEngine};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<TripflowConfigManager>,
    /// Status fan-out shared by all runs and sockets
    pub broadcaster: Arc<StatusBroadcaster>,
    /// Run entry point
    pub planner: TripPlanner,
}

impl AppState {
    /// Wire a planner around `agents` sharing one broadcaster.
    pub fn new(config_manager: Arc<TripflowConfigManager>, agents: TravelAgents) -> Self {
        let broadcaster = Arc::new(StatusBroadcaster::new());
        let planner = TripPlanner::new(
            agents,
            Arc::clone(&broadcaster),
            Arc::clone(&config_manager),
        );

        Self {
            config_manager,
            broadcaster,
            planner,
        }
    }
}
