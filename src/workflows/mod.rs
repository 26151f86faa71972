//! Workflow orchestration
//!
//! A run executes a tree of task nodes against its own state store:
//!
//! ```text
//! TravelPlannerAgent (sequential)
//! ├── DataGathererAgent (parallel)
//! │   ├── flights
//! │   ├── hotels
//! │   ├── visa
//! │   └── activities
//! └── itinerary
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let planner = TripPlanner::new(agents, broadcaster, config_manager);
//! let handle = planner.start_run(request, Some("browser-tab".into()))?;
//! let plan = handle.await_result().await?;
//! println!("Estimated total: {}", plan.total_budget);
//! ```

pub mod engine;
pub mod node;
pub mod planner;
pub mod state;

pub use engine::{WorkflowEngine, WorkflowOutput};
pub use node::{NodeKind, NodeReport, NodeStatus, TaskNode};
pub use planner::{Run, RunHandle, TripPlanner};
pub use state::{OutputKind, RunState, StateDelta, StateObserver, StateSnapshot, TaskOutput};
