//! Trip planning handler

use crate::{
    types::{Result, TripPlan, TripRequest},
    AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/plan`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanRequest {
    #[serde(flatten)]
    pub trip: TripRequest,
    /// Status channel id; progress is pushed to `/ws/{client_id}` while the
    /// plan is assembled
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Plan a trip
///
/// Runs the full workflow and returns the aggregated plan. A run that started
/// always answers with a plan; fields whose collaborator failed carry their
/// default value and are listed in `defaults_applied`.
#[utoipa::path(
    post,
    path = "/api/plan",
    request_body = PlanRequest,
    responses(
        (status = 200, description = "Aggregated trip plan", body = TripPlan),
        (status = 400, description = "Invalid trip parameters"),
        (status = 500, description = "Run task lost")
    ),
    tag = "planning"
)]
pub async fn plan_trip(
    State(state): State<AppState>,
    Json(payload): Json<PlanRequest>,
) -> Result<Json<TripPlan>> {
    let handle = state.planner.start_run(payload.trip, payload.client_id)?;
    tracing::debug!(run_id = %handle.run_id(), "awaiting plan");

    let plan = handle.await_result().await?;
    Ok(Json(plan))
}
