//! HTTP API Handlers and Routes
//!
//! Thin transport layer over [`TripPlanner`](crate::workflows::TripPlanner),
//! built on the Axum web framework.
//!
//! # API Endpoints
//!
//! - `POST /api/plan` - Run the travel workflow and return the aggregated plan
//! - `GET /ws/{client_id}` - WebSocket stream of status events for a client id
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/openapi.json` - OpenAPI document

/// Request handlers for all endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI documentation for the tripflow HTTP API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tripflow API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Concurrent trip planning with live status streaming"
    ),
    paths(handlers::plan::plan_trip, handlers::health::health),
    components(schemas(
        handlers::plan::PlanRequest,
        handlers::health::HealthResponse,
        crate::types::TripRequest,
        crate::types::TripPlan,
        crate::types::Flight,
        crate::types::Hotel,
        crate::types::VisaInfo,
        crate::types::Activity,
        crate::types::ItineraryDay,
    )),
    tags(
        (name = "planning", description = "Trip planning runs"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;
