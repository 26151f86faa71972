//! API request handlers.

/// Liveness and configuration summary.
pub mod health;
/// Trip planning.
pub mod plan;
/// WebSocket status streaming.
pub mod status;
