use std::sync::Arc;

use lettings_core::clock::Clock;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lettings_db::DbPool,
    /// Server configuration, including the active viewing rules.
    pub config: Arc<ServerConfig>,
    /// Source of "now" for scheduling decisions.
    pub clock: Arc<dyn Clock>,
}
