use std::sync::Arc;

use lus_core::library::VideoLibrary;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: lus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Patient/class/video tree served by the `/api` routes.
    pub library: Arc<VideoLibrary>,
}
