use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// `GET /health` payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both the database and the video root are usable,
    /// `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the configured video root is a readable directory.
    pub library_available: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = lus_db::health_check(&state.pool).await.is_ok();
    let library_available = state.library.root().is_dir();

    if !library_available {
        tracing::debug!(
            video_root = %state.library.root().display(),
            "Health check: video root missing"
        );
    }

    Json(HealthResponse {
        status: if db_healthy && library_available {
            "ok"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        library_available,
    })
}

/// Mounted at the root, outside `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
