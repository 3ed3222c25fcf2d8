//! Route definitions for the `/history` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/history`.
///
/// ```text
/// GET    /       -> list_history (?annotator=)
/// POST   /       -> create_history
/// DELETE /{id}   -> delete_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(history::list_history).post(history::create_history))
        .route("/{id}", delete(history::delete_history))
}
