//! Route definitions for the video library under `/api`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{patients, videos};
use crate::state::AppState;

/// Routes mounted at `/api`.
///
/// ```text
/// GET /patients                                         -> list_patients
/// GET /patients/{patient_id}/classes                    -> list_classes
/// GET /patients/{patient_id}/classes/{class_id}/videos  -> list_videos
/// GET /videos/{file_id}                                 -> stream_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", get(patients::list_patients))
        .route("/patients/{patient_id}/classes", get(patients::list_classes))
        .route(
            "/patients/{patient_id}/classes/{class_id}/videos",
            get(patients::list_videos),
        )
        .route("/videos/{file_id}", get(videos::stream_video))
}
