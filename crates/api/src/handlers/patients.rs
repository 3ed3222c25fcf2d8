//! Handlers for the `/api/patients` resource.
//!
//! Backed by the on-disk [`VideoLibrary`]. Directory listing is blocking
//! I/O, so every call runs on the blocking thread pool.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use lus_core::error::CoreError;
use lus_core::label::Label;
use lus_core::library::VideoLibrary;
use lus_core::wire::{PatientSummary, VideoFile};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Run a library query on the blocking pool.
pub(crate) async fn with_library<T, F>(state: &AppState, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&VideoLibrary) -> Result<T, CoreError> + Send + 'static,
{
    let library = Arc::clone(&state.library);
    tokio::task::spawn_blocking(move || f(&library))
        .await
        .map_err(|e| AppError::InternalError(format!("Library task failed: {e}")))?
        .map_err(AppError::from)
}

/// GET /api/patients
///
/// Each folder under the library root is a patient; the folder name doubles
/// as the display name.
pub async fn list_patients(State(state): State<AppState>) -> AppResult<Json<Vec<PatientSummary>>> {
    let names = with_library(&state, |lib| Ok(lib.list_patients())).await?;
    Ok(Json(
        names
            .into_iter()
            .map(|name| PatientSummary {
                display_name: Some(name.clone()),
                patient_id: name,
            })
            .collect(),
    ))
}

/// GET /api/patients/{patient_id}/classes
///
/// 404 when the patient is unknown or has no class folders.
pub async fn list_classes(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> AppResult<Json<Vec<Label>>> {
    let id = patient_id.clone();
    let classes = with_library(&state, move |lib| lib.list_classes(&id)).await?;
    if classes.is_empty() {
        return Err(AppError::Core(CoreError::not_found("Patient", patient_id)));
    }
    Ok(Json(classes))
}

/// GET /api/patients/{patient_id}/classes/{class_id}/videos
///
/// An unknown patient or an empty class yields `[]` so the client can show
/// "no sequences" rather than an error.
pub async fn list_videos(
    State(state): State<AppState>,
    Path((patient_id, class_id)): Path<(String, String)>,
) -> AppResult<Json<Vec<VideoFile>>> {
    let class: Label = class_id.parse()?;
    let videos = with_library(&state, move |lib| lib.list_videos(&patient_id, class)).await?;
    Ok(Json(
        videos
            .into_iter()
            .map(|v| VideoFile {
                url: format!("/api/videos/{}", v.file_id),
                file_name: v.file_name,
            })
            .collect(),
    ))
}
