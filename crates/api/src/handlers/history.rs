//! Handlers for the `/history` resource.
//!
//! Entries record one label correction each. The stored `sequence_id` is the
//! raw `<Initial>-<NNN>` form; display ids are built by the client.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use lus_core::error::CoreError;
use lus_core::label::validate_correction;
use lus_core::sequence_id::SequenceCode;
use lus_core::types::DbId;
use lus_core::wire::{HistoryQuery, NewHistoryEntry};
use lus_db::models::history::HistoryEntry;
use lus_db::repositories::HistoryRepo;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /history?annotator=
///
/// All entries newest first; `annotator` narrows to one user.
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let annotator = params.annotator.as_deref().filter(|a| !a.is_empty());
    let entries = HistoryRepo::list(&state.pool, annotator).await?;
    Ok(Json(entries))
}

/// POST /history
pub async fn create_history(
    State(state): State<AppState>,
    Json(input): Json<NewHistoryEntry>,
) -> AppResult<(StatusCode, Json<HistoryEntry>)> {
    validate_new_entry(&input)?;

    let entry = HistoryRepo::create(&state.pool, &input).await?;

    tracing::info!(
        id = entry.id,
        annotator = %entry.annotator,
        patient_id = %entry.patient_id,
        sequence_id = %entry.sequence_id,
        "History entry created"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /history/{id}
pub async fn delete_history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    if !HistoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("HistoryEntry", id)));
    }
    tracing::info!(id, "History entry deleted");
    Ok(Json(json!({ "ok": true })))
}

fn validate_new_entry(input: &NewHistoryEntry) -> Result<(), CoreError> {
    if input.patient_id.trim().is_empty() {
        return Err(CoreError::Validation("patient_id must not be empty".into()));
    }
    if input.annotator.trim().is_empty() {
        return Err(CoreError::Validation("annotator must not be empty".into()));
    }
    input.sequence_id.parse::<SequenceCode>()?;
    validate_correction(input.previous_label, input.updated_label)
}

#[cfg(test)]
mod tests {
    use lus_core::label::Label;

    use super::*;

    fn entry() -> NewHistoryEntry {
        NewHistoryEntry {
            patient_id: "Patient_1".into(),
            sequence_id: "H-001".into(),
            previous_label: Label::HLus,
            updated_label: Label::CLus,
            annotator: "dr.lee".into(),
        }
    }

    #[test]
    fn test_valid_entry_accepted() {
        assert!(validate_new_entry(&entry()).is_ok());
    }

    #[test]
    fn test_display_form_sequence_id_rejected() {
        let mut e = entry();
        e.sequence_id = "1-H-001".into();
        assert!(validate_new_entry(&e).is_err());
    }

    #[test]
    fn test_blank_annotator_rejected() {
        let mut e = entry();
        e.annotator = "  ".into();
        assert!(validate_new_entry(&e).is_err());
    }

    #[test]
    fn test_non_adjacent_correction_rejected() {
        let mut e = entry();
        e.updated_label = Label::ILus;
        assert!(validate_new_entry(&e).is_err());
    }
}
