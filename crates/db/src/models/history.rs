//! Correction history entity model.

use lus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Insert DTO; identical to the `POST /history` body.
pub use lus_core::wire::NewHistoryEntry as CreateHistoryEntry;

/// A row from the `history_entries` table.
///
/// Labels are stored as their string tokens; `sequence_id` is the raw
/// `<Initial>-<NNN>` form.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub patient_id: String,
    pub sequence_id: String,
    pub previous_label: String,
    pub updated_label: String,
    pub annotator: String,
    pub timestamp: Timestamp,
}
