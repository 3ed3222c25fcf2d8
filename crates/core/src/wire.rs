//! Request and response bodies of the REST surface.
//!
//! Both the server handlers and the client decode against these types, so a
//! shape mismatch surfaces as a typed decoding error on either side.

use serde::{Deserialize, Serialize};

use crate::label::Label;
use crate::types::{DbId, Timestamp};

/// An annotator as listed by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: DbId,
    pub username: String,
}

/// `POST /users` and `DELETE /users` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

/// `POST /auth/login` body.
pub type LoginRequest = UserCredentials;

/// `POST /auth/change-password` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

/// Generic `{ "detail": ... }` message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub detail: String,
}

/// A patient as listed by `GET /api/patients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A video file as listed by `GET /api/patients/{id}/classes/{class}/videos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    pub file_name: String,
    /// Server-relative streaming URL, e.g. `/api/videos/<file_id>`.
    pub url: String,
}

/// `POST /history` body. `sequence_id` is the raw form (`H-001`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub patient_id: String,
    pub sequence_id: String,
    pub previous_label: Label,
    pub updated_label: Label,
    pub annotator: String,
}

/// A persisted history entry as returned by `GET /history` and `POST /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: DbId,
    pub patient_id: String,
    pub sequence_id: String,
    pub previous_label: Label,
    pub updated_label: Label,
    pub annotator: String,
    pub timestamp: Timestamp,
}

/// `GET /history` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub annotator: Option<String>,
}
