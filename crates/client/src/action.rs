//! Inputs to and outputs of the controller.
//!
//! Network results travel back as `Result<_, String>`: the reducer only
//! needs the user-facing message and must stay `Clone`.

use std::time::Duration;

use lus_core::label::Label;
use lus_core::types::{DbId, Timestamp};
use lus_core::wire::{HistoryRecord, NewHistoryEntry, VideoFile};

use crate::keyboard::Key;
use crate::state::{Patient, User};

/// How long the history jump highlight stays up.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Everything that can happen to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // -- startup and session --
    Init,
    UsersLoaded(Result<Vec<User>, String>),
    LoginSubmitted {
        username: String,
        password: String,
    },
    LoginFinished {
        username: String,
        result: Result<(), String>,
    },
    Logout,
    ChangePasswordSubmitted {
        old_password: String,
        new_password: String,
    },
    PasswordChangeFinished(Result<String, String>),

    // -- library --
    PatientsLoaded(Result<Vec<Patient>, String>),
    VideosLoaded {
        request: u64,
        patient_id: String,
        class: Label,
        result: Result<Vec<VideoFile>, String>,
    },
    SelectPatient(String),
    SelectClass(Label),
    SelectSequence(usize),
    NextSequence,
    PreviousSequence,

    // -- playback --
    Play,
    Pause,
    ToggleRepeat,
    KeyPressed(Key),
    MediaEnded,
    TimeUpdated {
        seconds: f64,
    },
    MetadataLoaded {
        duration_secs: f64,
    },
    SeekFrame(u32),

    // -- corrections and history --
    CorrectLabel {
        label: Label,
        now: Timestamp,
    },
    HistoryLoaded {
        annotator: String,
        result: Result<Vec<HistoryRecord>, String>,
    },
    HistoryPersisted {
        annotator: String,
        local_id: DbId,
        result: Result<HistoryRecord, String>,
    },
    ToggleHistoryRow(DbId),
    JumpToHistory(DbId),
    DeleteHistory(DbId),
    HistoryDeleteFinished {
        id: DbId,
        result: Result<(), String>,
    },
    HighlightExpired(u64),
}

/// Work the controller asks the runtime to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadUsers,
    LoadPatients,
    LoadVideos {
        request: u64,
        patient_id: String,
        class: Label,
    },
    Login {
        username: String,
        password: String,
    },
    ChangePassword {
        username: String,
        old_password: String,
        new_password: String,
    },
    LoadHistory {
        annotator: String,
    },
    PostHistory {
        annotator: String,
        local_id: DbId,
        entry: NewHistoryEntry,
    },
    DeleteHistory {
        id: DbId,
    },
    /// Move the media element to a position.
    Seek {
        seconds: f64,
    },
    /// Send [`Action::HighlightExpired`] with `token` after `after`.
    ScheduleHighlightClear {
        token: u64,
        after: Duration,
    },
}
