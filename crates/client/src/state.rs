//! Controller state and the entities it owns.
//!
//! [`AppState`] is replaced wholesale on every action; view models only ever
//! see a snapshot.

use std::collections::{BTreeMap, BTreeSet};

use lus_core::label::Label;
use lus_core::sequence_id::SequenceCode;
use lus_core::types::{DbId, Timestamp};
use lus_core::wire::{HistoryRecord, PatientSummary, UserSummary, VideoFile};

use crate::config::{ClientConfig, StaleResponsePolicy};

/// An annotator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: DbId,
    pub name: String,
}

impl From<UserSummary> for User {
    fn from(u: UserSummary) -> Self {
        Self {
            id: u.id,
            name: u.username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub patient_id: String,
    pub display_name: String,
}

impl From<PatientSummary> for Patient {
    fn from(p: PatientSummary) -> Self {
        Self {
            display_name: p.display_name.unwrap_or_else(|| p.patient_id.clone()),
            patient_id: p.patient_id,
        }
    }
}

/// One video clip of the loaded (patient, class) list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// 1-based position within the list.
    pub id: u32,
    pub class: Label,
    pub original_label: Label,
    /// Per-annotator label overrides.
    pub user_corrections: BTreeMap<String, Label>,
    pub file_name: String,
    pub video_url: String,
}

impl Sequence {
    /// Build the list for a (patient, class) pair from the server listing.
    pub fn from_files(class: Label, files: Vec<VideoFile>) -> Vec<Sequence> {
        files
            .into_iter()
            .zip(1u32..)
            .map(|(file, id)| Sequence {
                id,
                class,
                original_label: class,
                user_corrections: BTreeMap::new(),
                file_name: file.file_name,
                video_url: file.url,
            })
            .collect()
    }

    /// The user's override if present, otherwise the original label.
    pub fn effective_label(&self, user: &str) -> Label {
        self.user_corrections
            .get(user)
            .copied()
            .unwrap_or(self.original_label)
    }

    pub fn code(&self) -> SequenceCode {
        SequenceCode::new(self.class, self.id)
    }
}

/// A recorded correction as shown in the history log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Server id, or the local millisecond timestamp until the server
    /// acknowledges the entry.
    pub id: DbId,
    pub patient_id: String,
    /// Display form, e.g. `3-H-002`.
    pub sequence_id: String,
    pub previous_label: Label,
    pub updated_label: Label,
    pub annotator: String,
    pub timestamp: Timestamp,
    /// Class group the sequence belongs to, used for history jumps.
    pub class: Label,
    pub sequence_number: u32,
    /// Label the sequence had before any correction.
    pub original_class: Label,
}

impl HistoryEntry {
    /// Convert a server record. `None` when its sequence id is malformed.
    pub fn from_record(record: HistoryRecord) -> Option<Self> {
        let code: SequenceCode = record
            .sequence_id
            .parse()
            .inspect_err(|e| {
                tracing::warn!(id = record.id, error = %e, "Skipping history record");
            })
            .ok()?;
        Some(Self {
            id: record.id,
            sequence_id: code.display_id(&record.patient_id),
            patient_id: record.patient_id,
            previous_label: record.previous_label,
            updated_label: record.updated_label,
            annotator: record.annotator,
            timestamp: record.timestamp,
            class: code.class,
            sequence_number: code.number,
            original_class: code.class,
        })
    }

    /// Whether the entry refers to the given (patient, class) list.
    pub fn belongs_to(&self, patient_id: &str, class: Label) -> bool {
        self.patient_id == patient_id && self.class == class
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackMode {
    #[default]
    Idle,
    PlayAll,
    Repeat,
}

/// Outcome of the last change-password attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordStatus {
    Pending,
    Changed(String),
    Failed(String),
}

/// The whole controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub users: Vec<User>,
    pub patients: Vec<Patient>,
    /// Name of the logged-in annotator.
    pub session: Option<String>,
    pub login_error: Option<String>,
    pub password_status: Option<PasswordStatus>,
    /// Blocking load failure (users, patients or videos).
    pub load_error: Option<String>,

    pub selected_patient: Option<String>,
    pub selected_class: Label,
    /// The (patient, class) pair `sequences` was fetched for.
    pub loaded: Option<(String, Label)>,
    pub sequences: Vec<Sequence>,
    pub index: usize,
    pub mode: PlaybackMode,
    pub current_frame: u32,
    pub total_frames: Option<u32>,

    /// Correction history per annotator, newest first.
    pub histories: BTreeMap<String, Vec<HistoryEntry>>,
    pub expanded_history: Option<DbId>,
    /// 1-based sequence number to jump to once the next list arrives.
    pub pending_jump: Option<u32>,
    /// Token of the active jump highlight.
    pub highlight: Option<u64>,
    pub(crate) next_highlight: u64,
    /// Local ids of entries whose POST has not been acknowledged yet.
    pub(crate) pending_posts: BTreeSet<DbId>,
    /// Pending local ids deleted before the POST came back.
    pub(crate) cancelled_posts: BTreeSet<DbId>,
    /// Token of the most recent sequence list request.
    pub latest_videos_request: u64,

    pub fps: f64,
    pub stale_responses: StaleResponsePolicy,
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_settings(config.fps, config.stale_responses)
    }

    /// Empty state with the given frame rate and stale response policy.
    pub fn with_settings(fps: f64, stale_responses: StaleResponsePolicy) -> Self {
        Self {
            users: Vec::new(),
            patients: Vec::new(),
            session: None,
            login_error: None,
            password_status: None,
            load_error: None,
            selected_patient: None,
            selected_class: Label::HLus,
            loaded: None,
            sequences: Vec::new(),
            index: 0,
            mode: PlaybackMode::Idle,
            current_frame: 0,
            total_frames: None,
            histories: BTreeMap::new(),
            expanded_history: None,
            pending_jump: None,
            highlight: None,
            next_highlight: 0,
            pending_posts: BTreeSet::new(),
            cancelled_posts: BTreeSet::new(),
            latest_videos_request: 0,
            fps,
            stale_responses,
        }
    }

    pub fn current_sequence(&self) -> Option<&Sequence> {
        self.sequences.get(self.index)
    }

    pub fn has_sequences(&self) -> bool {
        !self.sequences.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.mode != PlaybackMode::Idle
    }

    /// Effective label of the current sequence for the logged-in user.
    pub fn current_label(&self) -> Option<Label> {
        let seq = self.current_sequence()?;
        Some(match &self.session {
            Some(user) => seq.effective_label(user),
            None => seq.original_label,
        })
    }

    /// History of the logged-in user, newest first.
    pub fn user_history(&self) -> &[HistoryEntry] {
        self.session
            .as_ref()
            .and_then(|user| self.histories.get(user))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.is_some()
    }
}
