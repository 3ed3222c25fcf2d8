//! View models for the presentational components.
//!
//! Each component is a plain struct computed from an [`AppState`] snapshot.
//! Components never mutate state; user input turns into an [`Action`] that
//! the caller dispatches.

use lus_core::label::{Badge, Label};
use lus_core::types::DbId;

use crate::action::Action;
use crate::state::{AppState, HistoryEntry, PasswordStatus, PlaybackMode};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which top-level screen to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Full-screen blocking error.
    LoadError(String),
    Login(LoginForm),
    Annotate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub usernames: Vec<String>,
    pub error: Option<String>,
}

pub fn screen(state: &AppState) -> Screen {
    if let Some(error) = &state.load_error {
        return Screen::LoadError(error.clone());
    }
    if state.session.is_none() {
        return Screen::Login(LoginForm {
            usernames: state.users.iter().map(|u| u.name.clone()).collect(),
            error: state.login_error.clone(),
        });
    }
    Screen::Annotate
}

/// Inline result of the change-password form.
pub fn password_message(state: &AppState) -> Option<(bool, &str)> {
    match state.password_status.as_ref()? {
        PasswordStatus::Pending => None,
        PasswordStatus::Changed(detail) => Some((true, detail.as_str())),
        PasswordStatus::Failed(detail) => Some((false, detail.as_str())),
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<T> {
    pub value: T,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSelector {
    pub options: Vec<SelectOption<String>>,
    pub selected: Option<String>,
    pub disabled: bool,
}

impl PatientSelector {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            options: state
                .patients
                .iter()
                .map(|p| SelectOption {
                    value: p.patient_id.clone(),
                    label: p.display_name.clone(),
                })
                .collect(),
            selected: state.selected_patient.clone(),
            disabled: state.is_playing(),
        }
    }

    pub fn select(&self, patient_id: &str) -> Option<Action> {
        (!self.disabled).then(|| Action::SelectPatient(patient_id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSelector {
    pub options: Vec<SelectOption<Label>>,
    pub selected: Label,
    pub disabled: bool,
}

impl ClassSelector {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            options: Label::ALL
                .into_iter()
                .map(|l| SelectOption {
                    value: l,
                    label: l.to_string(),
                })
                .collect(),
            selected: state.selected_class,
            disabled: state.is_playing(),
        }
    }

    pub fn select(&self, class: Label) -> Option<Action> {
        (!self.disabled).then_some(Action::SelectClass(class))
    }
}

/// The labels the current sequence may be corrected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionSelector {
    pub current: Option<Label>,
    pub options: Vec<Label>,
    pub disabled: bool,
}

impl CorrectionSelector {
    pub fn from_state(state: &AppState) -> Self {
        let current = state.current_label();
        Self {
            current,
            options: current
                .map(|l| l.valid_transitions().to_vec())
                .unwrap_or_default(),
            disabled: state.is_playing() || current.is_none() || state.session.is_none(),
        }
    }

    pub fn options_for(label: Label) -> &'static [Label] {
        label.valid_transitions()
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Header above the player for the current sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceHeader {
    /// Display id, e.g. `3-H-002`.
    pub sequence_id: String,
    pub file_name: String,
    pub badge: Badge,
    pub original: Label,
    pub corrected: bool,
    /// Set briefly after a history jump.
    pub highlighted: bool,
}

impl SequenceHeader {
    pub fn from_state(state: &AppState) -> Option<Self> {
        let seq = state.current_sequence()?;
        let (patient_id, _) = state.loaded.as_ref()?;
        let label = state.current_label()?;
        Some(Self {
            sequence_id: seq.code().display_id(patient_id),
            file_name: seq.file_name.clone(),
            badge: label.badge(),
            original: seq.original_label,
            corrected: label != seq.original_label,
            highlighted: state.is_highlighted(),
        })
    }
}

/// Transport buttons and the frame slider.
///
/// While any playback mode is active only Pause and the slider are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportControls {
    pub play_enabled: bool,
    pub pause_enabled: bool,
    pub repeat_enabled: bool,
    pub repeat_active: bool,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub slider_enabled: bool,
    pub frame: u32,
    pub total_frames: Option<u32>,
    /// e.g. `"2 / 5"`, empty without sequences.
    pub position: String,
}

impl TransportControls {
    pub fn from_state(state: &AppState) -> Self {
        let has = state.has_sequences();
        let idle = state.mode == PlaybackMode::Idle;
        let count = state.sequences.len();
        Self {
            play_enabled: has && idle,
            pause_enabled: has && !idle,
            repeat_enabled: has && state.mode != PlaybackMode::PlayAll,
            repeat_active: state.mode == PlaybackMode::Repeat,
            previous_enabled: has && idle && state.index > 0,
            next_enabled: has && idle && state.index + 1 < count,
            slider_enabled: has,
            frame: state.current_frame,
            total_frames: state.total_frames,
            position: if has {
                format!("{} / {count}", state.index + 1)
            } else {
                String::new()
            },
        }
    }
}

// ---------------------------------------------------------------------------
// History log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: DbId,
    pub sequence_id: String,
    pub previous: Badge,
    pub updated: Badge,
    pub timestamp: String,
    pub expanded: bool,
    /// Detail lines shown when expanded.
    pub details: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    pub rows: Vec<HistoryRow>,
    /// Jump and delete are locked while playing.
    pub actions_enabled: bool,
}

impl HistoryLog {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            rows: state
                .user_history()
                .iter()
                .map(|e| history_row(e, state.expanded_history == Some(e.id)))
                .collect(),
            actions_enabled: !state.is_playing(),
        }
    }

    pub fn toggle(&self, id: DbId) -> Action {
        Action::ToggleHistoryRow(id)
    }

    pub fn jump(&self, id: DbId) -> Option<Action> {
        self.actions_enabled.then_some(Action::JumpToHistory(id))
    }

    pub fn delete(&self, id: DbId) -> Option<Action> {
        self.actions_enabled.then_some(Action::DeleteHistory(id))
    }
}

fn history_row(entry: &HistoryEntry, expanded: bool) -> HistoryRow {
    let details = if expanded {
        vec![
            ("Patient".to_string(), entry.patient_id.clone()),
            ("Class".to_string(), entry.class.to_string()),
            ("Sequence".to_string(), entry.sequence_number.to_string()),
            ("Original".to_string(), entry.original_class.to_string()),
            ("Annotator".to_string(), entry.annotator.clone()),
        ]
    } else {
        Vec::new()
    };
    HistoryRow {
        id: entry.id,
        sequence_id: entry.sequence_id.clone(),
        previous: entry.previous_label.badge(),
        updated: entry.updated_label.badge(),
        timestamp: entry.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        expanded,
        details,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lus_core::wire::VideoFile;

    use super::*;
    use crate::config::ClientConfig;
    use crate::controller::reduce;
    use crate::state::{Patient, User};

    fn annotating(n: usize) -> AppState {
        let mut state = AppState::new(&ClientConfig::default());
        state.session = Some("dr.lee".into());
        state.users = vec![User {
            id: 1,
            name: "dr.lee".into(),
        }];
        state.patients = vec![Patient {
            patient_id: "Patient_3".into(),
            display_name: "Patient 3".into(),
        }];
        state.selected_patient = Some("Patient_3".into());
        let files = (1..=n)
            .map(|i| VideoFile {
                file_name: format!("c{i}.mp4"),
                url: format!("http://h/{i}"),
            })
            .collect();
        reduce(
            &state,
            Action::VideosLoaded {
                request: 0,
                patient_id: "Patient_3".into(),
                class: Label::CLus,
                result: Ok(files),
            },
        )
        .state
    }

    #[test]
    fn test_screen_selection() {
        let mut state = AppState::new(&ClientConfig::default());
        state.login_error = Some("bad".into());
        assert_eq!(
            screen(&state),
            Screen::Login(LoginForm {
                usernames: vec![],
                error: Some("bad".into())
            })
        );
        state.load_error = Some("down".into());
        assert_eq!(screen(&state), Screen::LoadError("down".into()));
        assert_eq!(screen(&annotating(1)), Screen::Annotate);
    }

    #[test]
    fn test_correction_selector_options() {
        let state = annotating(2);
        let selector = CorrectionSelector::from_state(&state);
        assert_eq!(selector.current, Some(Label::CLus));
        assert_eq!(selector.options, vec![Label::HLus, Label::ILus]);
        assert!(!selector.disabled);
        assert_eq!(CorrectionSelector::options_for(Label::HLus), &[Label::CLus]);
    }

    #[test]
    fn test_controls_locked_while_playing() {
        let state = reduce(&annotating(3), Action::Play).state;
        let controls = TransportControls::from_state(&state);
        assert!(!controls.play_enabled);
        assert!(controls.pause_enabled);
        assert!(!controls.repeat_enabled);
        assert!(!controls.next_enabled);
        assert!(controls.slider_enabled);

        assert!(CorrectionSelector::from_state(&state).disabled);
        assert!(PatientSelector::from_state(&state).select("Patient_3").is_none());
        assert!(ClassSelector::from_state(&state).select(Label::HLus).is_none());
    }

    #[test]
    fn test_controls_when_idle() {
        let state = annotating(3);
        let controls = TransportControls::from_state(&state);
        assert!(controls.play_enabled);
        assert!(!controls.pause_enabled);
        assert!(!controls.previous_enabled);
        assert!(controls.next_enabled);
        assert_eq!(controls.position, "1 / 3");

        let empty = TransportControls::from_state(&annotating(0));
        assert!(!empty.play_enabled);
        assert!(!empty.slider_enabled);
        assert_eq!(empty.position, "");
    }

    #[test]
    fn test_sequence_header() {
        let state = annotating(2);
        let header = SequenceHeader::from_state(&state).unwrap();
        assert_eq!(header.sequence_id, "3-C-001");
        assert_eq!(header.badge, Label::CLus.badge());
        assert!(!header.corrected);
        assert!(!header.highlighted);
    }

    #[test]
    fn test_history_rows() {
        let state = annotating(2);
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        let state = reduce(
            &state,
            Action::CorrectLabel {
                label: Label::ILus,
                now,
            },
        )
        .state;
        let log = HistoryLog::from_state(&state);
        assert_eq!(log.rows.len(), 1);
        let row = &log.rows[0];
        assert_eq!(row.sequence_id, "3-C-001");
        assert_eq!(row.previous.text, "C-LUS");
        assert_eq!(row.updated.text, "I-LUS");
        assert_eq!(row.timestamp, "2025-03-01 09:30:00");
        assert!(!row.expanded);
        assert!(row.details.is_empty());

        let state = reduce(&state, log.toggle(row.id)).state;
        let log = HistoryLog::from_state(&state);
        assert!(log.rows[0].expanded);
        assert_eq!(log.rows[0].details[0], ("Patient".into(), "Patient_3".into()));
        assert_eq!(log.delete(row.id), Some(Action::DeleteHistory(row.id)));

        let header = SequenceHeader::from_state(&state).unwrap();
        assert!(header.corrected);
        assert_eq!(header.badge.text, "I-LUS");
    }

    #[test]
    fn test_password_message() {
        let mut state = annotating(0);
        assert_eq!(password_message(&state), None);
        state.password_status = Some(PasswordStatus::Failed("Old password is incorrect".into()));
        assert_eq!(
            password_message(&state),
            Some((false, "Old password is incorrect"))
        );
    }
}
