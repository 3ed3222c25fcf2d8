//! The application controller.
//!
//! [`reduce`] is a pure function from the current state and one action to
//! the next state plus the effects to run. It never performs I/O; the
//! runtime executes effects and feeds their outcomes back as actions.
//!
//! Playback modes:
//!
//! ```text
//!            Play / Space                 Repeat / R
//!   PlayAll <------------ Idle ----------------------> Repeat
//!      |    ------------>  ^  <----------------------
//!      |    Pause / Space  |        Repeat / R / Pause / Space
//!      +-------------------+
//!        ended on the last sequence
//! ```
//!
//! Every navigation (patient, class, sequence, history jump) forces `Idle`
//! and rewinds to frame zero.

use chrono::Utc;
use lus_core::frames;
use lus_core::label::Label;
use lus_core::types::{DbId, Timestamp};
use lus_core::wire::{HistoryRecord, NewHistoryEntry, VideoFile};

use crate::action::{Action, Effect, HIGHLIGHT_DURATION};
use crate::config::StaleResponsePolicy;
use crate::keyboard::Key;
use crate::state::{AppState, HistoryEntry, PasswordStatus, Patient, PlaybackMode, Sequence, User};

/// Result of reducing one action.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: AppState,
    pub effects: Vec<Effect>,
}

/// Apply `action` to a copy of `state`.
pub fn reduce(state: &AppState, action: Action) -> Transition {
    let mut reducer = Reducer {
        state: state.clone(),
        effects: Vec::new(),
    };
    reducer.apply(action);
    Transition {
        state: reducer.state,
        effects: reducer.effects,
    }
}

struct Reducer {
    state: AppState,
    effects: Vec<Effect>,
}

impl Reducer {
    fn apply(&mut self, action: Action) {
        match action {
            Action::Init => self.effects.push(Effect::LoadUsers),
            Action::UsersLoaded(result) => self.users_loaded(result),
            Action::LoginSubmitted { username, password } => {
                self.state.login_error = None;
                self.effects.push(Effect::Login { username, password });
            }
            Action::LoginFinished { username, result } => self.login_finished(username, result),
            Action::Logout => self.logout(),
            Action::ChangePasswordSubmitted {
                old_password,
                new_password,
            } => self.change_password(old_password, new_password),
            Action::PasswordChangeFinished(result) => {
                self.state.password_status = Some(match result {
                    Ok(detail) => PasswordStatus::Changed(detail),
                    Err(detail) => PasswordStatus::Failed(detail),
                });
            }

            Action::PatientsLoaded(result) => self.patients_loaded(result),
            Action::VideosLoaded {
                request,
                patient_id,
                class,
                result,
            } => self.videos_loaded(request, patient_id, class, result),
            Action::SelectPatient(patient_id) => {
                self.state.pending_jump = None;
                let class = self.state.selected_class;
                self.select(patient_id, class);
            }
            Action::SelectClass(class) => {
                self.state.pending_jump = None;
                if let Some(patient_id) = self.state.selected_patient.clone() {
                    self.select(patient_id, class);
                } else {
                    self.state.selected_class = class;
                }
            }
            Action::SelectSequence(index) => self.go_to(index),
            Action::NextSequence => self.go_to(self.state.index.saturating_add(1)),
            Action::PreviousSequence => {
                if let Some(index) = self.state.index.checked_sub(1) {
                    self.go_to(index);
                }
            }

            Action::Play => {
                if self.state.has_sequences() && self.state.mode == PlaybackMode::Idle {
                    self.state.mode = PlaybackMode::PlayAll;
                }
            }
            Action::Pause => self.state.mode = PlaybackMode::Idle,
            Action::ToggleRepeat => self.toggle_repeat(),
            Action::KeyPressed(key) => self.key_pressed(key),
            Action::MediaEnded => self.media_ended(),
            Action::TimeUpdated { seconds } => {
                self.state.current_frame = frames::frame_at(seconds, self.state.fps);
            }
            Action::MetadataLoaded { duration_secs } => {
                self.state.total_frames = frames::total_frames(duration_secs, self.state.fps);
            }
            Action::SeekFrame(frame) => self.seek_frame(frame),

            Action::CorrectLabel { label, now } => self.correct(label, now),
            Action::HistoryLoaded { annotator, result } => self.history_loaded(annotator, result),
            Action::HistoryPersisted {
                annotator,
                local_id,
                result,
            } => self.history_persisted(annotator, local_id, result),
            Action::ToggleHistoryRow(id) => {
                self.state.expanded_history = if self.state.expanded_history == Some(id) {
                    None
                } else {
                    Some(id)
                };
            }
            Action::JumpToHistory(id) => self.jump_to_history(id),
            Action::DeleteHistory(id) => self.delete_history(id),
            Action::HistoryDeleteFinished { id, result } => match result {
                Ok(()) => tracing::debug!(id, "History entry deleted on server"),
                Err(e) => tracing::warn!(id, error = %e, "Failed to delete history entry"),
            },
            Action::HighlightExpired(token) => {
                if self.state.highlight == Some(token) {
                    self.state.highlight = None;
                }
            }
        }
    }

    // ---- session ----

    fn users_loaded(&mut self, result: Result<Vec<User>, String>) {
        match result {
            Ok(users) => self.state.users = users,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load users");
                self.state.load_error = Some(format!("Failed to load users: {e}"));
            }
        }
    }

    fn login_finished(&mut self, username: String, result: Result<(), String>) {
        match result {
            Ok(()) => {
                tracing::info!(%username, "Logged in");
                self.state.session = Some(username.clone());
                self.state.login_error = None;
                self.state.password_status = None;
                self.effects.push(Effect::LoadPatients);
                self.effects.push(Effect::LoadHistory {
                    annotator: username,
                });
            }
            Err(e) => {
                tracing::info!(%username, error = %e, "Login rejected");
                self.state.login_error = Some(e);
            }
        }
    }

    fn logout(&mut self) {
        let fresh = AppState::with_settings(self.state.fps, self.state.stale_responses);
        let previous = std::mem::replace(&mut self.state, fresh);
        if let Some(user) = &previous.session {
            tracing::info!(username = %user, "Logged out");
        }
        // Kept so late responses and acks from the old session still resolve.
        self.state.users = previous.users;
        self.state.latest_videos_request = previous.latest_videos_request;
        self.state.next_highlight = previous.next_highlight;
        self.state.pending_posts = previous.pending_posts;
        self.state.cancelled_posts = previous.cancelled_posts;
    }

    fn change_password(&mut self, old_password: String, new_password: String) {
        let Some(username) = self.state.session.clone() else {
            return;
        };
        self.state.password_status = Some(PasswordStatus::Pending);
        self.effects.push(Effect::ChangePassword {
            username,
            old_password,
            new_password,
        });
    }

    // ---- library ----

    fn patients_loaded(&mut self, result: Result<Vec<Patient>, String>) {
        if self.state.session.is_none() {
            return;
        }
        match result {
            Ok(patients) => {
                let first = patients.first().map(|p| p.patient_id.clone());
                self.state.patients = patients;
                if let (None, Some(first)) = (&self.state.selected_patient, first) {
                    self.select(first, Label::HLus);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load patients");
                self.state.load_error = Some(format!("Failed to load patients: {e}"));
            }
        }
    }

    /// Select a (patient, class) pair and request its sequence list.
    fn select(&mut self, patient_id: String, class: Label) {
        self.state.selected_patient = Some(patient_id.clone());
        self.state.selected_class = class;
        self.reset_playback();

        self.state.latest_videos_request += 1;
        self.effects.push(Effect::LoadVideos {
            request: self.state.latest_videos_request,
            patient_id,
            class,
        });
    }

    fn videos_loaded(
        &mut self,
        request: u64,
        patient_id: String,
        class: Label,
        result: Result<Vec<VideoFile>, String>,
    ) {
        if self.state.session.is_none() {
            return;
        }
        if request != self.state.latest_videos_request {
            match self.state.stale_responses {
                StaleResponsePolicy::Discard => {
                    tracing::debug!(request, %patient_id, %class, "Dropping stale sequence list");
                    return;
                }
                StaleResponsePolicy::Accept => {
                    tracing::debug!(request, %patient_id, %class, "Applying out-of-order sequence list");
                }
            }
        }

        let pending_jump = self.state.pending_jump.take();
        let files = match result {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(%patient_id, %class, error = %e, "Failed to load sequences");
                self.state.load_error = Some(format!("Failed to load sequences: {e}"));
                return;
            }
        };

        self.state.sequences = Sequence::from_files(class, files);
        self.state.loaded = Some((patient_id, class));
        self.rehydrate_all();
        self.reset_playback();
        self.state.index = 0;

        if let Some(target) = pending_jump {
            if self.state.has_sequences() {
                let last = self.state.sequences.len() - 1;
                self.state.index = (target.saturating_sub(1) as usize).min(last);
                self.raise_highlight();
            }
        }
    }

    fn go_to(&mut self, index: usize) {
        if index >= self.state.sequences.len() {
            return;
        }
        self.state.index = index;
        self.reset_playback();
    }

    /// Force idle and rewind to the start of the current media.
    fn reset_playback(&mut self) {
        self.state.mode = PlaybackMode::Idle;
        self.state.current_frame = 0;
        self.state.total_frames = None;
        self.effects.push(Effect::Seek { seconds: 0.0 });
    }

    fn raise_highlight(&mut self) {
        self.state.next_highlight += 1;
        let token = self.state.next_highlight;
        self.state.highlight = Some(token);
        self.effects.push(Effect::ScheduleHighlightClear {
            token,
            after: HIGHLIGHT_DURATION,
        });
    }

    // ---- playback ----

    fn key_pressed(&mut self, key: Key) {
        if !self.state.has_sequences() {
            return;
        }
        match key {
            Key::Space => {
                self.state.mode = match self.state.mode {
                    PlaybackMode::Idle => PlaybackMode::PlayAll,
                    PlaybackMode::PlayAll | PlaybackMode::Repeat => PlaybackMode::Idle,
                };
            }
            Key::Repeat => self.toggle_repeat(),
            Key::Other => {}
        }
    }

    /// Shared by the Repeat control and the `r` key.
    fn toggle_repeat(&mut self) {
        if !self.state.has_sequences() {
            return;
        }
        self.state.mode = match self.state.mode {
            PlaybackMode::Idle => PlaybackMode::Repeat,
            PlaybackMode::Repeat => PlaybackMode::Idle,
            // Locked while playing all.
            PlaybackMode::PlayAll => PlaybackMode::PlayAll,
        };
    }

    fn media_ended(&mut self) {
        match self.state.mode {
            PlaybackMode::Idle => {}
            PlaybackMode::PlayAll => {
                if self.state.index + 1 < self.state.sequences.len() {
                    self.state.index += 1;
                    self.state.current_frame = 0;
                    self.state.total_frames = None;
                } else {
                    self.state.mode = PlaybackMode::Idle;
                }
            }
            PlaybackMode::Repeat => {
                self.state.current_frame = 0;
                self.effects.push(Effect::Seek { seconds: 0.0 });
            }
        }
    }

    fn seek_frame(&mut self, frame: u32) {
        if !self.state.has_sequences() {
            return;
        }
        let frame = match self.state.total_frames {
            Some(total) => frame.min(total),
            None => frame,
        };
        self.state.current_frame = frame;
        self.effects.push(Effect::Seek {
            seconds: frames::seconds_for_frame(frame, self.state.fps),
        });
    }

    // ---- corrections ----

    fn correct(&mut self, label: Label, now: Timestamp) {
        if self.state.mode != PlaybackMode::Idle {
            return;
        }
        let Some(annotator) = self.state.session.clone() else {
            return;
        };
        let Some((patient_id, class)) = self.state.loaded.clone() else {
            return;
        };
        let index = self.state.index;
        let Some(sequence) = self.state.sequences.get_mut(index) else {
            return;
        };

        let previous = sequence.effective_label(&annotator);
        if previous == label {
            return;
        }
        if !previous.can_transition_to(label) {
            tracing::debug!(%previous, updated = %label, "Ignoring invalid correction");
            return;
        }

        sequence.user_corrections.insert(annotator.clone(), label);
        let code = sequence.code();
        let original_class = sequence.original_label;

        let local_id = self.local_id(&annotator, now);
        self.state.pending_posts.insert(local_id);
        let entry = HistoryEntry {
            id: local_id,
            patient_id: patient_id.clone(),
            sequence_id: code.display_id(&patient_id),
            previous_label: previous,
            updated_label: label,
            annotator: annotator.clone(),
            timestamp: now,
            class,
            sequence_number: code.number,
            original_class,
        };
        self.state
            .histories
            .entry(annotator.clone())
            .or_default()
            .insert(0, entry);

        tracing::info!(
            %annotator,
            %patient_id,
            sequence_id = %code,
            %previous,
            updated = %label,
            "Label corrected"
        );

        self.effects.push(Effect::PostHistory {
            annotator: annotator.clone(),
            local_id,
            entry: NewHistoryEntry {
                patient_id,
                sequence_id: code.raw(),
                previous_label: previous,
                updated_label: label,
                annotator,
            },
        });
    }

    /// Millisecond timestamp, bumped until unique within the user's history.
    fn local_id(&self, annotator: &str, now: Timestamp) -> DbId {
        let taken = |id: DbId| {
            self.state.pending_posts.contains(&id)
                || self
                    .state
                    .histories
                    .get(annotator)
                    .is_some_and(|h| h.iter().any(|e| e.id == id))
        };
        let mut id = now.timestamp_millis();
        while taken(id) {
            id += 1;
        }
        id
    }

    fn history_loaded(&mut self, annotator: String, result: Result<Vec<HistoryRecord>, String>) {
        if self.state.session.is_none() {
            return;
        }
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(%annotator, error = %e, "Failed to load history");
                return;
            }
        };

        // Optimistic entries the server has not acknowledged yet stay on top.
        let pending = &self.state.pending_posts;
        let mut entries: Vec<HistoryEntry> = self
            .state
            .histories
            .get(&annotator)
            .map(|h| h.iter().filter(|e| pending.contains(&e.id)).cloned().collect())
            .unwrap_or_default();
        entries.extend(records.into_iter().filter_map(HistoryEntry::from_record));

        tracing::debug!(%annotator, count = entries.len(), "History loaded");
        self.state.histories.insert(annotator, entries);
        self.rehydrate_all();
    }

    fn history_persisted(
        &mut self,
        annotator: String,
        local_id: DbId,
        result: Result<HistoryRecord, String>,
    ) {
        self.state.pending_posts.remove(&local_id);
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(%annotator, local_id, error = %e, "Failed to persist history entry");
                self.state.cancelled_posts.remove(&local_id);
                return;
            }
        };

        if self.state.cancelled_posts.remove(&local_id) {
            // Deleted locally while the POST was in flight.
            self.effects.push(Effect::DeleteHistory { id: record.id });
            return;
        }

        let entry = self
            .state
            .histories
            .get_mut(&annotator)
            .and_then(|h| h.iter_mut().find(|e| e.id == local_id));
        if let Some(entry) = entry {
            entry.id = record.id;
            entry.timestamp = record.timestamp;
            if self.state.expanded_history == Some(local_id) {
                self.state.expanded_history = Some(record.id);
            }
        }
    }

    fn jump_to_history(&mut self, id: DbId) {
        let Some(entry) = self.state.user_history().iter().find(|e| e.id == id).cloned() else {
            return;
        };
        self.select(entry.patient_id, entry.class);
        self.state.pending_jump = Some(entry.sequence_number);
    }

    fn delete_history(&mut self, id: DbId) {
        let Some(annotator) = self.state.session.clone() else {
            return;
        };
        let Some(history) = self.state.histories.get_mut(&annotator) else {
            return;
        };
        let Some(position) = history.iter().position(|e| e.id == id) else {
            return;
        };
        let entry = history.remove(position);

        // An older correction of the same sequence takes over again.
        if let Some((patient_id, class)) = &self.state.loaded {
            if entry.belongs_to(patient_id, *class) {
                self.rehydrate_all();
            }
        }
        if self.state.expanded_history == Some(id) {
            self.state.expanded_history = None;
        }

        if self.state.pending_posts.remove(&id) {
            self.state.cancelled_posts.insert(id);
        } else {
            self.effects.push(Effect::DeleteHistory { id });
        }
    }

    /// Rebuild every annotator's overrides on the loaded list from their
    /// history, oldest entry first.
    fn rehydrate_all(&mut self) {
        let Some((patient_id, class)) = self.state.loaded.clone() else {
            return;
        };
        for seq in &mut self.state.sequences {
            seq.user_corrections.clear();
        }
        for (annotator, history) in &self.state.histories {
            for entry in history.iter().rev() {
                if !entry.belongs_to(&patient_id, class) {
                    continue;
                }
                if let Some(seq) = self
                    .state
                    .sequences
                    .iter_mut()
                    .find(|s| s.id == entry.sequence_number)
                {
                    seq.user_corrections
                        .insert(annotator.clone(), entry.updated_label);
                }
            }
        }
    }
}

/// Convenience for callers that correct with the wall clock.
pub fn correct_now(label: Label) -> Action {
    Action::CorrectLabel {
        label,
        now: Utc::now(),
    }
}
