//! Video playback surface.
//!
//! [`PlaybackSurface`] drives a registered [`MediaElement`] from two inputs,
//! the playing flag and the source URL, and turns element events back into
//! controller actions. It is the only place that talks to the element.

use crate::action::Action;
use crate::error::PlaybackError;
use crate::state::AppState;

/// The native media handle (e.g. an HTML video element).
pub trait MediaElement {
    fn set_source(&mut self, url: &str);
    /// Start playback. May be refused by an autoplay policy.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
}

/// Keeps a media element in step with the controller.
#[derive(Debug)]
pub struct PlaybackSurface<M> {
    element: Option<M>,
    playing: bool,
    source: Option<String>,
    /// Whether the next end of media should be reported.
    ended_armed: bool,
}

impl<M> Default for PlaybackSurface<M> {
    fn default() -> Self {
        Self {
            element: None,
            playing: false,
            source: None,
            ended_armed: true,
        }
    }
}

impl<M: MediaElement> PlaybackSurface<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the element on mount and bring it up to date.
    pub fn register(&mut self, mut element: M) {
        if let Some(url) = &self.source {
            element.set_source(url);
        }
        self.element = Some(element);
        self.ended_armed = true;
        self.apply_playing();
    }

    /// Detach the element on unmount.
    pub fn unregister(&mut self) -> Option<M> {
        self.element.take()
    }

    pub fn element(&self) -> Option<&M> {
        self.element.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Apply the inputs derived from the controller state.
    pub fn sync_state(&mut self, state: &AppState) {
        let url = state.current_sequence().map(|s| s.video_url.as_str());
        self.sync(state.is_playing(), url);
    }

    /// Match the element to `playing` and `url`. Does nothing when neither
    /// changed.
    pub fn sync(&mut self, playing: bool, url: Option<&str>) {
        let source_changed = self.source.as_deref() != url;
        if !source_changed && playing == self.playing {
            return;
        }

        if source_changed {
            self.source = url.map(str::to_string);
            self.ended_armed = true;
            if let (Some(element), Some(url)) = (self.element.as_mut(), url) {
                element.set_source(url);
            }
        }
        self.playing = playing;
        self.apply_playing();
    }

    /// Move to `seconds` and keep playing if the flag is set.
    pub fn seek(&mut self, seconds: f64) {
        self.ended_armed = true;
        if let Some(element) = self.element.as_mut() {
            element.seek(seconds);
        }
        if self.playing {
            self.apply_playing();
        }
    }

    /// The element reached the end of media. Reported once per playback.
    pub fn on_ended(&mut self) -> Option<Action> {
        if !self.ended_armed {
            return None;
        }
        self.ended_armed = false;
        Some(Action::MediaEnded)
    }

    pub fn on_time_update(&self, seconds: f64) -> Action {
        Action::TimeUpdated { seconds }
    }

    pub fn on_metadata(&self, duration_secs: f64) -> Action {
        Action::MetadataLoaded { duration_secs }
    }

    fn apply_playing(&mut self) {
        let Some(element) = self.element.as_mut() else {
            return;
        };
        if self.source.is_none() {
            element.pause();
            return;
        }
        if self.playing {
            self.ended_armed = true;
            if let Err(e) = element.play() {
                // Stays paused until the next user gesture.
                tracing::debug!(error = %e, "Media element refused to play");
            }
        } else {
            element.pause();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call made on it.
    #[derive(Debug, Default)]
    struct FakeElement {
        calls: Vec<String>,
        refuse_play: bool,
    }

    impl MediaElement for FakeElement {
        fn set_source(&mut self, url: &str) {
            self.calls.push(format!("source {url}"));
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.calls.push("play".into());
            if self.refuse_play {
                Err(PlaybackError::Rejected("autoplay blocked".into()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.calls.push("pause".into());
        }

        fn seek(&mut self, seconds: f64) {
            self.calls.push(format!("seek {seconds}"));
        }
    }

    fn calls(surface: &PlaybackSurface<FakeElement>) -> Vec<String> {
        surface.element().map(|e| e.calls.clone()).unwrap_or_default()
    }

    #[test]
    fn test_sync_plays_and_pauses() {
        let mut surface = PlaybackSurface::new();
        surface.register(FakeElement::default());
        surface.sync(false, Some("a.mp4"));
        surface.sync(true, Some("a.mp4"));
        surface.sync(true, Some("a.mp4"));
        surface.sync(false, Some("a.mp4"));
        assert_eq!(
            calls(&surface),
            vec!["pause", "source a.mp4", "pause", "play", "pause"]
        );
    }

    #[test]
    fn test_source_change_while_playing_restarts() {
        let mut surface = PlaybackSurface::new();
        surface.register(FakeElement::default());
        surface.sync(true, Some("a.mp4"));
        surface.sync(true, Some("b.mp4"));
        let calls = calls(&surface);
        assert_eq!(&calls[calls.len() - 2..], &["source b.mp4", "play"]);
    }

    #[test]
    fn test_rejected_play_is_tolerated() {
        let mut surface = PlaybackSurface::new();
        surface.register(FakeElement {
            refuse_play: true,
            ..Default::default()
        });
        surface.sync(true, Some("a.mp4"));
        assert!(surface.is_playing());
        assert_eq!(calls(&surface).last().map(String::as_str), Some("play"));
    }

    #[test]
    fn test_ended_reported_once_per_playback() {
        let mut surface = PlaybackSurface::<FakeElement>::new();
        surface.register(FakeElement::default());
        surface.sync(true, Some("a.mp4"));
        assert_eq!(surface.on_ended(), Some(Action::MediaEnded));
        assert_eq!(surface.on_ended(), None);

        surface.seek(0.0);
        assert_eq!(surface.on_ended(), Some(Action::MediaEnded));

        surface.sync(true, Some("b.mp4"));
        assert_eq!(surface.on_ended(), Some(Action::MediaEnded));
    }

    #[test]
    fn test_seek_keeps_playing() {
        let mut surface = PlaybackSurface::new();
        surface.register(FakeElement::default());
        surface.sync(true, Some("a.mp4"));
        surface.seek(0.0);
        let calls = calls(&surface);
        assert_eq!(&calls[calls.len() - 2..], &["seek 0", "play"]);
    }

    #[test]
    fn test_register_applies_current_inputs() {
        let mut surface = PlaybackSurface::new();
        surface.sync(true, Some("a.mp4"));
        surface.register(FakeElement::default());
        assert_eq!(calls(&surface), vec!["source a.mp4", "play"]);
        assert!(surface.unregister().is_some());
        assert!(surface.element().is_none());
    }

    #[test]
    fn test_sync_state_follows_controller() {
        use crate::config::ClientConfig;
        use crate::state::{PlaybackMode, Sequence};
        use lus_core::label::Label;
        use lus_core::wire::VideoFile;

        let mut state = AppState::new(&ClientConfig::default());
        state.sequences = Sequence::from_files(
            Label::HLus,
            ["a.mp4", "b.mp4"]
                .into_iter()
                .map(|name| VideoFile {
                    file_name: name.into(),
                    url: format!("http://host/{name}"),
                })
                .collect(),
        );

        let mut surface = PlaybackSurface::new();
        surface.register(FakeElement::default());
        surface.sync_state(&state);
        assert!(!surface.is_playing());

        state.index = 1;
        state.mode = PlaybackMode::Repeat;
        surface.sync_state(&state);
        let calls = calls(&surface);
        assert_eq!(&calls[calls.len() - 2..], &["source http://host/b.mp4", "play"]);
    }

    #[test]
    fn test_events_map_to_actions() {
        let surface = PlaybackSurface::<FakeElement>::new();
        assert_eq!(
            surface.on_time_update(1.5),
            Action::TimeUpdated { seconds: 1.5 }
        );
        assert_eq!(
            surface.on_metadata(4.0),
            Action::MetadataLoaded { duration_secs: 4.0 }
        );
    }
}
