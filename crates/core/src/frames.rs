//! Playback time to frame index conversion.
//!
//! Video elements only report time in seconds, so frame indices are derived
//! from an assumed frame rate. The mapping is best effort: seeking to
//! `frame / fps` does not guarantee landing on that exact frame.

/// Frame rate assumed when none is configured.
pub const DEFAULT_FPS: f64 = 30.0;

/// Frame index displayed for a playback position.
#[inline]
pub fn frame_at(seconds: f64, fps: f64) -> u32 {
    if !seconds.is_finite() || seconds <= 0.0 || fps <= 0.0 {
        return 0;
    }
    (seconds * fps).floor() as u32
}

/// Seek target in seconds for a requested frame.
#[inline]
pub fn seconds_for_frame(frame: u32, fps: f64) -> f64 {
    if fps <= 0.0 {
        return 0.0;
    }
    f64::from(frame) / fps
}

/// Total frame count for a media duration, once known.
#[inline]
pub fn total_frames(duration_secs: f64, fps: f64) -> Option<u32> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 || fps <= 0.0 {
        return None;
    }
    Some((duration_secs * fps).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_at_floors() {
        assert_eq!(frame_at(0.0, 30.0), 0);
        assert_eq!(frame_at(1.0, 30.0), 30);
        assert_eq!(frame_at(1.049, 30.0), 31);
        assert_eq!(frame_at(0.5, 25.0), 12);
    }

    #[test]
    fn test_frame_at_guards_bad_input() {
        assert_eq!(frame_at(-1.0, 30.0), 0);
        assert_eq!(frame_at(f64::NAN, 30.0), 0);
        assert_eq!(frame_at(2.0, 0.0), 0);
    }

    #[test]
    fn test_seconds_for_frame() {
        assert_eq!(seconds_for_frame(0, 30.0), 0.0);
        assert_eq!(seconds_for_frame(60, 30.0), 2.0);
        assert_eq!(seconds_for_frame(5, 0.0), 0.0);
    }

    #[test]
    fn test_total_frames() {
        assert_eq!(total_frames(2.0, 30.0), Some(60));
        assert_eq!(total_frames(1.999, 30.0), Some(60));
        assert_eq!(total_frames(f64::INFINITY, 30.0), None);
        assert_eq!(total_frames(0.0, 30.0), None);
    }
}
