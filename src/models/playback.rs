// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shared playback clock.
//!
//! One clock drives every feed so they stay on the same timestamp. The
//! clock also records each paused-to-playing transition as a one-shot
//! event; views use it to recapture their display geometry.

/// Playback position and state shared across feeds.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    position: f64,
    playing: bool,
    started: bool,
    duration: Option<f64>,
    play_event: bool,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once playback has been started at least once.
    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = Some(seconds.max(0.0));
    }

    /// Start playback. Restarts from the beginning when the clock sits at
    /// the end. Fires the play event on every paused-to-playing
    /// transition.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        if let Some(duration) = self.duration {
            if self.position >= duration {
                self.position = 0.0;
            }
        }
        self.playing = true;
        self.started = true;
        self.play_event = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to an absolute position, clamped to the valid range.
    pub fn seek(&mut self, seconds: f64) {
        let mut position = seconds.max(0.0);
        if let Some(duration) = self.duration {
            position = position.min(duration);
        }
        self.position = position;
    }

    /// Move the clock forward by one frame's wall time. Pauses at the end
    /// of the media.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.position += dt.max(0.0) as f64;
        if let Some(duration) = self.duration {
            if self.position >= duration {
                self.position = duration;
                self.playing = false;
            }
        }
    }

    /// Consume the pending play event, if any.
    pub fn take_play_event(&mut self) -> bool {
        std::mem::take(&mut self.play_event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_event_fires_on_every_transition() {
        let mut clock = PlaybackClock::new();
        assert!(!clock.take_play_event());

        clock.play();
        assert!(clock.take_play_event());
        assert!(!clock.take_play_event());

        // Playing again without pausing is not a transition.
        clock.play();
        assert!(!clock.take_play_event());

        clock.pause();
        clock.play();
        assert!(clock.take_play_event());
    }

    #[test]
    fn test_advance_only_while_playing() {
        let mut clock = PlaybackClock::new();
        clock.advance(0.5);
        assert_eq!(clock.position(), 0.0);

        clock.play();
        clock.advance(0.5);
        assert_eq!(clock.position(), 0.5);

        clock.pause();
        clock.advance(0.5);
        assert_eq!(clock.position(), 0.5);
    }

    #[test]
    fn test_advance_pauses_at_end() {
        let mut clock = PlaybackClock::new();
        clock.set_duration(1.0);
        clock.play();
        clock.advance(2.0);
        assert_eq!(clock.position(), 1.0);
        assert!(!clock.is_playing());
        assert!(clock.has_started());
    }

    #[test]
    fn test_play_at_end_restarts() {
        let mut clock = PlaybackClock::new();
        clock.set_duration(1.0);
        clock.play();
        clock.advance(2.0);
        assert!(!clock.is_playing());

        clock.play();
        assert_eq!(clock.position(), 0.0);
        assert!(clock.is_playing());
    }

    #[test]
    fn test_seek_clamps() {
        let mut clock = PlaybackClock::new();
        clock.set_duration(10.0);
        clock.seek(-5.0);
        assert_eq!(clock.position(), 0.0);
        clock.seek(99.0);
        assert_eq!(clock.position(), 10.0);
        clock.seek(4.25);
        assert_eq!(clock.position(), 4.25);
    }
}
