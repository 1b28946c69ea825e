//! Playback clock adapter
//!
//! Wraps the external audio position source: a periodic status callback
//! (every few hundred milliseconds) plus explicit seeks and pause/resume.
//! Between callbacks the clock estimates the instantaneous position from a
//! monotonic anchor, so engine ticks can run at any cadence without waiting
//! for the next coarse update.
//!
//! The clock is read-only from the engine's point of view: the engine never
//! mutates playback, it only snapshots the position.

use std::time::Instant;

use crate::types::PlaybackState;

#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Last reported (or frozen) position in milliseconds
    position_ms: u64,
    duration_ms: u64,
    playing: bool,
    /// Monotonic instant at which `position_ms` was last anchored; set only
    /// while playing
    anchor: Option<Instant>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            playing: false,
            anchor: None,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track duration in milliseconds; 0 disables clamping (unknown length).
    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.position_ms = self.clamp(self.position_ms);
    }

    /// Periodic status callback from the audio backend. Re-anchors the
    /// estimate; a stale estimate is always superseded by a report.
    pub fn update_position_ms(&mut self, position_ms: u64) {
        self.position_ms = self.clamp(position_ms);
        self.anchor = self.playing.then(Instant::now);
    }

    /// Discontinuous jump, forward or backward. Identical to a position
    /// report: downstream resolution is a pure function of the instant, so
    /// seeks need no special handling.
    pub fn seek_ms(&mut self, position_ms: u64) {
        self.update_position_ms(position_ms);
    }

    pub fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.anchor = Some(Instant::now());
        }
    }

    /// Freeze the estimated position and stop advancing.
    pub fn pause(&mut self) {
        if self.playing {
            self.position_ms = self.position_at(Instant::now());
            self.playing = false;
            self.anchor = None;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Estimated instantaneous position: the last report plus elapsed wall
    /// time while playing, clamped to the track duration.
    pub fn position_ms(&self) -> u64 {
        self.position_at(Instant::now())
    }

    /// Immutable snapshot for one engine evaluation.
    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            position_ms: self.position_ms(),
            duration_ms: self.duration_ms,
            playing: self.playing,
        }
    }

    fn position_at(&self, now: Instant) -> u64 {
        let estimated = match (self.playing, self.anchor) {
            (true, Some(anchor)) => {
                let elapsed = now.saturating_duration_since(anchor).as_millis() as u64;
                self.position_ms.saturating_add(elapsed)
            }
            _ => self.position_ms,
        };
        self.clamp(estimated)
    }

    fn clamp(&self, position_ms: u64) -> u64 {
        if self.duration_ms > 0 {
            position_ms.min(self.duration_ms)
        } else {
            position_ms
        }
    }
}
