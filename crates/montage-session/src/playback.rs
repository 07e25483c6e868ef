//! Playback clock for real-time preview.

use std::time::Instant;

use tracing::debug;

/// Monotonically advancing cursor over `[0, project_duration)`.
///
/// `tick` measures wall-clock time between calls; the arithmetic lives in
/// `advance` so tests can drive the clock deterministically. Reaching the
/// end stops playback and resets the cursor to zero.
#[derive(Debug, Default)]
pub struct PlaybackClock {
    position: f64,
    playing: bool,
    last_tick: Option<Instant>,
}

impl PlaybackClock {
    /// Create a stopped clock at position zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Whether the cursor is advancing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start playback. The next tick measures from this call.
    pub fn play(&mut self) {
        self.playing = true;
        self.last_tick = Some(Instant::now());
    }

    /// Pause playback, keeping the cursor where it is.
    pub fn pause(&mut self) {
        self.playing = false;
        self.last_tick = None;
    }

    /// Advance by the measured wall-clock delta since the previous tick.
    pub fn tick(&mut self, project_duration: f64) {
        if !self.playing {
            return;
        }
        let now = Instant::now();
        let delta = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.advance(delta, project_duration);
    }

    /// Advance the cursor by `delta` seconds while playing.
    pub fn advance(&mut self, delta: f64, project_duration: f64) {
        if !self.playing {
            return;
        }
        self.position += delta.max(0.0);
        if self.position >= project_duration {
            debug!(duration = project_duration, "Playback reached project end");
            self.playing = false;
            self.position = 0.0;
            self.last_tick = None;
        }
    }

    /// Position the cursor directly. Always permitted, in any play state.
    pub fn scrub(&mut self, seconds: f64, project_duration: f64) {
        self.position = seconds.clamp(0.0, project_duration);
    }
}
