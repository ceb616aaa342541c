use std::time::{Duration, Instant};

use crate::session::state::SceneFingerprint;

/// What triggered a redraw request. Each reason has its own debounce window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RedrawReason {
    /// Pan/zoom slider movement.
    Transform,
    /// Background color picker.
    BackgroundColor,
    /// Margin inputs.
    Margins,
    /// A photo, template or background finished loading, or any other discrete change.
    Immediate,
}

impl RedrawReason {
    const COUNT: usize = 4;

    pub fn debounce(self) -> Duration {
        match self {
            Self::Transform => Duration::from_millis(50),
            Self::BackgroundColor => Duration::from_millis(100),
            Self::Margins => Duration::from_millis(150),
            Self::Immediate => Duration::ZERO,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Transform => 0,
            Self::BackgroundColor => 1,
            Self::Margins => 2,
            Self::Immediate => 3,
        }
    }
}

/// Debounced, last-write-wins redraw bookkeeping.
///
/// Requests of the same reason restart that reason's window; once any window elapses a single
/// redraw covers everything requested so far, since a draw always reads the latest state. A draw
/// whose fingerprint equals the last one drawn is skipped.
#[derive(Clone, Debug, Default)]
pub struct RedrawScheduler {
    deadlines: [Option<Instant>; RedrawReason::COUNT],
    last_drawn: Option<SceneFingerprint>,
}

impl RedrawScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, reason: RedrawReason, now: Instant) {
        self.deadlines[reason.index()] = Some(now + reason.debounce());
    }

    /// Earliest time a pending request becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    pub fn is_pending(&self) -> bool {
        self.deadlines.iter().any(Option::is_some)
    }

    /// Whether a redraw is due at `now`. A due redraw consumes every pending request.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.next_deadline().is_some_and(|d| d <= now);
        if due {
            self.deadlines = [None; RedrawReason::COUNT];
        }
        due
    }

    /// Record that a scene with `fingerprint` is about to be drawn.
    ///
    /// Returns `false` when it matches what is already on screen.
    pub fn begin_draw(&mut self, fingerprint: SceneFingerprint) -> bool {
        if self.last_drawn == Some(fingerprint) {
            return false;
        }
        self.last_drawn = Some(fingerprint);
        true
    }

    /// Forget the last drawn fingerprint so the next draw always happens.
    pub fn invalidate(&mut self) {
        self.last_drawn = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/redraw.rs"]
mod tests;
