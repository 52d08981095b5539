//! Frame requests and keyed one-shot timers.
//!
//! The host drives time: it calls `Session::pump` with a [`FrameStamp`] and the
//! scheduler only records what should happen next. Nothing here sleeps.
//!
//! [`FrameStamp`]: wopr_types::FrameStamp

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Load the next code and start again after a completed cycle.
    CycleAdvance,
    /// Turn the solved blink off.
    BlinkRevert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    kind: TimerKind,
    due: Duration,
}

/// At most one pending frame and at most one timer per [`TimerKind`].
#[derive(Debug, Default)]
pub struct Scheduler {
    frame_requested: bool,
    timers: Vec<Timer>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    pub fn cancel_frame(&mut self) {
        self.frame_requested = false;
    }

    /// Consume the pending frame request.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.frame_requested
    }

    /// Arm `kind` at `due`, replacing any timer of the same kind.
    pub fn schedule(&mut self, kind: TimerKind, due: Duration) {
        self.cancel(kind);
        self.timers.push(Timer { kind, due });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers.retain(|timer| timer.kind != kind);
    }

    /// Drop the frame request and every timer.
    pub fn clear(&mut self) {
        self.frame_requested = false;
        self.timers.clear();
    }

    /// Remove and return the timers due at `now`, earliest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<TimerKind> {
        let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|timer| timer.due <= now);
        self.timers = pending;
        due.sort_by_key(|timer| timer.due);
        due.into_iter().map(|timer| timer.kind).collect()
    }

    #[must_use]
    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|timer| timer.kind == kind)
    }

    /// Deadline of `kind`, if armed.
    #[must_use]
    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.timers
            .iter()
            .find(|timer| timer.kind == kind)
            .map(|timer| timer.due)
    }

    /// Earliest armed deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }
}
