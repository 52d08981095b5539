//! Progress clock: elapsed time to a normalized `[0, 1]` completion fraction.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Timestamp handed to every frame by the host.
///
/// `monotonic` is measured from an arbitrary host epoch and drives duration
/// mode and scramble throttling; `wall` drives absolute range mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStamp {
    pub monotonic: Duration,
    pub wall: DateTime<Utc>,
}

impl FrameStamp {
    #[must_use]
    pub fn new(monotonic: Duration, wall: DateTime<Utc>) -> Self {
        Self { monotonic, wall }
    }
}

#[must_use]
pub fn normalized_progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }

    let elapsed = elapsed.as_secs_f64();
    let total = duration.as_secs_f64();
    (elapsed / total).clamp(0.0, 1.0)
}

/// How the cycle budget is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Budget measured from the first frame after `start`.
    Duration(Duration),
    /// Budget pinned to wall-clock instants. Independent of `start`/`stop`:
    /// stopping does not pause real time, so resuming later jumps forward.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Default for TimingMode {
    fn default() -> Self {
        Self::Duration(Duration::from_millis(12_000))
    }
}

#[derive(Debug, Clone)]
pub struct ProgressClock {
    mode: TimingMode,
    cycle_start: Option<Duration>,
}

impl ProgressClock {
    #[must_use]
    pub fn new(mode: TimingMode) -> Self {
        Self {
            mode,
            cycle_start: None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    /// Swap the timing mode without touching the latched cycle start.
    pub fn set_mode(&mut self, mode: TimingMode) {
        self.mode = mode;
    }

    /// Forget the cycle start; the next sample latches a new one.
    pub fn restart(&mut self) {
        self.cycle_start = None;
    }

    #[must_use]
    pub fn cycle_start(&self) -> Option<Duration> {
        self.cycle_start
    }

    /// Sample progress at `stamp`, latching the cycle start on first use.
    pub fn sample(&mut self, stamp: FrameStamp) -> f64 {
        match self.mode {
            TimingMode::Duration(duration) => {
                let start = *self.cycle_start.get_or_insert(stamp.monotonic);
                normalized_progress(stamp.monotonic.saturating_sub(start), duration)
            }
            TimingMode::Range { start, end } => range_progress(stamp.wall, start, end),
        }
    }
}

fn range_progress(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return 1.0;
    }
    let elapsed = (now - start).num_milliseconds().clamp(0, total);
    elapsed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn stamp(ms: u64, wall: DateTime<Utc>) -> FrameStamp {
        FrameStamp::new(Duration::from_millis(ms), wall)
    }

    #[test]
    fn zero_duration_is_complete() {
        assert!((normalized_progress(Duration::ZERO, Duration::ZERO) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_mode_latches_first_frame() {
        let wall = Utc::now();
        let mut clock = ProgressClock::new(TimingMode::Duration(Duration::from_millis(1000)));
        assert!(clock.sample(stamp(5_000, wall)).abs() < f64::EPSILON);
        assert_eq!(clock.cycle_start(), Some(Duration::from_millis(5_000)));
        assert!((clock.sample(stamp(5_500, wall)) - 0.5).abs() < 1e-9);
        assert!((clock.sample(stamp(9_000, wall)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restart_relatches() {
        let wall = Utc::now();
        let mut clock = ProgressClock::new(TimingMode::Duration(Duration::from_millis(1000)));
        clock.sample(stamp(0, wall));
        clock.restart();
        assert!(clock.sample(stamp(800, wall)).abs() < f64::EPSILON);
    }

    #[test]
    fn range_mode_ignores_monotonic_time() {
        let now = Utc::now();
        let mode = TimingMode::Range {
            start: now - TimeDelta::seconds(30),
            end: now + TimeDelta::seconds(30),
        };
        let mut clock = ProgressClock::new(mode);
        let progress = clock.sample(stamp(0, now));
        assert!((progress - 0.5).abs() < 1e-6);
        assert_eq!(clock.cycle_start(), None);
    }

    #[test]
    fn range_in_the_past_is_saturated() {
        let now = Utc::now();
        let mut clock = ProgressClock::new(TimingMode::Range {
            start: now - TimeDelta::hours(2),
            end: now - TimeDelta::hours(1),
        });
        assert!((clock.sample(stamp(0, now)) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn range_in_the_future_is_zero() {
        let now = Utc::now();
        let mut clock = ProgressClock::new(TimingMode::Range {
            start: now + TimeDelta::hours(1),
            end: now + TimeDelta::hours(2),
        });
        assert!(clock.sample(stamp(0, now)).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_range_is_complete() {
        let now = Utc::now();
        assert!((range_progress(now, now, now) - 1.0).abs() < f64::EPSILON);
    }
}
