//! Core domain types for the WOPR decryptor.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies:
//! code template compilation, lock ordering, the progress clock, HUD formatting,
//! audio cue descriptors and engine events.

mod cue;
mod event;
mod hud;
mod lock_order;
mod progress;
mod template;

pub use cue::{Cue, CueKind, CueVoice, ParseWaveformError, Waveform};
pub use event::{DecryptEvent, EventKind};
pub use hud::{
    HudSnapshot, ProbabilityRange, bar_percent, checksum, format_probability, format_ticks,
};
pub use lock_order::{Direction, LockOrder, ParseDirectionError};
pub use progress::{FrameStamp, ProgressClock, TimingMode, normalized_progress};
pub use template::{CodeTemplate, PLACEHOLDER};
