//! Core engine for the WOPR decryptor: scramble/lock state machine and session control.
//!
//! This crate has no terminal dependencies. Visuals and sound leave through the
//! [`Presenter`] and [`AudioSink`] traits; time comes in through
//! [`Session::pump`].

mod decrypt;
mod events;
mod present;
mod scheduler;
mod session;

pub use events::{EventBus, SubscriptionId};
pub use present::{AudioError, AudioSink, Presenter};
pub use scheduler::{Scheduler, TimerKind};
pub use session::{CYCLE_ADVANCE_DELAY, Session, SessionBuilder, SessionError};

pub use wopr_config::{Config, ConfigError, Options, ResolveWarning};
pub use wopr_types::{Cue, CueKind, DecryptEvent, EventKind, FrameStamp, HudSnapshot};
