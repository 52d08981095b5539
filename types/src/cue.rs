//! Audio cue descriptors. Synthesis belongs to the host's audio sink.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const TICK_CUE_DURATION: Duration = Duration::from_millis(25);
const LOCK_CUE_DURATION: Duration = Duration::from_millis(50);
const TICK_CUE_GAIN: f32 = 0.08;
const LOCK_CUE_GAIN: f32 = 0.18;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Waveform {
    Sine,
    #[default]
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid waveform '{0}'; expected one of: sine, square, sawtooth, triangle")]
pub struct ParseWaveformError(String);

impl Waveform {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Sawtooth => "sawtooth",
            Self::Triangle => "triangle",
        }
    }
}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Self::Sine),
            "square" => Ok(Self::Square),
            "sawtooth" => Ok(Self::Sawtooth),
            "triangle" => Ok(Self::Triangle),
            _ => Err(ParseWaveformError(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Waveform {
    type Error = ParseWaveformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone parameters shared by every cue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueVoice {
    pub waveform: Waveform,
    pub tick_freq: f32,
    pub lock_freq_start: f32,
    pub lock_freq_step: f32,
}

impl Default for CueVoice {
    fn default() -> Self {
        Self {
            waveform: Waveform::Square,
            tick_freq: 180.0,
            lock_freq_start: 900.0,
            lock_freq_step: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueKind {
    Tick,
    /// Lock of the slot at this rank in the lock order.
    Lock { rank: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cue {
    pub kind: CueKind,
    pub frequency_hz: f32,
    pub duration: Duration,
    pub waveform: Waveform,
    /// Per-cue gain in `[0, 1]`, applied under the master volume.
    pub gain: f32,
}

impl Cue {
    #[must_use]
    pub fn tick(voice: &CueVoice) -> Self {
        Self {
            kind: CueKind::Tick,
            frequency_hz: voice.tick_freq,
            duration: TICK_CUE_DURATION,
            waveform: voice.waveform,
            gain: TICK_CUE_GAIN,
        }
    }

    /// Lock cues rise in pitch with rank.
    #[must_use]
    pub fn lock(voice: &CueVoice, rank: usize) -> Self {
        Self {
            kind: CueKind::Lock { rank },
            frequency_hz: voice.lock_freq_start + rank as f32 * voice.lock_freq_step,
            duration: LOCK_CUE_DURATION,
            waveform: voice.waveform,
            gain: LOCK_CUE_GAIN,
        }
    }
}
