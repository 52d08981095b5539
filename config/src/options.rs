//! Partial options as written by users: every field optional.
//!
//! ```toml
//! codes = ["CPE-1704-TKS", "JOSHUA-5"]
//! charset = "ABCDEF0123456789"
//! direction = "random"
//! cycles = 3
//!
//! [timing]
//! duration_ms = 8000
//! tick_interval = 60
//! end_date_time = "2026-12-31T23:59:59Z"
//!
//! [audio]
//! enabled = false
//!
//! [ui]
//! title = "TARGET: LAUNCH CODES"
//! blink_on_solved = true
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use wopr_types::{Direction, Waveform};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    pub codes: Option<Vec<String>>,
    pub charset: Option<String>,
    pub direction: Option<Direction>,
    /// `0` cycles forever.
    pub cycles: Option<u32>,
    /// Named color overrides, e.g. `fg = "#33ff66"`.
    pub colors: Option<BTreeMap<String, String>>,
    pub timing: Option<TimingOptions>,
    pub audio: Option<AudioOptions>,
    pub probability: Option<ProbabilityOptions>,
    pub stream: Option<StreamOptions>,
    pub ui: Option<UiOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingOptions {
    /// Zero or negative completes on the first frame.
    pub duration_ms: Option<i64>,
    pub tick_interval: Option<u64>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
}

impl TimingOptions {
    /// Absolute range pinned to the given instants.
    #[must_use]
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start_date_time: Some(start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            end_date_time: Some(end.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioOptions {
    pub enabled: Option<bool>,
    /// Master volume, `0..=1`.
    pub volume: Option<f32>,
    pub waveform: Option<Waveform>,
    pub tick_freq: Option<f32>,
    pub lock_freq_start: Option<f32>,
    pub lock_freq_step: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbabilityOptions {
    pub enabled: Option<bool>,
    pub base: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamOptions {
    pub enabled: Option<bool>,
    pub lines: Option<usize>,
    pub width: Option<usize>,
    pub prefix_cycle: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiOptions {
    pub show_header: Option<bool>,
    pub show_footer: Option<bool>,
    pub show_progress: Option<bool>,
    pub show_overlay: Option<bool>,
    pub show_background: Option<bool>,
    pub overlay_text: Option<String>,
    pub title: Option<String>,
    pub blink_on_solved: Option<bool>,
    /// Seconds; `0` blinks until the next cycle.
    pub blink_duration: Option<f64>,
    pub show_cycles: Option<bool>,
}

impl Options {
    /// Shallow merge: every top-level field present in `patch` replaces ours.
    ///
    /// Sections are replaced whole, not merged field by field; fields a patch
    /// section leaves out fall back to the defaults at resolution time.
    #[must_use]
    pub fn merge(self, patch: Options) -> Options {
        Options {
            codes: patch.codes.or(self.codes),
            charset: patch.charset.or(self.charset),
            direction: patch.direction.or(self.direction),
            cycles: patch.cycles.or(self.cycles),
            colors: patch.colors.or(self.colors),
            timing: patch.timing.or(self.timing),
            audio: patch.audio.or(self.audio),
            probability: patch.probability.or(self.probability),
            stream: patch.stream.or(self.stream),
            ui: patch.ui.or(self.ui),
        }
    }
}
