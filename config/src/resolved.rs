//! Fully resolved configuration.
//!
//! Existence of a value is the proof of its validity: empty code lists and
//! charsets have been replaced by defaults and the timing mode is settled.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use wopr_types::{CueVoice, Direction, ProbabilityRange, TimingMode, Waveform};

use crate::options::{
    AudioOptions, Options, ProbabilityOptions, StreamOptions, TimingOptions, UiOptions,
};

pub const DEFAULT_CODE: &str = "CPE-1704-TKS";
pub const DEFAULT_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const DEFAULT_DURATION: Duration = Duration::from_millis(12_000);
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(70);
/// Longest accepted solved-code blink; longer values are clamped.
pub const MAX_BLINK_DURATION: Duration = Duration::from_secs(24 * 60 * 60);
/// Upper bound for both `stream.lines` and `stream.width`.
pub const MAX_STREAM_EXTENT: usize = 256;

/// Built-in defaults. Passed explicitly to [`Options::resolve`].
pub static DEFAULTS: LazyLock<Config> = LazyLock::new(Config::builtin);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub codes: Vec<String>,
    pub charset: Vec<char>,
    pub direction: Direction,
    /// Completed cycles before halting; `0` is unbounded.
    pub cycles: u32,
    pub colors: BTreeMap<String, String>,
    pub timing: TimingConfig,
    pub audio: AudioConfig,
    pub probability: ProbabilityConfig,
    pub stream: StreamConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub mode: TimingMode,
    pub tick_interval: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
    pub voice: CueVoice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityConfig {
    pub enabled: bool,
    pub base: f64,
    pub max: f64,
}

impl ProbabilityConfig {
    /// The readout range, or `None` when the readout is disabled.
    #[must_use]
    pub fn range(&self) -> Option<ProbabilityRange> {
        self.enabled.then_some(ProbabilityRange {
            base: self.base,
            max: self.max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub enabled: bool,
    pub lines: usize,
    pub width: usize,
    pub prefix_cycle: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    pub show_header: bool,
    pub show_footer: bool,
    pub show_progress: bool,
    pub show_overlay: bool,
    pub show_background: bool,
    pub overlay_text: String,
    pub title: String,
    pub blink_on_solved: bool,
    /// `Duration::ZERO` keeps blinking until the next cycle.
    pub blink_duration: Duration,
    pub show_cycles: bool,
}

impl Config {
    fn builtin() -> Self {
        Self {
            codes: vec![DEFAULT_CODE.to_string()],
            charset: DEFAULT_CHARSET.chars().collect(),
            direction: Direction::Forward,
            cycles: 0,
            colors: BTreeMap::new(),
            timing: TimingConfig {
                mode: TimingMode::Duration(DEFAULT_DURATION),
                tick_interval: DEFAULT_TICK_INTERVAL,
            },
            audio: AudioConfig {
                enabled: true,
                volume: 0.12,
                voice: CueVoice {
                    waveform: Waveform::Square,
                    tick_freq: 180.0,
                    lock_freq_start: 900.0,
                    lock_freq_step: 12.0,
                },
            },
            probability: ProbabilityConfig {
                enabled: true,
                base: 2.3,
                max: 99.9,
            },
            stream: StreamConfig {
                enabled: true,
                lines: 20,
                width: 22,
                prefix_cycle: vec![
                    "INTCPT ".to_string(),
                    "SIGMA  ".to_string(),
                    "FRAME  ".to_string(),
                ],
            },
            ui: UiConfig {
                show_header: true,
                show_footer: true,
                show_progress: true,
                show_overlay: false,
                show_background: true,
                overlay_text: "INITIATE DECRYPTION".to_string(),
                title: "TARGET: LAUNCH CODES".to_string(),
                blink_on_solved: false,
                blink_duration: Duration::from_secs(3),
                show_cycles: true,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        DEFAULTS.clone()
    }
}

/// Recoverable problems found while resolving options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveWarning {
    #[error("{field} '{value}' is not a recognizable date; ignoring it")]
    UnparseableDate { field: &'static str, value: String },
    #[error("end_date_time must be after start_date_time, using default duration")]
    InvalidRange,
}

/// Result of [`Options::resolve`]: the config plus anything that was recovered.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Config,
    pub warnings: Vec<ResolveWarning>,
}

impl Options {
    /// Resolve against `defaults`. `now` anchors an end date given without a start.
    #[must_use]
    pub fn resolve(&self, defaults: &Config, now: DateTime<Utc>) -> Resolved {
        let mut warnings = Vec::new();

        let codes = match &self.codes {
            Some(codes) if !codes.is_empty() => codes.clone(),
            _ => defaults.codes.clone(),
        };
        let charset = match &self.charset {
            Some(charset) if !charset.is_empty() => charset.chars().collect(),
            _ => defaults.charset.clone(),
        };

        let timing = resolve_timing(
            self.timing.as_ref(),
            &defaults.timing,
            now,
            &mut warnings,
        );

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let config = Config {
            codes,
            charset,
            direction: self.direction.unwrap_or(defaults.direction),
            cycles: self.cycles.unwrap_or(defaults.cycles),
            colors: self.colors.clone().unwrap_or_else(|| defaults.colors.clone()),
            timing,
            audio: resolve_audio(self.audio.as_ref(), &defaults.audio),
            probability: resolve_probability(self.probability.as_ref(), &defaults.probability),
            stream: resolve_stream(self.stream.as_ref(), &defaults.stream),
            ui: resolve_ui(self.ui.as_ref(), &defaults.ui),
        };

        Resolved { config, warnings }
    }
}

fn resolve_timing(
    timing: Option<&TimingOptions>,
    defaults: &TimingConfig,
    now: DateTime<Utc>,
    warnings: &mut Vec<ResolveWarning>,
) -> TimingConfig {
    let Some(timing) = timing else {
        return *defaults;
    };

    let tick_interval = timing
        .tick_interval
        .map_or(defaults.tick_interval, Duration::from_millis);

    let configured = match timing.duration_ms {
        Some(ms) => TimingMode::Duration(Duration::from_millis(ms.max(0).unsigned_abs())),
        None => defaults.mode,
    };

    let start = parse_field("start_date_time", timing.start_date_time.as_deref(), warnings);
    let end = parse_field("end_date_time", timing.end_date_time.as_deref(), warnings);

    let mode = match (start, end) {
        (Some(start), Some(end)) if end > start => TimingMode::Range { start, end },
        (Some(_), Some(_)) => {
            warnings.push(ResolveWarning::InvalidRange);
            TimingMode::Duration(DEFAULT_DURATION)
        }
        (None, Some(end)) => match (end - now).to_std() {
            Ok(remaining) if !remaining.is_zero() => TimingMode::Duration(remaining),
            _ => {
                warnings.push(ResolveWarning::InvalidRange);
                TimingMode::Duration(DEFAULT_DURATION)
            }
        },
        (Some(_), None) => {
            tracing::debug!("start_date_time without end_date_time has no effect");
            configured
        }
        (None, None) => configured,
    };

    TimingConfig {
        mode,
        tick_interval,
    }
}

fn parse_field(
    field: &'static str,
    raw: Option<&str>,
    warnings: &mut Vec<ResolveWarning>,
) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_instant(raw);
    if parsed.is_none() {
        warnings.push(ResolveWarning::UnparseableDate {
            field,
            value: raw.to_string(),
        });
    }
    parsed
}

/// RFC 3339 as given; naive date-times in local time; bare dates at UTC midnight.
#[must_use]
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|local| local.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn resolve_audio(audio: Option<&AudioOptions>, defaults: &AudioConfig) -> AudioConfig {
    let Some(audio) = audio else {
        return *defaults;
    };
    AudioConfig {
        enabled: audio.enabled.unwrap_or(defaults.enabled),
        volume: audio.volume.unwrap_or(defaults.volume).clamp(0.0, 1.0),
        voice: CueVoice {
            waveform: audio.waveform.unwrap_or(defaults.voice.waveform),
            tick_freq: audio.tick_freq.unwrap_or(defaults.voice.tick_freq),
            lock_freq_start: audio
                .lock_freq_start
                .unwrap_or(defaults.voice.lock_freq_start),
            lock_freq_step: audio
                .lock_freq_step
                .unwrap_or(defaults.voice.lock_freq_step),
        },
    }
}

fn resolve_probability(
    probability: Option<&ProbabilityOptions>,
    defaults: &ProbabilityConfig,
) -> ProbabilityConfig {
    let Some(probability) = probability else {
        return *defaults;
    };
    ProbabilityConfig {
        enabled: probability.enabled.unwrap_or(defaults.enabled),
        base: probability.base.unwrap_or(defaults.base),
        max: probability.max.unwrap_or(defaults.max),
    }
}

fn resolve_stream(stream: Option<&StreamOptions>, defaults: &StreamConfig) -> StreamConfig {
    let Some(stream) = stream else {
        return defaults.clone();
    };
    StreamConfig {
        enabled: stream.enabled.unwrap_or(defaults.enabled),
        lines: stream.lines.unwrap_or(defaults.lines).min(MAX_STREAM_EXTENT),
        width: stream.width.unwrap_or(defaults.width).min(MAX_STREAM_EXTENT),
        prefix_cycle: stream
            .prefix_cycle
            .clone()
            .unwrap_or_else(|| defaults.prefix_cycle.clone()),
    }
}

fn resolve_ui(ui: Option<&UiOptions>, defaults: &UiConfig) -> UiConfig {
    let Some(ui) = ui else {
        return defaults.clone();
    };
    let blink_duration = ui
        .blink_duration
        .filter(|secs| secs.is_finite())
        .map_or(defaults.blink_duration, |secs| {
            Duration::try_from_secs_f64(secs.max(0.0))
                .map_or(MAX_BLINK_DURATION, |blink| blink.min(MAX_BLINK_DURATION))
        });
    UiConfig {
        show_header: ui.show_header.unwrap_or(defaults.show_header),
        show_footer: ui.show_footer.unwrap_or(defaults.show_footer),
        show_progress: ui.show_progress.unwrap_or(defaults.show_progress),
        show_overlay: ui.show_overlay.unwrap_or(defaults.show_overlay),
        show_background: ui.show_background.unwrap_or(defaults.show_background),
        overlay_text: ui
            .overlay_text
            .clone()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| defaults.overlay_text.clone()),
        title: ui.title.clone().unwrap_or_else(|| defaults.title.clone()),
        blink_on_solved: ui.blink_on_solved.unwrap_or(defaults.blink_on_solved),
        blink_duration,
        show_cycles: ui.show_cycles.unwrap_or(defaults.show_cycles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn resolve(options: &Options) -> Resolved {
        options.resolve(&DEFAULTS, Utc::now())
    }

    #[test]
    fn empty_options_resolve_to_defaults() {
        let resolved = resolve(&Options::default());
        assert_eq!(resolved.config, *DEFAULTS);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = &*DEFAULTS;
        assert_eq!(config.codes, vec!["CPE-1704-TKS".to_string()]);
        assert_eq!(config.charset.len(), 36);
        assert_eq!(config.direction, Direction::Forward);
        assert_eq!(config.cycles, 0);
        assert_eq!(
            config.timing.mode,
            TimingMode::Duration(Duration::from_millis(12_000))
        );
        assert_eq!(config.timing.tick_interval, Duration::from_millis(70));
        assert!(config.audio.enabled);
        assert_eq!(config.stream.lines, 20);
        assert_eq!(config.stream.width, 22);
        assert_eq!(config.ui.blink_duration, Duration::from_secs(3));
    }

    #[test]
    fn empty_codes_and_charset_fall_back() {
        let options = Options {
            codes: Some(Vec::new()),
            charset: Some(String::new()),
            ..Options::default()
        };
        let config = resolve(&options).config;
        assert_eq!(config.codes, DEFAULTS.codes);
        assert_eq!(config.charset, DEFAULTS.charset);
    }

    #[test]
    fn negative_duration_normalizes_to_zero() {
        let options = Options {
            timing: Some(TimingOptions {
                duration_ms: Some(-250),
                ..TimingOptions::default()
            }),
            ..Options::default()
        };
        let timing = resolve(&options).config.timing;
        assert_eq!(timing.mode, TimingMode::Duration(Duration::ZERO));
        assert_eq!(timing.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn valid_range_selects_range_mode() {
        let now = Utc::now();
        let start = now - TimeDelta::minutes(5);
        let end = now + TimeDelta::minutes(5);
        let options = Options {
            timing: Some(TimingOptions::range(start, end)),
            ..Options::default()
        };
        let resolved = options.resolve(&DEFAULTS, now);
        assert!(resolved.warnings.is_empty());
        match resolved.config.timing.mode {
            TimingMode::Range {
                start: got_start,
                end: got_end,
            } => {
                assert_eq!(got_start.timestamp_millis(), start.timestamp_millis());
                assert_eq!(got_end.timestamp_millis(), end.timestamp_millis());
            }
            TimingMode::Duration(_) => panic!("expected range mode"),
        }
    }

    #[test]
    fn inverted_range_warns_and_uses_default_duration() {
        let now = Utc::now();
        let options = Options {
            timing: Some(TimingOptions {
                duration_ms: Some(3000),
                ..TimingOptions::range(now, now - TimeDelta::minutes(1))
            }),
            ..Options::default()
        };
        let resolved = options.resolve(&DEFAULTS, now);
        assert_eq!(resolved.warnings, vec![ResolveWarning::InvalidRange]);
        assert_eq!(
            resolved.config.timing.mode,
            TimingMode::Duration(DEFAULT_DURATION)
        );
    }

    #[test]
    fn end_only_counts_down_from_now() {
        let now = Utc::now();
        let options = Options {
            timing: Some(TimingOptions {
                end_date_time: Some((now + TimeDelta::seconds(90)).to_rfc3339()),
                ..TimingOptions::default()
            }),
            ..Options::default()
        };
        let mode = options.resolve(&DEFAULTS, now).config.timing.mode;
        let TimingMode::Duration(remaining) = mode else {
            panic!("expected duration mode");
        };
        assert!(remaining > Duration::from_secs(89) && remaining <= Duration::from_secs(90));
    }

    #[test]
    fn end_only_in_the_past_warns() {
        let now = Utc::now();
        let options = Options {
            timing: Some(TimingOptions {
                end_date_time: Some((now - TimeDelta::seconds(1)).to_rfc3339()),
                ..TimingOptions::default()
            }),
            ..Options::default()
        };
        let resolved = options.resolve(&DEFAULTS, now);
        assert_eq!(resolved.warnings, vec![ResolveWarning::InvalidRange]);
    }

    #[test]
    fn garbage_date_is_ignored_with_warning() {
        let options = Options {
            timing: Some(TimingOptions {
                duration_ms: Some(500),
                end_date_time: Some("next tuesday".to_string()),
                ..TimingOptions::default()
            }),
            ..Options::default()
        };
        let resolved = resolve(&options);
        assert!(matches!(
            resolved.warnings.as_slice(),
            [ResolveWarning::UnparseableDate {
                field: "end_date_time",
                ..
            }]
        ));
        assert_eq!(
            resolved.config.timing.mode,
            TimingMode::Duration(Duration::from_millis(500))
        );
    }

    #[test]
    fn parse_instant_formats() {
        assert!(parse_instant("2030-01-01T00:00:00Z").is_some());
        assert!(parse_instant("2030-01-01T00:00:00+02:00").is_some());
        assert!(parse_instant("2030-01-01 12:30:00").is_some());
        assert_eq!(
            parse_instant("2030-01-01").map(|d| d.to_rfc3339()),
            Some("2030-01-01T00:00:00+00:00".to_string())
        );
        assert!(parse_instant("soon").is_none());
    }

    #[test]
    fn partial_section_fills_from_defaults() {
        let options = Options {
            ui: Some(UiOptions {
                title: Some("JOSHUA".to_string()),
                overlay_text: Some("   ".to_string()),
                blink_duration: Some(0.0),
                ..UiOptions::default()
            }),
            probability: Some(ProbabilityOptions {
                enabled: Some(false),
                ..ProbabilityOptions::default()
            }),
            ..Options::default()
        };
        let config = resolve(&options).config;
        assert_eq!(config.ui.title, "JOSHUA");
        assert_eq!(config.ui.overlay_text, DEFAULTS.ui.overlay_text);
        assert_eq!(config.ui.blink_duration, Duration::ZERO);
        assert!(config.ui.show_header);
        assert_eq!(config.probability.range(), None);
    }

    #[test]
    fn huge_blink_duration_is_clamped() {
        for secs in [1e20, f64::MAX, 90_000.0] {
            let options = Options {
                ui: Some(UiOptions {
                    blink_duration: Some(secs),
                    ..UiOptions::default()
                }),
                ..Options::default()
            };
            assert_eq!(resolve(&options).config.ui.blink_duration, MAX_BLINK_DURATION);
        }
    }

    #[test]
    fn stream_extent_is_clamped() {
        let options = Options {
            stream: Some(StreamOptions {
                lines: Some(usize::MAX),
                width: Some(i64::MAX as usize),
                ..StreamOptions::default()
            }),
            ..Options::default()
        };
        let stream = resolve(&options).config.stream;
        assert_eq!(stream.lines, MAX_STREAM_EXTENT);
        assert_eq!(stream.width, MAX_STREAM_EXTENT);

        let options = Options {
            stream: Some(StreamOptions {
                lines: Some(0),
                width: Some(12),
                ..StreamOptions::default()
            }),
            ..Options::default()
        };
        let stream = resolve(&options).config.stream;
        assert_eq!(stream.lines, 0);
        assert_eq!(stream.width, 12);
    }

    #[test]
    fn volume_is_clamped() {
        let options = Options {
            audio: Some(AudioOptions {
                volume: Some(4.0),
                ..AudioOptions::default()
            }),
            ..Options::default()
        };
        assert!((resolve(&options).config.audio.volume - 1.0).abs() < f32::EPSILON);
    }
}
