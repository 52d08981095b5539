//! Command-line flags, layered over the config file.

use std::path::PathBuf;

use clap::Parser;

use wopr_config::{AudioOptions, Options, TimingOptions, UiOptions};
use wopr_types::Direction;

#[derive(Debug, Parser)]
#[command(name = "wopr")]
#[command(about = "WOPR // DECRYPTION ROUTINE: resolve launch codes one digit at a time")]
#[command(version)]
pub struct Cli {
    /// Target code; repeat to cycle through several
    #[arg(long = "code", value_name = "CODE")]
    pub codes: Vec<String>,

    /// Characters drawn while scrambling
    #[arg(long)]
    pub charset: Option<String>,

    /// Lock order: forward (ltr), reverse (rtl) or random
    #[arg(long)]
    pub direction: Option<Direction>,

    /// Completed cycles before halting; 0 cycles forever
    #[arg(long)]
    pub cycles: Option<u32>,

    /// Time to resolve one code, in milliseconds
    #[arg(long, allow_negative_numbers = true)]
    pub duration_ms: Option<i64>,

    /// Milliseconds between scramble ticks
    #[arg(long)]
    pub tick_interval: Option<u64>,

    /// Absolute start instant (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Absolute end instant; alone, counts down from now
    #[arg(long)]
    pub end: Option<String>,

    /// Config file instead of ~/.wopr/config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable the terminal bell
    #[arg(long)]
    pub mute: bool,

    /// Wait behind the start overlay until Enter
    #[arg(long)]
    pub overlay: bool,
}

impl Cli {
    /// Patch `base` with every flag that was given, field by field.
    #[must_use]
    pub fn apply(&self, mut base: Options) -> Options {
        if !self.codes.is_empty() {
            base.codes = Some(self.codes.clone());
        }
        if let Some(charset) = &self.charset {
            base.charset = Some(charset.clone());
        }
        base.direction = self.direction.or(base.direction);
        base.cycles = self.cycles.or(base.cycles);

        if self.duration_ms.is_some()
            || self.tick_interval.is_some()
            || self.start.is_some()
            || self.end.is_some()
        {
            let timing = base.timing.get_or_insert_with(TimingOptions::default);
            timing.duration_ms = self.duration_ms.or(timing.duration_ms);
            timing.tick_interval = self.tick_interval.or(timing.tick_interval);
            if self.start.is_some() {
                timing.start_date_time.clone_from(&self.start);
            }
            if self.end.is_some() {
                timing.end_date_time.clone_from(&self.end);
            }
        }

        if self.mute {
            base.audio
                .get_or_insert_with(AudioOptions::default)
                .enabled = Some(false);
        }
        if self.overlay {
            base.ui.get_or_insert_with(UiOptions::default).show_overlay = Some(true);
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wopr").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_flags_leave_options_untouched() {
        let base = Options {
            cycles: Some(3),
            ..Options::default()
        };
        assert_eq!(parse(&[]).apply(base.clone()), base);
    }

    #[test]
    fn repeated_codes_and_direction_alias() {
        let cli = parse(&["--code", "AB-12", "--code", "XYZ", "--direction", "rtl"]);
        let options = cli.apply(Options::default());
        assert_eq!(
            options.codes,
            Some(vec!["AB-12".to_string(), "XYZ".to_string()])
        );
        assert_eq!(options.direction, Some(Direction::Reverse));
    }

    #[test]
    fn timing_flags_patch_fields_not_sections() {
        let base = Options {
            timing: Some(TimingOptions {
                tick_interval: Some(40),
                duration_ms: Some(9000),
                ..TimingOptions::default()
            }),
            ..Options::default()
        };
        let options = parse(&["--duration-ms", "-1", "--end", "2030-01-01"]).apply(base);
        let timing = options.timing.unwrap();
        assert_eq!(timing.duration_ms, Some(-1));
        assert_eq!(timing.tick_interval, Some(40));
        assert_eq!(timing.end_date_time.as_deref(), Some("2030-01-01"));
    }

    #[test]
    fn mute_and_overlay() {
        let options = parse(&["--mute", "--overlay"]).apply(Options::default());
        assert_eq!(options.audio.unwrap().enabled, Some(false));
        assert_eq!(options.ui.unwrap().show_overlay, Some(true));
    }

    #[test]
    fn bad_direction_is_rejected() {
        let result = Cli::try_parse_from(["wopr", "--direction", "sideways"]);
        assert!(result.is_err());
    }
}
