//! Heads-up display values derived from progress and tick count.

/// Everything the HUD shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub progress: f64,
    /// Progress bar fill, `0..=100`.
    pub bar_percent: u8,
    /// `None` when the probability readout is disabled.
    pub probability: Option<String>,
    pub ticks: String,
    pub checksum: String,
}

/// Probability readout range, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityRange {
    pub base: f64,
    pub max: f64,
}

impl ProbabilityRange {
    #[must_use]
    pub fn at(self, progress: f64) -> f64 {
        self.base + (self.max - self.base) * progress
    }
}

impl HudSnapshot {
    #[must_use]
    pub fn compose(progress: f64, ticks: u64, probability: Option<ProbabilityRange>) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        Self {
            progress,
            bar_percent: bar_percent(progress),
            probability: probability.map(|range| format_probability(range.at(progress))),
            ticks: format_ticks(ticks),
            checksum: checksum(ticks),
        }
    }
}

#[must_use]
pub fn bar_percent(progress: f64) -> u8 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// `2.3` -> `02.3%`.
#[must_use]
pub fn format_probability(percent: f64) -> String {
    format!("{percent:04.1}%")
}

#[must_use]
pub fn format_ticks(ticks: u64) -> String {
    format!("{ticks:06}")
}

/// Decorative pseudo-periodic checksum, `AAAA.BBBB`. Not a real digest.
#[must_use]
pub fn checksum(ticks: u64) -> String {
    let t = ticks as f64;
    let a = ((t * 0.013).sin() * 5000.0 + 5000.0) as u32;
    let b = ((t * 0.009).cos() * 5000.0 + 5000.0) as u32;
    format!("{a:04}.{b:04}")
}
