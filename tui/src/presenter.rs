//! Presenter that keeps the latest engine output for the next terminal draw.

use wopr_config::{Config, DEFAULTS};
use wopr_engine::Presenter;
use wopr_types::HudSnapshot;

use crate::theme::{Palette, palette};

/// Which panels to draw, copied from the UI config on every style change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panels {
    pub header: bool,
    pub footer: bool,
    pub progress: bool,
    pub background: bool,
    pub cycles: bool,
    pub probability: bool,
    pub stream: bool,
    pub title: String,
}

impl Panels {
    fn from_config(config: &Config) -> Self {
        Self {
            header: config.ui.show_header,
            footer: config.ui.show_footer,
            progress: config.ui.show_progress,
            background: config.ui.show_background,
            cycles: config.ui.show_cycles,
            probability: config.probability.enabled,
            stream: config.stream.enabled,
            title: config.ui.title.clone(),
        }
    }
}

/// Screen model for [`crate::draw`].
///
/// Every trait call marks the screen dirty so the host redraws only after
/// something changed.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    code: String,
    hud: HudSnapshot,
    stream: Vec<String>,
    blink: bool,
    overlay: Option<String>,
    palette: Palette,
    panels: Panels,
    mounted: bool,
    dirty: bool,
}

impl TerminalPresenter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            code: String::new(),
            hud: HudSnapshot::compose(0.0, 0, DEFAULTS.probability.range()),
            stream: Vec::new(),
            blink: false,
            overlay: None,
            palette: Palette::standard(),
            panels: Panels::from_config(&DEFAULTS),
            mounted: false,
            dirty: true,
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[must_use]
    pub fn hud(&self) -> &HudSnapshot {
        &self.hud
    }

    #[must_use]
    pub fn stream(&self) -> &[String] {
        &self.stream
    }

    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blink
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Consume the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Force a redraw, e.g. after a terminal resize.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for TerminalPresenter {
    fn mount(&mut self, config: &Config) {
        self.mounted = true;
        self.apply_style(config);
    }

    fn unmount(&mut self) {
        self.mounted = false;
        self.dirty = true;
    }

    fn render_code(&mut self, text: &str) {
        if self.code != text {
            text.clone_into(&mut self.code);
            self.dirty = true;
        }
    }

    fn render_hud(&mut self, hud: &HudSnapshot) {
        if self.hud != *hud {
            self.hud = hud.clone();
            self.dirty = true;
        }
    }

    fn render_stream(&mut self, lines: &[String]) {
        self.stream = lines.to_vec();
        self.dirty = true;
    }

    fn set_blink(&mut self, on: bool) {
        self.blink = on;
        self.dirty = true;
    }

    fn apply_style(&mut self, config: &Config) {
        self.palette = palette(&config.colors);
        self.panels = Panels::from_config(config);
        self.dirty = true;
    }

    fn show_overlay(&mut self, text: Option<&str>) {
        self.overlay = text.map(str::to_string);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn unchanged_code_does_not_dirty() {
        let mut presenter = TerminalPresenter::new();
        presenter.render_code("AB");
        assert!(presenter.take_dirty());
        presenter.render_code("AB");
        assert!(!presenter.take_dirty());
        presenter.render_code("AC");
        assert!(presenter.take_dirty());
    }

    #[test]
    fn apply_style_picks_up_panels_and_colors() {
        let mut config = DEFAULTS.clone();
        config.ui.show_header = false;
        config.ui.title = "JOSHUA".to_string();
        config.colors.insert("fg".to_string(), "red".to_string());

        let mut presenter = TerminalPresenter::new();
        presenter.mount(&config);
        assert!(presenter.is_mounted());
        assert!(!presenter.panels().header);
        assert_eq!(presenter.panels().title, "JOSHUA");
        assert_eq!(presenter.palette().fg, Color::Red);
    }
}
