//! Color theme and glyphs for the WOPR terminal.
//!
//! Green phosphor on near-black by default. Named entries in the `colors`
//! option override individual palette slots.

use std::collections::BTreeMap;
use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

/// Phosphor palette constants.
mod colors {
    use super::Color;

    pub const BG: Color = Color::Rgb(3, 10, 5);
    pub const PANEL: Color = Color::Rgb(7, 20, 11);
    pub const FG: Color = Color::Rgb(51, 255, 102); // #33ff66
    pub const DIM: Color = Color::Rgb(26, 138, 60);
    pub const ACCENT: Color = Color::Rgb(176, 255, 196);
    pub const ALERT: Color = Color::Rgb(255, 76, 76);
    pub const BORDER: Color = Color::Rgb(22, 92, 44);
}

/// Resolved theme palette used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub panel: Color,
    pub fg: Color,
    pub dim: Color,
    pub accent: Color,
    pub alert: Color,
    pub border: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            bg: colors::BG,
            panel: colors::PANEL,
            fg: colors::FG,
            dim: colors::DIM,
            accent: colors::ACCENT,
            alert: colors::ALERT,
            border: colors::BORDER,
        }
    }

    /// Apply `name = value` overrides. Names may carry a `wopr-` prefix.
    /// Unknown names and unparseable colors are logged and skipped.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, value) in overrides {
            let Ok(color) = Color::from_str(value.trim()) else {
                tracing::warn!("ignoring color '{name}': cannot parse '{value}'");
                continue;
            };
            let slot = match name.trim_start_matches("wopr-") {
                "bg" => &mut self.bg,
                "panel" => &mut self.panel,
                "fg" => &mut self.fg,
                "dim" | "muted" => &mut self.dim,
                "accent" => &mut self.accent,
                "alert" => &mut self.alert,
                "border" => &mut self.border,
                _ => {
                    tracing::warn!("ignoring unknown color '{name}'");
                    continue;
                }
            };
            *slot = color;
        }
        self
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

#[must_use]
pub fn palette(overrides: &BTreeMap<String, String>) -> Palette {
    Palette::standard().with_overrides(overrides)
}

pub mod glyphs {
    pub const BAR_FILL: &str = "█";
    pub const BAR_EMPTY: &str = "░";
    pub const CURSOR: &str = "▌";
    pub const SEPARATOR: &str = " │ ";
}

/// Common style helpers.
pub mod styles {
    use super::{Modifier, Palette, Style};

    #[must_use]
    pub fn text(palette: &Palette) -> Style {
        Style::default().fg(palette.fg)
    }

    #[must_use]
    pub fn muted(palette: &Palette) -> Style {
        Style::default().fg(palette.dim)
    }

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn code(palette: &Palette, blink: bool) -> Style {
        let style = Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD);
        if blink {
            style.add_modifier(Modifier::SLOW_BLINK)
        } else {
            style
        }
    }

    #[must_use]
    pub fn border(palette: &Palette) -> Style {
        Style::default().fg(palette.border)
    }
}
