//! Terminal rendering for the WOPR decryptor using ratatui.

mod audio;
mod input;
mod presenter;
mod theme;

pub use audio::BellAudio;
pub use input::{InputPump, apply_key, handle_events};
pub use presenter::{Panels, TerminalPresenter};
pub use theme::{Palette, glyphs, palette, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

const HEADER_LEFT: &str = "WOPR // DECRYPTION ROUTINE ";
const HEADER_TAG: &str = "[ SIMULATION ]";
const HEADER_RIGHT: &str = "NORAD PROCESSOR GRID";
const STREAM_TITLE: &str = "TRAFFIC: INTERCEPT BUFFER";
const FOOTER_RIGHT: &str = "© 1983 WOPR SIM.";
const KEY_HINTS: &str = "[space] run/halt  [r] reset  [n] next  [q] quit";
const OVERLAY_HINT: &str = "press ENTER";

/// Main draw function
pub fn draw(frame: &mut Frame, screen: &TerminalPresenter) {
    let palette = screen.palette();
    let panels = screen.panels();

    let bg = if panels.background {
        palette.bg
    } else {
        Color::Reset
    };
    frame.render_widget(Block::default().style(Style::default().bg(bg)), frame.area());

    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(u16::from(panels.header)),
        Constraint::Min(1),
        Constraint::Length(u16::from(panels.footer)),
    ])
    .areas(frame.area());

    if panels.header {
        draw_header(frame, screen, header_area);
    }

    if panels.stream {
        let side_width = screen
            .stream()
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .max(STREAM_TITLE.len()) as u16
            + 4;
        let [main_area, side_area] =
            Layout::horizontal([Constraint::Min(20), Constraint::Length(side_width)])
                .areas(body_area);
        draw_main(frame, screen, main_area);
        draw_stream(frame, screen, side_area);
    } else {
        draw_main(frame, screen, body_area);
    }

    if panels.footer {
        draw_footer(frame, screen, footer_area);
    }

    if let Some(text) = screen.overlay() {
        draw_overlay(frame, screen, text);
    }
}

fn draw_header(frame: &mut Frame, screen: &TerminalPresenter, area: Rect) {
    let palette = screen.palette();
    let toggle = if screen.panels().background {
        "[b] HIDE BG"
    } else {
        "[b] SHOW BG"
    };

    let left = Paragraph::new(Line::from(vec![
        Span::styled(HEADER_LEFT, styles::text(palette)),
        Span::styled(HEADER_TAG, styles::muted(palette)),
    ]));
    let right = Paragraph::new(Line::from(vec![
        Span::styled(toggle, styles::muted(palette)),
        Span::styled(glyphs::SEPARATOR, styles::muted(palette)),
        Span::styled(HEADER_RIGHT, styles::text(palette)),
    ]))
    .alignment(Alignment::Right);

    frame.render_widget(left, area);
    frame.render_widget(right, area);
}

fn draw_main(frame: &mut Frame, screen: &TerminalPresenter, area: Rect) {
    let palette = screen.palette();
    let panels = screen.panels();
    let hud = screen.hud();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(styles::border(palette));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [title_area, _, code_area, _, bar_area, _, hud_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(u16::from(panels.progress)),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let title = Paragraph::new(Span::styled(panels.title.as_str(), styles::title(palette)))
        .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    let code = Paragraph::new(Line::from(vec![
        Span::styled(screen.code(), styles::code(palette, screen.is_blinking())),
        Span::styled(glyphs::CURSOR, styles::text(palette)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(code, code_area);

    if panels.progress {
        frame.render_widget(
            Paragraph::new(progress_bar(hud.bar_percent, bar_area.width))
                .style(styles::text(palette)),
            bar_area,
        );
    }

    let mut readout = Vec::new();
    if panels.cycles {
        readout.push(Span::styled("CYCLES: ", styles::text(palette)));
        readout.push(Span::styled(hud.ticks.as_str(), styles::muted(palette)));
    }
    if let (true, Some(probability)) = (panels.probability, hud.probability.as_deref()) {
        if !readout.is_empty() {
            readout.push(Span::raw("   "));
        }
        readout.push(Span::styled("PROBABILITY: ", styles::text(palette)));
        readout.push(Span::styled(probability, styles::muted(palette)));
    }
    if !readout.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(readout)).alignment(Alignment::Center),
            hud_area,
        );
    }
}

/// `[████░░░░] 050%`, fitted to `width` columns.
fn progress_bar(percent: u8, width: u16) -> String {
    let label = format!(" {percent:03}%");
    let track = (width as usize).saturating_sub(label.len() + 2);
    let filled = track * usize::from(percent.min(100)) / 100;
    format!(
        "[{}{}]{label}",
        glyphs::BAR_FILL.repeat(filled),
        glyphs::BAR_EMPTY.repeat(track - filled)
    )
}

fn draw_stream(frame: &mut Frame, screen: &TerminalPresenter, area: Rect) {
    let palette = screen.palette();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border(palette))
        .title(Span::styled(STREAM_TITLE, styles::text(palette)))
        .style(Style::default().bg(if screen.panels().background {
            palette.panel
        } else {
            Color::Reset
        }));
    let lines: Vec<Line> = screen
        .stream()
        .iter()
        .map(|line| Line::styled(line.as_str(), styles::muted(palette)))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(frame: &mut Frame, screen: &TerminalPresenter, area: Rect) {
    let palette = screen.palette();
    let left = Paragraph::new(Line::from(vec![
        Span::styled("CHECKSUM: ", styles::text(palette)),
        Span::styled(screen.hud().checksum.as_str(), styles::muted(palette)),
    ]));
    let hints = Paragraph::new(Span::styled(KEY_HINTS, styles::muted(palette)))
        .alignment(Alignment::Center);
    let right = Paragraph::new(Span::styled(FOOTER_RIGHT, styles::muted(palette)))
        .alignment(Alignment::Right);
    frame.render_widget(left, area);
    if area.width as usize > KEY_HINTS.len() + 48 {
        frame.render_widget(hints, area);
    }
    frame.render_widget(right, area);
}

fn draw_overlay(frame: &mut Frame, screen: &TerminalPresenter, text: &str) {
    let palette = screen.palette();
    let area = frame.area();
    let width = (text.chars().count() as u16 + 8)
        .max(OVERLAY_HINT.len() as u16 + 8)
        .min(area.width);
    let height = 5.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(palette.alert))
        .style(Style::default().bg(palette.bg));
    let body = Paragraph::new(vec![
        Line::styled(text, styles::title(palette)),
        Line::default(),
        Line::styled(OVERLAY_HINT, styles::muted(palette)),
    ])
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(body, popup);
}
