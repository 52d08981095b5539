//! Terminal rendering and key handling, checked on a vt100 virtual terminal.


use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;

use vt100_backend::VT100Backend;
use wopr_config::{Options, ProbabilityOptions, StreamOptions, TimingOptions, UiOptions};
use wopr_engine::{Session, SessionBuilder};
use wopr_tui::{TerminalPresenter, apply_key, draw};
use wopr_types::FrameStamp;

const WIDTH: u16 = 100;
const HEIGHT: u16 = 24;

fn options(duration_ms: i64) -> Options {
    Options {
        codes: Some(vec!["AB-12".to_string(), "XY-99".to_string()]),
        timing: Some(TimingOptions {
            duration_ms: Some(duration_ms),
            ..TimingOptions::default()
        }),
        stream: Some(StreamOptions {
            lines: Some(4),
            ..StreamOptions::default()
        }),
        ..Options::default()
    }
}

fn session(options: Options) -> Session<TerminalPresenter> {
    SessionBuilder::new(options)
        .presenter(TerminalPresenter::new())
        .seed(42)
        .build()
        .expect("session builds with a presenter")
}

fn render(session: &Session<TerminalPresenter>) -> Terminal<VT100Backend> {
    let mut terminal =
        Terminal::new(VT100Backend::new(WIDTH, HEIGHT)).expect("failed to create terminal");
    terminal
        .draw(|frame| draw(frame, session.presenter()))
        .expect("failed to draw");
    terminal
}

fn stamp(ms: u64) -> FrameStamp {
    FrameStamp::new(Duration::from_millis(ms), Utc::now())
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn initial_screen_shows_every_panel() {
    let session = session(options(1000));
    let terminal = render(&session);
    let screen = terminal.backend().contents();

    for expected in [
        "WOPR // DECRYPTION ROUTINE",
        "[ SIMULATION ]",
        "[b] HIDE BG",
        "NORAD PROCESSOR GRID",
        "TARGET: LAUNCH CODES",
        "__-__",
        "CYCLES: 000000",
        "PROBABILITY: 02.3%",
        "TRAFFIC: INTERCEPT BUFFER",
        "INTCPT ",
        "SIGMA  ",
        "CHECKSUM: 5000.10000",
        "© 1983 WOPR SIM.",
        "000%",
    ] {
        assert!(screen.contains(expected), "missing {expected:?} in\n{screen}");
    }
}

#[test]
fn header_sits_on_first_row_and_footer_on_last() {
    let session = session(options(1000));
    let terminal = render(&session);
    let backend = terminal.backend();
    assert!(backend.row(0).starts_with("WOPR // DECRYPTION ROUTINE"));
    assert!(backend.row(HEIGHT - 1).starts_with("CHECKSUM: "));
}

#[test]
fn resolved_code_and_saturated_hud() {
    let mut session = session(options(0));
    session.start();
    session.pump(stamp(0));
    let terminal = render(&session);
    let screen = terminal.backend().contents();

    assert!(screen.contains("AB-12"));
    assert!(screen.contains("100%"));
    assert!(screen.contains("PROBABILITY: 99.9%"));
    assert!(screen.contains("CYCLES: 000001"));
}

#[test]
fn code_is_drawn_bold() {
    let mut session = session(options(0));
    session.start();
    session.pump(stamp(0));
    let terminal = render(&session);
    let backend = terminal.backend();
    let (row, col) = backend.find("AB-12").expect("code on screen");
    let cell = backend
        .vt100()
        .screen()
        .cell(row, col)
        .expect("cell in range");
    assert!(cell.bold());
    assert_eq!(cell.contents(), "A");
}

#[test]
fn disabled_panels_are_not_drawn() {
    let session = session(Options {
        ui: Some(UiOptions {
            show_header: Some(false),
            show_footer: Some(false),
            show_progress: Some(false),
            show_cycles: Some(false),
            ..UiOptions::default()
        }),
        stream: Some(StreamOptions {
            enabled: Some(false),
            ..StreamOptions::default()
        }),
        probability: Some(ProbabilityOptions {
            enabled: Some(false),
            ..ProbabilityOptions::default()
        }),
        ..options(1000)
    });
    let terminal = render(&session);
    let screen = terminal.backend().contents();

    assert!(screen.contains("__-__"));
    for absent in [
        "WOPR //",
        "CHECKSUM",
        "TRAFFIC",
        "PROBABILITY",
        "CYCLES",
        "000%",
    ] {
        assert!(!screen.contains(absent), "unexpected {absent:?} in\n{screen}");
    }
}

#[test]
fn custom_title_is_shown() {
    let session = session(Options {
        ui: Some(UiOptions {
            title: Some("GLOBAL THERMONUCLEAR WAR".to_string()),
            ..UiOptions::default()
        }),
        ..options(1000)
    });
    let screen = render(&session).backend().contents();
    assert!(screen.contains("GLOBAL THERMONUCLEAR WAR"));
    assert!(!screen.contains("TARGET: LAUNCH CODES"));
}

#[test]
fn color_override_reaches_the_terminal() {
    let mut colors = BTreeMap::new();
    colors.insert("fg".to_string(), "#ffb000".to_string());
    let session = session(Options {
        colors: Some(colors),
        ..options(1000)
    });
    let terminal = render(&session);
    let cell = terminal
        .backend()
        .vt100()
        .screen()
        .cell(0, 0)
        .expect("cell in range");
    assert_eq!(cell.fgcolor(), vt100::Color::Rgb(0xff, 0xb0, 0x00));
}

#[test]
fn overlay_blocks_until_enter() {
    let mut session = session(Options {
        ui: Some(UiOptions {
            show_overlay: Some(true),
            ..UiOptions::default()
        }),
        ..options(1000)
    });
    let screen = render(&session).backend().contents();
    assert!(screen.contains("INITIATE DECRYPTION"));
    assert!(screen.contains("press ENTER"));

    // Keys other than Enter/space/quit are swallowed by the overlay.
    assert!(!apply_key(&mut session, press(KeyCode::Char('n'))));
    assert_eq!(session.current_index(), 0);
    assert!(!session.is_running());

    assert!(!apply_key(&mut session, press(KeyCode::Enter)));
    assert!(session.is_running());
    let screen = render(&session).backend().contents();
    assert!(!screen.contains("press ENTER"));
}

#[test]
fn space_toggles_running() {
    let mut session = session(options(1000));
    assert!(!apply_key(&mut session, press(KeyCode::Char(' '))));
    assert!(session.is_running());
    assert!(!apply_key(&mut session, press(KeyCode::Char(' '))));
    assert!(!session.is_running());
}

#[test]
fn next_and_reset_keys() {
    let mut session = session(options(0));
    apply_key(&mut session, press(KeyCode::Char('n')));
    assert_eq!(session.current_index(), 1);
    assert!(render(&session).backend().contents().contains("__-__"));

    session.start();
    session.pump(stamp(0));
    assert_eq!(session.completed_cycles(), 1);
    apply_key(&mut session, press(KeyCode::Char('r')));
    assert_eq!(session.completed_cycles(), 0);

    apply_key(&mut session, press(KeyCode::Char('n')));
    assert_eq!(session.current_index(), 0);
}

#[test]
fn background_key_flips_header_label() {
    let mut session = session(options(1000));
    apply_key(&mut session, press(KeyCode::Char('b')));
    assert!(!session.config().ui.show_background);
    let screen = render(&session).backend().contents();
    assert!(screen.contains("[b] SHOW BG"));
}

#[test]
fn quit_keys() {
    let mut session = session(options(1000));
    assert!(apply_key(&mut session, press(KeyCode::Char('q'))));
    assert!(apply_key(&mut session, press(KeyCode::Esc)));
    assert!(apply_key(
        &mut session,
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    ));
}
