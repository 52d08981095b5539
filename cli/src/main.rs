//! WOPR CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`wopr_engine`] (decryption state) and [`wopr_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> Options (file + flags) -> Session -> TerminalSession::new() -> run()
//! ```
//!
//! # Event Loop
//!
//! A fixed 16ms render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`wopr_tui::InputPump`])
//! 3. Pump the session with a fresh frame stamp
//! 4. Redraw if the presenter changed

mod args;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use wopr_config::{Options, config_dir};
use wopr_engine::{Session, SessionBuilder};
use wopr_tui::{BellAudio, InputPump, TerminalPresenter, draw, handle_events};
use wopr_types::FrameStamp;

use args::Cli;

const FRAME_DURATION: Duration = Duration::from_millis(16);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.wopr/logs/wopr.log
    if let Some(dir) = config_dir() {
        candidates.push(dir.join("logs").join("wopr.log"));
    }

    // Fallback: ./.wopr/logs/wopr.log
    candidates.push(PathBuf::from(".wopr").join("logs").join("wopr.log"));

    candidates
}

/// Config file (explicit path or `~/.wopr/config.toml`) with flags on top.
/// A broken config file is logged and skipped.
fn load_options(cli: &Cli) -> Options {
    let loaded = match &cli.config {
        Some(path) => Options::load_from(path).map(Some),
        None => Options::load(),
    };
    let base = match loaded {
        Ok(options) => options.unwrap_or_default(),
        Err(err) => {
            tracing::warn!("{err}; continuing with defaults");
            Options::default()
        }
    };
    cli.apply(base)
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored on drop, so the terminal
/// stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let options = load_options(&cli);
    let mut session = SessionBuilder::new(options)
        .presenter(TerminalPresenter::new())
        .audio(Box::new(BellAudio::stdout()))
        .build()?;
    for warning in session.warnings() {
        tracing::info!("resolved with warning: {warning}");
    }

    if !session.overlay_visible() {
        session.start();
    }

    let result = {
        let mut terminal = TerminalSession::new()?;
        run(&mut terminal.terminal, &mut session).await
    };

    session.destroy();

    if let Err(err) = &result {
        tracing::error!("{err:?}");
    }
    result
}

async fn run<B>(terminal: &mut Terminal<B>, session: &mut Session<TerminalPresenter>) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let epoch = Instant::now();

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        match handle_events(session, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        session.pump(FrameStamp::new(epoch.elapsed(), Utc::now()));

        if session.presenter_mut().take_dirty()
            && let Err(e) = terminal.draw(|frame| draw(frame, session.presenter()))
        {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
