//! Session controller: lifecycle, code rotation and timers around a [`Decryptor`].
//!
//! A session is driven from the outside. The host calls [`Session::pump`] once
//! per display frame with a [`FrameStamp`]; the session runs at most one engine
//! frame per pump and fires any timers that have come due.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use wopr_config::{Config, DEFAULTS, Options, ResolveWarning, UiOptions};
use wopr_types::{DecryptEvent, EventKind, FrameStamp};

use crate::decrypt::{Decryptor, FrameOutcome, Outputs, noise_lines};
use crate::events::{EventBus, SubscriptionId};
use crate::present::{AudioChannel, AudioSink, Presenter};
use crate::scheduler::{Scheduler, TimerKind};

/// Pause between a solved code and the next cycle.
pub const CYCLE_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a session needs a presenter to render into")]
    MissingPresenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
}

pub struct SessionBuilder<P> {
    options: Options,
    presenter: Option<P>,
    audio: Option<Box<dyn AudioSink>>,
    seed: Option<u64>,
    now: Option<DateTime<Utc>>,
}

impl<P: Presenter> SessionBuilder<P> {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            presenter: None,
            audio: None,
            seed: None,
            now: None,
        }
    }

    #[must_use]
    pub fn presenter(mut self, presenter: P) -> Self {
        self.presenter = Some(presenter);
        self
    }

    #[must_use]
    pub fn audio(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = Some(sink);
        self
    }

    /// Deterministic scramble and lock order.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Instant used to resolve an end date given without a start date, at
    /// build time and on every later option change.
    #[must_use]
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Resolve options, mount the presenter and paint the first code at zero progress.
    pub fn build(self) -> Result<Session<P>, SessionError> {
        let Some(mut presenter) = self.presenter else {
            return Err(SessionError::MissingPresenter);
        };
        let resolved = self.options.resolve(&DEFAULTS, self.now.unwrap_or_else(Utc::now));
        let config = resolved.config;
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let codes = config.codes.clone();
        let decryptor = Decryptor::new(
            &codes[0],
            config.direction,
            config.timing.mode,
            &mut rng,
        );

        presenter.mount(&config);
        presenter.apply_style(&config);
        if config.stream.enabled {
            presenter.render_stream(&noise_lines(&config.stream, &config.charset, &mut rng));
        }
        decryptor.paint_idle(&config, &mut presenter);
        let overlay = config.ui.show_overlay;
        if overlay {
            presenter.show_overlay(Some(&config.ui.overlay_text));
        }

        tracing::debug!(codes = codes.len(), "session built");

        Ok(Session {
            options: self.options,
            audio: AudioChannel::new(self.audio, config.audio),
            warnings: resolved.warnings,
            config,
            presenter,
            events: EventBus::new(),
            scheduler: Scheduler::new(),
            decryptor,
            rng,
            codes,
            index: 0,
            completed: 0,
            state: RunState::Idle,
            blinking: false,
            overlay,
            destroyed: false,
            last_stamp: None,
            pinned_now: self.now,
        })
    }
}

/// A running decryption display.
///
/// No method returns an error or panics once the session is built; after
/// [`Session::destroy`] every operation is a no-op.
pub struct Session<P: Presenter> {
    options: Options,
    config: Config,
    warnings: Vec<ResolveWarning>,
    presenter: P,
    audio: AudioChannel,
    events: EventBus,
    scheduler: Scheduler,
    decryptor: Decryptor,
    rng: StdRng,
    codes: Vec<String>,
    index: usize,
    completed: u32,
    state: RunState,
    blinking: bool,
    overlay: bool,
    destroyed: bool,
    last_stamp: Option<Duration>,
    /// Anchor for end-only dates; `None` reads the wall clock.
    pinned_now: Option<DateTime<Utc>>,
}

impl<P: Presenter> Session<P> {
    /// Advance the session to `stamp`: fire due timers, then run a pending frame.
    pub fn pump(&mut self, stamp: FrameStamp) {
        if self.destroyed {
            return;
        }
        self.last_stamp = Some(stamp.monotonic);

        for timer in self.scheduler.take_due(stamp.monotonic) {
            match timer {
                TimerKind::CycleAdvance => self.advance_cycle(),
                TimerKind::BlinkRevert => self.set_blink(false),
            }
        }

        if !self.scheduler.take_frame() {
            return;
        }

        let mut out = Outputs {
            presenter: &mut self.presenter,
            audio: &mut self.audio,
            events: &mut self.events,
        };
        match self
            .decryptor
            .frame(stamp, &self.config, &mut out, &mut self.rng)
        {
            FrameOutcome::Complete => self.complete(stamp.monotonic),
            FrameOutcome::Continue if self.decryptor.is_finished() => {
                self.state = RunState::Idle;
            }
            FrameOutcome::Continue => self.scheduler.request_frame(),
        }
    }

    fn complete(&mut self, now: Duration) {
        self.state = RunState::Idle;
        self.completed = self.completed.saturating_add(1);
        tracing::debug!(
            completed = self.completed,
            code = %self.decryptor.template().as_string(),
            "cycle complete"
        );

        if self.config.ui.blink_on_solved {
            self.set_blink(true);
            let blink = self.config.ui.blink_duration;
            if !blink.is_zero() {
                self.scheduler
                    .schedule(TimerKind::BlinkRevert, now.saturating_add(blink));
            }
        }

        self.events.emit(&DecryptEvent::Complete(
            self.decryptor.template().as_string(),
        ));

        let cycles = self.config.cycles;
        if cycles == 0 || self.completed < cycles {
            self.scheduler.schedule(
                TimerKind::CycleAdvance,
                now.saturating_add(CYCLE_ADVANCE_DELAY),
            );
        } else {
            tracing::debug!(cycles, "cycle limit reached");
        }
    }

    /// Next code (wrapping), completed count preserved, then start.
    fn advance_cycle(&mut self) {
        self.index = (self.index + 1) % self.codes.len();
        self.set_blink(false);
        self.scheduler.cancel(TimerKind::BlinkRevert);
        self.load_current();
        self.start();
    }

    fn load_current(&mut self) {
        self.decryptor
            .load(&self.codes[self.index], self.config.direction, &mut self.rng);
        self.decryptor.paint_idle(&self.config, &mut self.presenter);
    }

    fn set_blink(&mut self, on: bool) {
        if self.blinking != on {
            self.blinking = on;
            self.presenter.set_blink(on);
        }
    }

    /// Begin (or resume) decrypting. A no-op while running.
    ///
    /// A code that already resolved is recompiled first so the new run has
    /// something to decrypt.
    pub fn start(&mut self) {
        if self.destroyed || self.state == RunState::Running {
            return;
        }
        if self.overlay {
            self.overlay = false;
            self.presenter.show_overlay(None);
        }
        if self.decryptor.is_finished() {
            self.scheduler.cancel(TimerKind::CycleAdvance);
            self.load_current();
        }
        self.decryptor.restart_clock();
        self.state = RunState::Running;
        self.scheduler.request_frame();
        self.audio.resume();
        tracing::debug!(index = self.index, "session started");
    }

    /// Halt ticking; the display keeps whatever it shows.
    pub fn stop(&mut self) {
        if self.destroyed {
            return;
        }
        self.state = RunState::Idle;
        self.scheduler.cancel_frame();
        self.scheduler.cancel(TimerKind::CycleAdvance);
    }

    /// Stop, clear counters and repaint the current code at zero progress.
    pub fn reset(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.completed = 0;
        self.set_blink(false);
        self.scheduler.cancel(TimerKind::BlinkRevert);
        self.load_current();
    }

    /// Move to the next code and reset. Without `wrap` the last code stays put.
    pub fn advance_to_next_code(&mut self, wrap: bool) {
        if self.destroyed {
            return;
        }
        let last = self.codes.len() - 1;
        self.index = if self.index < last {
            self.index + 1
        } else if wrap {
            0
        } else {
            last
        };
        self.reset();
    }

    /// Swap the code list. An empty list falls back to the default code.
    pub fn replace_codes(&mut self, codes: Vec<String>, reset_now: bool) {
        if self.destroyed {
            return;
        }
        self.codes = if codes.is_empty() {
            DEFAULTS.codes.clone()
        } else {
            codes
        };
        self.index = 0;
        if reset_now {
            self.reset();
        }
    }

    /// Merge `patch` over the current options and apply it without resetting.
    ///
    /// `codes` in a patch are recorded but the active list only changes through
    /// [`Session::replace_codes`].
    pub fn set_options(&mut self, patch: Options) {
        if self.destroyed {
            return;
        }
        self.options = std::mem::take(&mut self.options).merge(patch);
        self.reresolve();
    }

    /// Flip background visibility.
    pub fn toggle_background(&mut self) {
        if self.destroyed {
            return;
        }
        let show = !self.config.ui.show_background;
        let ui = self.options.ui.get_or_insert_with(UiOptions::default);
        ui.show_background = Some(show);
        self.reresolve();
    }

    fn reresolve(&mut self) {
        let resolved = self
            .options
            .resolve(&DEFAULTS, self.pinned_now.unwrap_or_else(Utc::now));
        self.config = resolved.config;
        self.warnings = resolved.warnings;
        self.decryptor.set_mode(self.config.timing.mode);
        self.audio.configure(self.config.audio);
        self.presenter.apply_style(&self.config);
    }

    /// Hide the start overlay and begin.
    pub fn dismiss_overlay(&mut self) {
        if self.destroyed || !self.overlay {
            return;
        }
        self.start();
    }

    /// Stop, cancel every timer, close audio and unmount. The session is inert afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.stop();
        self.scheduler.clear();
        self.audio.close();
        self.presenter.unmount();
        self.destroyed = true;
        tracing::debug!("session destroyed");
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&DecryptEvent) + 'static,
    {
        self.events.subscribe(kind, handler)
    }

    /// Unsubscribe; unknown ids are ignored.
    pub fn off(&mut self, kind: EventKind, id: SubscriptionId) {
        self.events.unsubscribe(kind, id);
    }

    #[must_use]
    pub fn display(&self) -> String {
        self.decryptor.display()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub fn completed_cycles(&self) -> u32 {
        self.completed
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.decryptor.ticks()
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.decryptor.locked_count()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_code(&self) -> &str {
        &self.codes[self.index]
    }

    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Problems recovered while resolving the current options.
    #[must_use]
    pub fn warnings(&self) -> &[ResolveWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.overlay
    }

    #[must_use]
    pub fn audio_available(&self) -> bool {
        self.audio.is_available()
    }

    #[must_use]
    pub fn audio_enabled(&self) -> bool {
        self.audio.config().enabled
    }

    /// Whether a frame will run on the next pump.
    #[must_use]
    pub fn frame_pending(&self) -> bool {
        self.scheduler.frame_pending()
    }

    #[must_use]
    pub fn timer_deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.scheduler.deadline(kind)
    }

    /// Monotonic time of the most recent pump.
    #[must_use]
    pub fn last_pump(&self) -> Option<Duration> {
        self.last_stamp
    }

    #[must_use]
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
