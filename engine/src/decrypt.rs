//! The scramble/lock engine for a single target code.

use std::time::Duration;

use rand::Rng;
use rand::seq::IndexedRandom;

use wopr_config::{Config, StreamConfig};
use wopr_types::{
    CodeTemplate, Cue, DecryptEvent, Direction, FrameStamp, HudSnapshot, LockOrder, ProgressClock,
    TimingMode,
};

use crate::events::EventBus;
use crate::present::{AudioChannel, Presenter};

/// Sinks a frame writes to.
pub(crate) struct Outputs<'a> {
    pub(crate) presenter: &'a mut dyn Presenter,
    pub(crate) audio: &'a mut AudioChannel,
    pub(crate) events: &'a mut EventBus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameOutcome {
    Continue,
    /// The cycle finished during this frame.
    Complete,
}

/// Display state plus lock bookkeeping for the current code.
///
/// `display` always has the template's length; fixed slots always show the
/// template character; `locked` flags only ever go from false to true until
/// the next `load`.
#[derive(Debug, Clone)]
pub(crate) struct Decryptor {
    template: CodeTemplate,
    display: Vec<char>,
    locked: Vec<bool>,
    order: LockOrder,
    /// Ranks `< committed` are locked.
    committed: usize,
    clock: ProgressClock,
    last_tick: Option<Duration>,
    ticks: u64,
    finished: bool,
}

impl Decryptor {
    pub(crate) fn new<R: Rng + ?Sized>(
        code: &str,
        direction: Direction,
        mode: TimingMode,
        rng: &mut R,
    ) -> Self {
        let template = CodeTemplate::compile(code);
        let order = LockOrder::generate(template.dynamic_count(), direction, rng);
        Self {
            display: template.initial_display(),
            locked: vec![false; template.len()],
            template,
            order,
            committed: 0,
            clock: ProgressClock::new(mode),
            last_tick: None,
            ticks: 0,
            finished: false,
        }
    }

    /// Recompile `code`: fresh display, flags, lock order and clock.
    pub(crate) fn load<R: Rng + ?Sized>(
        &mut self,
        code: &str,
        direction: Direction,
        rng: &mut R,
    ) {
        *self = Self::new(code, direction, self.clock.mode(), rng);
    }

    /// Prepare a new run of the current code without touching the display.
    pub(crate) fn restart_clock(&mut self) {
        self.clock.restart();
        self.last_tick = None;
        self.ticks = 0;
    }

    pub(crate) fn set_mode(&mut self, mode: TimingMode) {
        self.clock.set_mode(mode);
    }

    pub(crate) fn display(&self) -> String {
        self.display.iter().collect()
    }

    pub(crate) fn template(&self) -> &CodeTemplate {
        &self.template
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn locked_count(&self) -> usize {
        self.template
            .dynamic_indices()
            .iter()
            .filter(|&&idx| self.locked[idx])
            .count()
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    /// Paint the current display with the HUD at zero progress.
    pub(crate) fn paint_idle(&self, config: &Config, presenter: &mut dyn Presenter) {
        presenter.render_hud(&HudSnapshot::compose(
            0.0,
            self.ticks,
            config.probability.range(),
        ));
        presenter.render_code(&self.display());
    }

    /// One frame of a running cycle.
    pub(crate) fn frame<R: Rng + ?Sized>(
        &mut self,
        stamp: FrameStamp,
        config: &Config,
        out: &mut Outputs<'_>,
        rng: &mut R,
    ) -> FrameOutcome {
        let progress = self.clock.sample(stamp);
        out.events.emit(&DecryptEvent::Progress(progress));
        out.presenter.render_hud(&HudSnapshot::compose(
            progress,
            self.ticks,
            config.probability.range(),
        ));

        let tick_due = self.last_tick.is_none_or(|last| {
            stamp.monotonic.saturating_sub(last) >= config.timing.tick_interval
        });
        if tick_due {
            self.tick(stamp.monotonic, config, out, rng);
        }

        self.commit_through(lock_target(progress, self.order.len()), config, out);
        self.render(out);

        // Nothing to decrypt resolves immediately.
        let resolved = progress >= 1.0 || self.order.is_empty();
        if resolved && self.finish(config, out) {
            return FrameOutcome::Complete;
        }
        FrameOutcome::Continue
    }

    fn tick<R: Rng + ?Sized>(
        &mut self,
        now: Duration,
        config: &Config,
        out: &mut Outputs<'_>,
        rng: &mut R,
    ) {
        self.last_tick = Some(now);
        self.ticks += 1;
        out.events.emit(&DecryptEvent::Tick(self.ticks));

        for &idx in self.template.dynamic_indices() {
            if self.locked[idx] {
                continue;
            }
            if let Some(&ch) = config.charset.choose(rng) {
                self.display[idx] = ch;
            }
        }

        if config.stream.enabled {
            out.presenter
                .render_stream(&noise_lines(&config.stream, &config.charset, rng));
        }
        out.audio.play(&Cue::tick(&config.audio.voice));
    }

    /// Lock every rank below `target` that is not yet locked, in rank order.
    fn commit_through(&mut self, target: usize, config: &Config, out: &mut Outputs<'_>) {
        while self.committed < target {
            let rank = self.committed;
            self.committed += 1;
            let Some(position) = self.order.get(rank) else {
                break;
            };
            let Some(&idx) = self.template.dynamic_indices().get(position) else {
                continue;
            };
            if self.locked[idx] {
                continue;
            }
            let ch = self.template.chars()[idx];
            self.locked[idx] = true;
            self.display[idx] = ch;
            out.events.emit(&DecryptEvent::Lock { index: idx, ch });
            out.audio.play(&Cue::lock(&config.audio.voice, rank));
        }
    }

    fn render(&self, out: &mut Outputs<'_>) {
        let text = self.display();
        out.presenter.render_code(&text);
        out.events.emit(&DecryptEvent::Render(text));
    }

    /// Force the resolved state. Returns `true` only the first time per load.
    pub(crate) fn finish(&mut self, config: &Config, out: &mut Outputs<'_>) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        self.committed = self.order.len();
        self.display = self.template.chars().to_vec();
        for &idx in self.template.dynamic_indices() {
            self.locked[idx] = true;
        }

        out.presenter.render_hud(&HudSnapshot::compose(
            1.0,
            self.ticks,
            config.probability.range(),
        ));
        self.render(out);
        true
    }
}

/// Number of ranks that should be locked at `progress`.
fn lock_target(progress: f64, dynamic: usize) -> usize {
    let target = (progress.clamp(0.0, 1.0) * dynamic as f64).floor() as usize;
    target.min(dynamic)
}

/// One screenful of decorative intercept traffic.
pub(crate) fn noise_lines<R: Rng + ?Sized>(
    stream: &StreamConfig,
    charset: &[char],
    rng: &mut R,
) -> Vec<String> {
    (0..stream.lines)
        .map(|i| {
            let prefix = if stream.prefix_cycle.is_empty() {
                ""
            } else {
                stream.prefix_cycle[i % stream.prefix_cycle.len()].as_str()
            };
            let mut line = String::with_capacity(prefix.len().saturating_add(stream.width));
            line.push_str(prefix);
            line.extend((0..stream.width).filter_map(|_| charset.choose(rng).copied()));
            line
        })
        .collect()
}
