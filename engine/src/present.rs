//! Presentation seams: where the engine's state leaves the crate.
//!
//! The engine never draws or plays anything itself. A host supplies a
//! [`Presenter`] for visuals and, optionally, an [`AudioSink`] for cues.

use thiserror::Error;

use wopr_config::{AudioConfig, Config};
use wopr_types::{Cue, HudSnapshot};

/// Render target for a session.
///
/// `render_code` and `render_hud` are called every frame; everything else is
/// called on lifecycle edges and has a no-op default.
pub trait Presenter {
    /// Called once when the session is built, before the first paint.
    fn mount(&mut self, _config: &Config) {}

    /// Called once by `Session::destroy`.
    fn unmount(&mut self) {}

    fn render_code(&mut self, text: &str);

    fn render_hud(&mut self, hud: &HudSnapshot);

    /// Replaces the noise stream panel with `lines`.
    fn render_stream(&mut self, _lines: &[String]) {}

    fn set_blink(&mut self, _on: bool) {}

    /// Colors and background visibility changed.
    fn apply_style(&mut self, _config: &Config) {}

    /// `Some(text)` shows the start overlay, `None` hides it.
    fn show_overlay(&mut self, _text: Option<&str>) {}
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Unavailable(String),
    #[error("audio playback was not permitted")]
    PermissionDenied,
}

/// Tone output. Implementations synthesize cues however the host can.
pub trait AudioSink {
    /// Prepare the device. Called on every `start`.
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Master volume in `[0, 1]`.
    fn set_volume(&mut self, _volume: f32) {}

    fn play(&mut self, cue: &Cue);

    fn close(&mut self) {}
}

/// Optional sink plus the gate that decides whether cues reach it.
///
/// A sink that fails to resume is dropped for the rest of the session.
pub(crate) struct AudioChannel {
    sink: Option<Box<dyn AudioSink>>,
    config: AudioConfig,
    ready: bool,
}

impl AudioChannel {
    pub(crate) fn new(sink: Option<Box<dyn AudioSink>>, config: AudioConfig) -> Self {
        Self {
            sink,
            config,
            ready: false,
        }
    }

    pub(crate) fn configure(&mut self, config: AudioConfig) {
        self.config = config;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(config.volume);
        }
    }

    pub(crate) fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub(crate) fn resume(&mut self) {
        if !self.config.enabled {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        match sink.resume() {
            Ok(()) => {
                sink.set_volume(self.config.volume);
                self.ready = true;
            }
            Err(err) => {
                tracing::debug!("audio disabled for this session: {err}");
                self.sink = None;
                self.ready = false;
            }
        }
    }

    pub(crate) fn play(&mut self, cue: &Cue) {
        if !self.config.enabled || !self.ready {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.play(cue);
        }
    }

    pub(crate) fn close(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.close();
        }
        self.ready = false;
    }

    pub(crate) fn is_available(&self) -> bool {
        self.sink.is_some()
    }
}

impl std::fmt::Debug for AudioChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChannel")
            .field("sink", &self.sink.is_some())
            .field("config", &self.config)
            .field("ready", &self.ready)
            .finish()
    }
}
