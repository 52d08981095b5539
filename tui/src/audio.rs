//! Terminal bell audio: the closest a terminal gets to a tone generator.
//!
//! Lock cues ring the bell. Tick cues are far too frequent for a bell and
//! are dropped.

use std::io::{self, IsTerminal, Write};

use wopr_engine::{AudioError, AudioSink, Cue, CueKind};

const BEL: &[u8] = b"\x07";

pub struct BellAudio<W: Write> {
    out: W,
    require_tty: bool,
    volume: f32,
}

impl BellAudio<io::Stdout> {
    /// Ring the controlling terminal. Resume fails when stdout is not a TTY.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            out: io::stdout(),
            require_tty: true,
            volume: 1.0,
        }
    }
}

impl<W: Write> BellAudio<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            require_tty: false,
            volume: 1.0,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioSink for BellAudio<W> {
    fn resume(&mut self) -> Result<(), AudioError> {
        if self.require_tty && !io::stdout().is_terminal() {
            return Err(AudioError::Unavailable("stdout is not a terminal".to_string()));
        }
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn play(&mut self, cue: &Cue) {
        if self.volume <= 0.0 || !matches!(cue.kind, CueKind::Lock { .. }) {
            return;
        }
        if let Err(err) = self.out.write_all(BEL).and_then(|()| self.out.flush()) {
            tracing::debug!("bell write failed: {err}");
        }
    }

    fn close(&mut self) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wopr_types::CueVoice;

    #[test]
    fn only_lock_cues_ring() {
        let voice = CueVoice::default();
        let mut bell = BellAudio::new(Vec::new());
        bell.resume().unwrap();
        bell.play(&Cue::tick(&voice));
        bell.play(&Cue::lock(&voice, 0));
        bell.play(&Cue::lock(&voice, 1));
        assert_eq!(bell.into_inner(), b"\x07\x07".to_vec());
    }

    #[test]
    fn zero_volume_is_silent() {
        let mut bell = BellAudio::new(Vec::new());
        bell.set_volume(0.0);
        bell.play(&Cue::lock(&CueVoice::default(), 0));
        assert!(bell.into_inner().is_empty());
    }
}
