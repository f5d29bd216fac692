//! Device seam for audio and haptic playback.
//!
//! A platform provides an [`AudioOutput`]; every successful request returns a
//! [`Playback`] that owns the device resource. Dropping the playback releases
//! the resource, whichever exit path gets there first.

use std::time::Duration;
use tokio::sync::oneshot;

use super::sound::Sound;
use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Looping,
    OneShot,
}

/// Platform audio/haptic device.
pub trait AudioOutput: Send + 'static {
    /// Start playing an audible catalogue sound at `gain` (0.0..=1.0).
    ///
    /// # Errors
    ///
    /// [`AudioError::UnknownSoundId`] if the device has no file for `sound`,
    /// [`AudioError::AudioResourceUnavailable`] if the device is busy or gone.
    fn play(&mut self, sound: Sound, mode: PlayMode, gain: f32) -> Result<Playback, AudioError>;

    /// Pulse the haptic motor.
    ///
    /// # Errors
    ///
    /// [`AudioError::AudioResourceUnavailable`] if there is no motor.
    fn vibrate(&mut self, duration: Duration) -> Result<Playback, AudioError>;
}

/// A live device resource. `release` is called exactly once.
pub trait Voice: Send {
    fn release(&mut self);
}

/// Owning handle for a [`Voice`].
pub struct Playback {
    voice: Box<dyn Voice>,
    finished: Option<oneshot::Receiver<()>>,
}

impl Playback {
    pub fn new(voice: impl Voice + 'static) -> Self {
        Self {
            voice: Box::new(voice),
            finished: None,
        }
    }

    /// Attach a natural-completion signal. The device sends (or drops the
    /// sender) when the sound has played to the end.
    pub fn with_completion(mut self, finished: oneshot::Receiver<()>) -> Self {
        self.finished = Some(finished);
        self
    }

    /// Hand the completion signal to whoever waits on it. `None` for voices
    /// that only end when released.
    pub fn take_completion(&mut self) -> Option<oneshot::Receiver<()>> {
        self.finished.take()
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.voice.release();
    }
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("self_completing", &self.finished.is_some())
            .finish()
    }
}

/// Output that produces no sound. Alarms and pulses complete at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentOutput;

struct SilentVoice;

impl Voice for SilentVoice {
    fn release(&mut self) {}
}

impl AudioOutput for SilentOutput {
    fn play(&mut self, sound: Sound, mode: PlayMode, _gain: f32) -> Result<Playback, AudioError> {
        tracing::debug!(%sound, ?mode, "silent output: play");
        let playback = Playback::new(SilentVoice);
        Ok(match mode {
            PlayMode::Looping => playback,
            PlayMode::OneShot => playback.with_completion(completed()),
        })
    }

    fn vibrate(&mut self, duration: Duration) -> Result<Playback, AudioError> {
        tracing::debug!(?duration, "silent output: vibrate");
        Ok(Playback::new(SilentVoice).with_completion(completed()))
    }
}

fn completed() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(());
    rx
}
