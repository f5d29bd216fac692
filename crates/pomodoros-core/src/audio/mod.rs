//! Ambient and alarm slots.
//!
//! [`AudioResourceManager`] holds at most one looping ambient voice and at
//! most one one-shot alarm voice. Filling a slot always releases its previous
//! occupant first. The slots live with the caller; the device calls behind
//! them run on a background audio service, so a slow device never holds up
//! the caller. Device failures are logged and the sound is skipped; the
//! manager never reports an error to its caller.

mod device;
mod output;
pub mod sound;

pub use output::{AudioOutput, PlayMode, Playback, SilentOutput, Voice};
pub use sound::Sound;

use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use device::{DeviceService, Notice, Request, VoiceId};

/// Length of the haptic pulse that stands in for a muted or vibration alarm.
pub const HAPTIC_PULSE: Duration = Duration::from_millis(3000);

/// Convert a `[0,100]` preference into a device gain.
pub fn gain(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}

/// An occupied slot. `finished` arrives once the device has started the voice.
#[derive(Debug)]
struct Slot {
    id: VoiceId,
    finished: Option<oneshot::Receiver<()>>,
}

#[derive(Debug)]
pub struct AudioResourceManager {
    requests: mpsc::UnboundedSender<Request>,
    notices: mpsc::UnboundedReceiver<Notice>,
    service: Option<JoinHandle<()>>,
    next_id: VoiceId,
    ambient: Option<Slot>,
    alarm: Option<Slot>,
}

impl AudioResourceManager {
    /// Spawn the audio service for `output` on the current tokio runtime.
    pub fn new(output: impl AudioOutput) -> Self {
        Self::from_boxed(Box::new(output))
    }

    pub fn from_boxed(output: Box<dyn AudioOutput>) -> Self {
        let (requests, request_rx) = mpsc::unbounded_channel();
        let (notice_tx, notices) = mpsc::unbounded_channel();
        let service = tokio::spawn(DeviceService::new(output, request_rx, notice_tx).run());
        Self {
            requests,
            notices,
            service: Some(service),
            next_id: 0,
            ambient: None,
            alarm: None,
        }
    }

    /// Replace the ambient loop. `"None"` only stops the current loop.
    pub fn play_ambient(&mut self, sound_id: &str, volume: u8) {
        self.stop_ambient();
        let sound = match sound_id.parse::<Sound>() {
            Ok(sound) => sound,
            Err(e) => {
                warn!(error = %e, "skipping ambient sound");
                return;
            }
        };
        if !sound.is_audible() {
            if sound == Sound::Vibration {
                warn!("vibration cannot loop as an ambient sound, skipping");
            }
            return;
        }
        let id = self.allocate();
        self.send(Request::Play {
            id,
            sound,
            mode: PlayMode::Looping,
            gain: gain(volume),
        });
        debug!(%sound, volume, voice = id, "ambient requested");
        self.ambient = Some(Slot { id, finished: None });
    }

    /// Fire the one-shot alarm. A vibration id or a zero volume pulses the
    /// haptic motor for [`HAPTIC_PULSE`] instead.
    pub fn play_alarm(&mut self, sound_id: &str, volume: u8) {
        self.stop_alarm();
        let haptic = sound_id == sound::VIBRATION || volume == 0;
        let request = |id| {
            if haptic {
                return Some(Request::Vibrate {
                    id,
                    duration: HAPTIC_PULSE,
                });
            }
            match sound_id.parse::<Sound>() {
                Ok(sound) if sound.is_audible() => Some(Request::Play {
                    id,
                    sound,
                    mode: PlayMode::OneShot,
                    gain: gain(volume),
                }),
                Ok(_) => None,
                Err(e) => {
                    warn!(error = %e, "skipping alarm sound");
                    None
                }
            }
        };
        let id = self.next_id + 1;
        let Some(request) = request(id) else {
            return;
        };
        self.next_id = id;
        self.send(request);
        debug!(sound_id, volume, haptic, voice = id, "alarm requested");
        self.alarm = Some(Slot { id, finished: None });
    }

    pub fn stop_ambient(&mut self) {
        if let Some(slot) = self.ambient.take() {
            self.send(Request::Release { id: slot.id });
            debug!(voice = slot.id, "ambient released");
        }
    }

    pub fn stop_alarm(&mut self) {
        if let Some(slot) = self.alarm.take() {
            self.send(Request::Release { id: slot.id });
            debug!(voice = slot.id, "alarm released");
        }
    }

    /// Empty both slots.
    pub fn release_all(&mut self) {
        self.stop_ambient();
        self.stop_alarm();
    }

    /// Resolves when the current alarm has played to its natural end.
    /// Pending forever while the alarm slot is empty or not yet started.
    /// Cancel-safe.
    pub async fn alarm_finished(&mut self) {
        wait_finished(&mut self.alarm).await;
    }

    /// Release an alarm that finished on its own.
    pub fn reap_alarm(&mut self) {
        if let Some(slot) = self.alarm.take() {
            self.send(Request::Release { id: slot.id });
            debug!(voice = slot.id, "alarm completed and released");
        }
    }

    /// Wait for the next report from the audio service (a voice started,
    /// failed, or an alarm reached its end) and fold it into the slots.
    /// Cancel-safe.
    pub async fn device_update(&mut self) {
        tokio::select! {
            Some(notice) = self.notices.recv() => self.apply(notice),
            () = wait_finished(&mut self.alarm) => self.reap_alarm(),
        }
    }

    /// Apply every report the service has already sent, without waiting.
    pub fn apply_pending(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            self.apply(notice);
        }
    }

    /// Ask the service how many voices it holds once every request sent so
    /// far is applied. The reply is dropped if the service is gone.
    pub fn count_voices(&self, reply: oneshot::Sender<usize>) {
        self.send(Request::Count(reply));
    }

    /// Wait for the service to apply every request sent so far, fold its
    /// reports into the slots, and return the number of live device voices.
    pub async fn settle(&mut self) -> usize {
        let (reply, count) = oneshot::channel();
        self.count_voices(reply);
        let voices = count.await.unwrap_or_default();
        self.apply_pending();
        voices
    }

    /// Release every voice and wait for the audio service to exit.
    pub async fn close(mut self) {
        self.release_all();
        let service = self.service.take();
        drop(self);
        if let Some(service) = service {
            if let Err(e) = service.await {
                warn!(error = %e, "audio service ended abnormally");
            }
        }
    }

    pub fn has_ambient(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn has_alarm(&self) -> bool {
        self.alarm.is_some()
    }

    /// Number of occupied slots, counting requests the device has not
    /// answered yet.
    pub fn held(&self) -> usize {
        usize::from(self.has_ambient()) + usize::from(self.has_alarm())
    }

    fn allocate(&mut self) -> VoiceId {
        self.next_id += 1;
        self.next_id
    }

    fn send(&self, request: Request) {
        if self.requests.send(request).is_err() {
            warn!("audio service is gone, request dropped");
        }
    }

    fn apply(&mut self, notice: Notice) {
        match notice {
            Notice::Started { id, finished } => {
                if let Some(slot) = self.alarm.as_mut().filter(|slot| slot.id == id) {
                    slot.finished = finished;
                }
            }
            Notice::Failed { id } => {
                if self.ambient.as_ref().is_some_and(|slot| slot.id == id) {
                    self.ambient = None;
                }
                if self.alarm.as_ref().is_some_and(|slot| slot.id == id) {
                    self.alarm = None;
                }
            }
        }
    }
}

async fn wait_finished(slot: &mut Option<Slot>) {
    match slot.as_mut().and_then(|slot| slot.finished.as_mut()) {
        Some(finished) => {
            let _ = finished.await;
        }
        None => std::future::pending().await,
    }
}
