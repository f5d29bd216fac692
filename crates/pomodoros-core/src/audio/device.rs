//! Background audio service.
//!
//! Device calls can be slow, so they never run on the orchestrator's task.
//! The [`AudioResourceManager`](super::AudioResourceManager) sends
//! [`Request`]s over a channel to a [`DeviceService`] task, which performs
//! each call on the blocking pool and owns every live [`Playback`]. Requests
//! are applied strictly in the order they were sent.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::output::{AudioOutput, PlayMode, Playback};
use super::sound::Sound;
use crate::error::AudioError;

pub(crate) type VoiceId = u64;

pub(crate) enum Request {
    Play {
        id: VoiceId,
        sound: Sound,
        mode: PlayMode,
        gain: f32,
    },
    Vibrate {
        id: VoiceId,
        duration: Duration,
    },
    Release {
        id: VoiceId,
    },
    /// Reply with the number of live voices once every earlier request is applied.
    Count(oneshot::Sender<usize>),
}

/// What the service reports back about a voice.
pub(crate) enum Notice {
    Started {
        id: VoiceId,
        finished: Option<oneshot::Receiver<()>>,
    },
    Failed {
        id: VoiceId,
    },
}

pub(crate) struct DeviceService {
    output: Option<Box<dyn AudioOutput>>,
    requests: mpsc::UnboundedReceiver<Request>,
    notices: mpsc::UnboundedSender<Notice>,
    voices: HashMap<VoiceId, Playback>,
}

impl DeviceService {
    pub(crate) fn new(
        output: Box<dyn AudioOutput>,
        requests: mpsc::UnboundedReceiver<Request>,
        notices: mpsc::UnboundedSender<Notice>,
    ) -> Self {
        Self {
            output: Some(output),
            requests,
            notices,
            voices: HashMap::new(),
        }
    }

    /// Serve requests until the manager hangs up, then release every voice.
    pub(crate) async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            match request {
                Request::Play {
                    id,
                    sound,
                    mode,
                    gain,
                } => {
                    let result = self.call(move |out| out.play(sound, mode, gain)).await;
                    self.started(id, result);
                }
                Request::Vibrate { id, duration } => {
                    let result = self.call(move |out| out.vibrate(duration)).await;
                    self.started(id, result);
                }
                Request::Release { id } => {
                    if let Some(playback) = self.voices.remove(&id) {
                        release(playback).await;
                    }
                }
                Request::Count(reply) => {
                    let _ = reply.send(self.voices.len());
                }
            }
        }
        for (_, playback) in self.voices.drain() {
            release(playback).await;
        }
        debug!("audio service exited");
    }

    /// Run one device call on the blocking pool.
    async fn call<F>(&mut self, f: F) -> Result<Playback, AudioError>
    where
        F: FnOnce(&mut dyn AudioOutput) -> Result<Playback, AudioError> + Send + 'static,
    {
        let Some(mut output) = self.output.take() else {
            return Err(AudioError::AudioResourceUnavailable(
                "audio device is gone".into(),
            ));
        };
        let joined = tokio::task::spawn_blocking(move || {
            let result = f(output.as_mut());
            (output, result)
        })
        .await;
        match joined {
            Ok((output, result)) => {
                self.output = Some(output);
                result
            }
            Err(e) => {
                warn!(error = %e, "audio device call panicked, audio disabled");
                Err(AudioError::AudioResourceUnavailable(e.to_string()))
            }
        }
    }

    fn started(&mut self, id: VoiceId, result: Result<Playback, AudioError>) {
        let notice = match result {
            Ok(mut playback) => {
                let finished = playback.take_completion();
                self.voices.insert(id, playback);
                Notice::Started { id, finished }
            }
            Err(e) => {
                warn!(error = %e, voice = id, "playback failed, continuing silently");
                Notice::Failed { id }
            }
        };
        let _ = self.notices.send(notice);
    }
}

/// Drop a playback on the blocking pool; its `Voice::release` is a device call.
async fn release(playback: Playback) {
    if let Err(e) = tokio::task::spawn_blocking(move || drop(playback)).await {
        warn!(error = %e, "audio release panicked");
    }
}
