//! Shared fakes for session integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use pomodoros_core::{
    AudioError, AudioOutput, Event, Observer, PlayMode, Playback, SessionIndicator, Sound,
    TaskConfig, Voice,
};
use tokio::sync::oneshot;

#[derive(Default)]
struct Recording {
    alarms: Vec<String>,
    ambients: Vec<String>,
    held: usize,
    pending_alarms: Vec<oneshot::Sender<()>>,
    unavailable: bool,
    latency: Duration,
}

/// Audio output that records requests and counts unreleased voices.
/// One-shot voices only complete when [`finish_alarms`] is called.
#[derive(Clone, Default)]
pub struct RecordingOutput {
    inner: Arc<Mutex<Recording>>,
}

struct RecordedVoice {
    inner: Arc<Mutex<Recording>>,
}

impl Voice for RecordedVoice {
    fn release(&mut self) {
        self.inner.lock().unwrap().held -= 1;
    }
}

impl RecordingOutput {
    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap()
    }

    pub fn alarms(&self) -> Vec<String> {
        self.lock().alarms.clone()
    }

    pub fn ambients(&self) -> Vec<String> {
        self.lock().ambients.clone()
    }

    /// Voices handed out and not yet released.
    pub fn held(&self) -> usize {
        self.lock().held
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Make every play and vibrate call block the calling thread for `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    fn stall(&self) {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
    }

    /// Let every playing alarm reach its natural end.
    pub fn finish_alarms(&self) {
        for done in self.lock().pending_alarms.drain(..) {
            let _ = done.send(());
        }
    }

    fn voice(&self, one_shot: bool) -> Playback {
        let mut recording = self.lock();
        recording.held += 1;
        let playback = Playback::new(RecordedVoice {
            inner: Arc::clone(&self.inner),
        });
        if one_shot {
            let (tx, rx) = oneshot::channel();
            recording.pending_alarms.push(tx);
            playback.with_completion(rx)
        } else {
            playback
        }
    }
}

impl AudioOutput for RecordingOutput {
    fn play(&mut self, sound: Sound, mode: PlayMode, _gain: f32) -> Result<Playback, AudioError> {
        self.stall();
        {
            let mut recording = self.lock();
            if recording.unavailable {
                return Err(AudioError::AudioResourceUnavailable("no device".into()));
            }
            match mode {
                PlayMode::Looping => recording.ambients.push(sound.to_string()),
                PlayMode::OneShot => recording.alarms.push(sound.to_string()),
            }
        }
        Ok(self.voice(mode == PlayMode::OneShot))
    }

    fn vibrate(&mut self, _duration: Duration) -> Result<Playback, AudioError> {
        self.stall();
        {
            let mut recording = self.lock();
            if recording.unavailable {
                return Err(AudioError::AudioResourceUnavailable("no motor".into()));
            }
            recording.alarms.push("Vibration".into());
        }
        Ok(self.voice(true))
    }
}

/// Indicator that records show/clear calls.
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingIndicator {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SessionIndicator for RecordingIndicator {
    fn show(&self, task_name: &str) {
        self.calls.lock().unwrap().push(format!("show:{task_name}"));
    }

    fn clear(&self) {
        self.calls.lock().unwrap().push("clear".into());
    }
}

/// A task with one-minute phases and distinct alarms per phase.
pub fn short_task(cycles: u32) -> TaskConfig {
    let mut task = TaskConfig::new("Deep work").with_durations(1, 1, 1).with_cycles(cycles);
    task.pomodoro_alarm_sound = "alarm1".into();
    task.short_break_alarm_sound = "alarm3".into();
    task.long_break_alarm_sound = "alarm4".into();
    task.pomodoro_background_sound = "background1".into();
    task.short_break_background_sound = "background2".into();
    task.long_break_background_sound = "background3".into();
    task
}

/// Receive events until the session finishes or stops.
pub async fn collect_until_end(observer: &mut Observer) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(event) = observer.recv().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

/// Receive events until one matches `pred`, returning it.
pub async fn wait_for(observer: &mut Observer, pred: impl Fn(&Event) -> bool) -> Event {
    loop {
        let event = observer.recv().await.expect("observer closed");
        if pred(&event) {
            return event;
        }
    }
}
