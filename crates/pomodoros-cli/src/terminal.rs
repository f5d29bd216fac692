//! Terminal stand-ins for the platform audio device and the running indicator.

use std::io::Write;
use std::time::Duration;

use pomodoros_core::{AudioError, AudioOutput, PlayMode, Playback, SessionIndicator, Sound, Voice};
use tokio::sync::oneshot;
use tracing::{debug, info};

/// How long a terminal alarm "rings" before it reports natural completion.
const ALARM_RING: Duration = Duration::from_secs(2);

/// Rings the terminal bell for alarms and logs ambient loops.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalOutput;

struct TerminalVoice {
    label: String,
}

impl Voice for TerminalVoice {
    fn release(&mut self) {
        debug!(voice = %self.label, "released");
    }
}

impl AudioOutput for TerminalOutput {
    fn play(&mut self, sound: Sound, mode: PlayMode, gain: f32) -> Result<Playback, AudioError> {
        let playback = Playback::new(TerminalVoice {
            label: sound.to_string(),
        });
        match mode {
            PlayMode::Looping => {
                info!(%sound, gain, "ambient loop");
                Ok(playback)
            }
            PlayMode::OneShot => {
                info!(%sound, gain, "alarm");
                bell();
                Ok(playback.with_completion(finish_after(ALARM_RING)))
            }
        }
    }

    fn vibrate(&mut self, duration: Duration) -> Result<Playback, AudioError> {
        info!(?duration, "vibrate");
        bell();
        Ok(Playback::new(TerminalVoice {
            label: "Vibration".into(),
        })
        .with_completion(finish_after(duration)))
    }
}

fn bell() {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

/// Device calls arrive on a blocking-pool thread, so the ring timer gets its own thread.
fn finish_after(duration: Duration) -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    std::thread::spawn(move || {
        std::thread::sleep(duration);
        let _ = tx.send(());
    });
    rx
}

/// Reports the running session on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalIndicator;

impl SessionIndicator for TerminalIndicator {
    fn show(&self, task_name: &str) {
        eprintln!("timer running: {task_name}");
    }

    fn clear(&self) {
        eprintln!("timer stopped");
    }
}
