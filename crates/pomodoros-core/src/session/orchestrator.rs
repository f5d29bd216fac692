//! The session orchestrator.
//!
//! [`SessionOrchestrator`] is a cloneable handle to one background task that
//! owns every piece of mutable session state: the state machine, the tick
//! scheduler and the audio slots. Device calls are handed to a separate audio
//! service, so a slow device never delays a tick. Commands travel over a channel and each
//! call returns once the task has applied it, so a `pause` or `stop` has
//! taken effect before the caller continues and no later tick can escape.
//!
//! ## Event loop
//!
//! ```text
//! loop {
//!     command      -> start | pause | resume | restart | stop
//!     scheduler    -> tick | phase completed
//!     audio        -> voice started or failed | alarm ended, release
//! }
//! ```
//!
//! Commands win over a tick that is due at the same instant.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::machine::{PhaseContext, SessionStateMachine, Transition};
use super::state::{SessionState, Snapshot};
use super::task::TaskConfig;
use crate::audio::{AudioOutput, AudioResourceManager, SilentOutput};
use crate::bus::{Observer, ObserverBus};
use crate::error::{Result, SessionError};
use crate::events::Event;
use crate::indicator::{NoopIndicator, SessionIndicator};
use crate::prefs::{Preferences, VolumePreferences};
use crate::storage::Config;
use crate::timer::{SchedulerEvent, TickScheduler, DEFAULT_TICK_INTERVAL_MS};

/// Platform collaborators handed to the orchestrator task.
pub struct Services {
    output: Box<dyn AudioOutput>,
    prefs: Arc<dyn VolumePreferences>,
    indicator: Arc<dyn SessionIndicator>,
}

impl Services {
    pub fn new(output: impl AudioOutput) -> Self {
        Self {
            output: Box::new(output),
            prefs: Arc::new(Preferences::default()),
            indicator: Arc::new(NoopIndicator),
        }
    }

    pub fn with_preferences(mut self, prefs: Arc<dyn VolumePreferences>) -> Self {
        self.prefs = prefs;
        self
    }

    pub fn with_indicator(mut self, indicator: Arc<dyn SessionIndicator>) -> Self {
        self.indicator = indicator;
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(SilentOutput)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub tick_interval_ms: u64,
}

impl OrchestratorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval_ms: config.timer.tick_interval_ms,
        }
    }
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

type Reply<T = ()> = oneshot::Sender<std::result::Result<T, SessionError>>;

enum Command {
    Start(TaskConfig, Reply),
    Pause(Reply),
    Resume(Reply),
    Restart(Reply),
    Stop(Reply),
    HeldAudio(oneshot::Sender<usize>),
    Shutdown(Reply),
}

/// Handle to the background session task.
///
/// The task lives until [`shutdown`](Self::shutdown) is called or every
/// handle is dropped; both paths release all audio resources.
#[derive(Debug, Clone)]
pub struct SessionOrchestrator {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Option<Snapshot>>,
    bus: ObserverBus,
}

impl SessionOrchestrator {
    /// Spawn the session task, and the audio service behind it, on the
    /// current tokio runtime.
    pub fn spawn(services: Services, options: OrchestratorOptions) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(None);
        let bus = ObserverBus::new();

        let runtime = SessionRuntime {
            commands: command_rx,
            snapshot: snapshot_tx,
            bus: bus.clone(),
            audio: AudioResourceManager::from_boxed(services.output),
            scheduler: TickScheduler::new(),
            prefs: services.prefs,
            indicator: services.indicator,
            tick_interval_ms: options.tick_interval_ms,
            session: None,
            last_config: None,
        };
        tokio::spawn(runtime.run());

        Self {
            commands,
            snapshot,
            bus,
        }
    }

    /// Begin a session at `Focus(1)`.
    ///
    /// # Errors
    ///
    /// A validation error for a malformed config, or
    /// [`SessionError::AlreadyRunning`] if a session (running or paused)
    /// exists; the existing session is left untouched.
    pub async fn start(&self, config: TaskConfig) -> Result<()> {
        config.validate()?;
        self.request(|reply| Command::Start(config, reply)).await
    }

    /// Freeze the countdown and stop the ambient loop. A playing alarm is
    /// left to finish. No-op when paused or idle.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Shutdown`].
    pub async fn pause(&self) -> Result<()> {
        self.request(Command::Pause).await
    }

    /// Continue the current phase from exactly where it was paused.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveSession`] if there is nothing to resume.
    pub async fn resume(&self) -> Result<()> {
        self.request(Command::Resume).await
    }

    /// Stop, then start the last started task again from `Focus(1)`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveSession`] if no task was ever started.
    pub async fn restart(&self) -> Result<()> {
        self.request(Command::Restart).await
    }

    /// Cancel the countdown, release all audio and drop the session.
    /// Idempotent.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Shutdown`].
    pub async fn stop(&self) -> Result<()> {
        self.request(Command::Stop).await
    }

    /// Stop any session and end the background task.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Shutdown`], if the task is already gone.
    pub async fn shutdown(self) -> Result<()> {
        self.request(Command::Shutdown).await
    }

    /// Number of voices the audio device holds (ambient + alarm), counted
    /// once the audio service has applied every request made so far.
    ///
    /// # Errors
    ///
    /// Only [`SessionError::Shutdown`].
    pub async fn held_audio(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::HeldAudio(reply))
            .map_err(|_| SessionError::Shutdown)?;
        Ok(rx.await.map_err(|_| SessionError::Shutdown)?)
    }

    /// The active session as of the last applied change, without side effects.
    pub fn current_snapshot(&self) -> Option<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Attach an observer. It receives events from now on only.
    pub fn subscribe(&self) -> Observer {
        self.bus.attach()
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| SessionError::Shutdown)?;
        Ok(rx.await.map_err(|_| SessionError::Shutdown)??)
    }
}

struct ActiveSession {
    machine: SessionStateMachine,
    state: SessionState,
}

impl ActiveSession {
    fn snapshot(&self) -> Snapshot {
        let config = self.machine.config();
        Snapshot {
            task: config.name.clone(),
            phase: self.state.phase,
            cycle_index: self.state.cycle_index,
            cycles: config.cycles,
            remaining_ms: self.state.remaining_ms,
            running: self.state.running,
        }
    }
}

/// The serialized execution context. Sole writer of session and audio state.
struct SessionRuntime {
    commands: mpsc::UnboundedReceiver<Command>,
    snapshot: watch::Sender<Option<Snapshot>>,
    bus: ObserverBus,
    audio: AudioResourceManager,
    scheduler: TickScheduler,
    prefs: Arc<dyn VolumePreferences>,
    indicator: Arc<dyn SessionIndicator>,
    tick_interval_ms: u64,
    session: Option<ActiveSession>,
    last_config: Option<TaskConfig>,
}

impl SessionRuntime {
    async fn run(mut self) {
        let shutdown = loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown(reply)) => break Some(reply),
                    Some(command) => self.handle(command),
                    None => break None,
                },
                event = self.scheduler.next() => self.on_scheduler_event(event),
                () = self.audio.device_update() => {}
            }
        };
        self.stop();
        self.audio.close().await;
        if let Some(reply) = shutdown {
            let _ = reply.send(Ok(()));
        }
        debug!("session orchestrator exited");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(config, reply) => {
                let _ = reply.send(self.start(config));
            }
            Command::Pause(reply) => {
                self.pause();
                let _ = reply.send(Ok(()));
            }
            Command::Resume(reply) => {
                let _ = reply.send(self.resume());
            }
            Command::Restart(reply) => {
                let _ = reply.send(self.restart());
            }
            Command::Stop(reply) => {
                self.stop();
                let _ = reply.send(Ok(()));
            }
            Command::HeldAudio(reply) => {
                self.audio.count_voices(reply);
            }
            // answered by the event loop once audio is closed
            Command::Shutdown(_) => {}
        }
    }

    fn start(&mut self, config: TaskConfig) -> std::result::Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyRunning);
        }
        self.last_config = Some(config.clone());
        self.indicator.show(&config.name);
        self.bus.publish(&Event::SessionStarted {
            task: config.name.clone(),
            cycles: config.cycles,
            at: Utc::now(),
        });

        let mut ctx = PhaseContext {
            audio: &mut self.audio,
            scheduler: &mut self.scheduler,
            prefs: self.prefs.as_ref(),
            tick_interval_ms: self.tick_interval_ms,
        };
        let (machine, transition) = SessionStateMachine::begin(config, &mut ctx);
        let Transition::Entered {
            phase,
            cycle_index,
            duration_ms,
        } = transition
        else {
            // begin always enters Focus(1)
            return Ok(());
        };
        self.session = Some(ActiveSession {
            machine,
            state: SessionState {
                phase,
                cycle_index,
                remaining_ms: duration_ms,
                running: true,
            },
        });
        self.bus.publish(&Event::PhaseStarted {
            phase,
            cycle_index,
            remaining_ms: duration_ms,
            at: Utc::now(),
        });
        self.publish_snapshot();
        Ok(())
    }

    fn pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.state.running {
            return;
        }
        if let Some(remaining_ms) = self.scheduler.cancel() {
            session.state.remaining_ms = session.state.remaining_ms.min(remaining_ms);
        }
        session.state.running = false;
        self.audio.stop_ambient();
        info!(remaining_ms = session.state.remaining_ms, "session paused");
        self.bus.publish(&Event::SessionPaused {
            phase: session.state.phase,
            cycle_index: session.state.cycle_index,
            remaining_ms: session.state.remaining_ms,
            at: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn resume(&mut self) -> std::result::Result<(), SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoActiveSession)?;
        if session.state.running {
            return Ok(());
        }
        self.scheduler
            .start(session.state.remaining_ms, self.tick_interval_ms);
        session
            .machine
            .resume_ambient(&mut self.audio, self.prefs.as_ref());
        session.state.running = true;
        info!(remaining_ms = session.state.remaining_ms, "session resumed");
        self.bus.publish(&Event::SessionResumed {
            phase: session.state.phase,
            cycle_index: session.state.cycle_index,
            remaining_ms: session.state.remaining_ms,
            at: Utc::now(),
        });
        self.publish_snapshot();
        Ok(())
    }

    fn restart(&mut self) -> std::result::Result<(), SessionError> {
        let config = self
            .last_config
            .clone()
            .ok_or(SessionError::NoActiveSession)?;
        self.stop();
        self.start(config)
    }

    fn stop(&mut self) {
        self.scheduler.cancel();
        self.audio.release_all();
        let Some(session) = self.session.take() else {
            return;
        };
        self.indicator.clear();
        info!(task = %session.machine.config().name, "session stopped");
        self.bus.publish(&Event::SessionStopped {
            task: session.machine.config().name.clone(),
            at: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn on_scheduler_event(&mut self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::Tick { remaining_ms } => self.on_tick(remaining_ms),
            SchedulerEvent::Completed => self.on_phase_completed(),
        }
    }

    fn on_tick(&mut self, remaining_ms: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state.remaining_ms = remaining_ms;
        self.bus.publish(&Event::Tick {
            phase: session.state.phase,
            cycle_index: session.state.cycle_index,
            remaining_ms,
            at: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn on_phase_completed(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state.remaining_ms = 0;
        let mut ctx = PhaseContext {
            audio: &mut self.audio,
            scheduler: &mut self.scheduler,
            prefs: self.prefs.as_ref(),
            tick_interval_ms: self.tick_interval_ms,
        };
        let Some(completion) = session.machine.complete(&mut ctx) else {
            return;
        };
        self.bus.publish(&Event::PhaseCompleted {
            phase: completion.phase,
            cycle_index: completion.cycle_index,
            alarm: completion.alarm,
            at: Utc::now(),
        });

        match completion.next {
            Transition::Entered {
                phase,
                cycle_index,
                duration_ms,
            } => {
                session.state = SessionState {
                    phase,
                    cycle_index,
                    remaining_ms: duration_ms,
                    running: true,
                };
                self.bus.publish(&Event::PhaseStarted {
                    phase,
                    cycle_index,
                    remaining_ms: duration_ms,
                    at: Utc::now(),
                });
                self.publish_snapshot();
            }
            Transition::Finished => self.finish(),
        }
    }

    fn finish(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.indicator.clear();
        self.bus.publish(&Event::SessionFinished {
            task: session.machine.config().name.clone(),
            at: Utc::now(),
        });
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        self.snapshot
            .send_replace(self.session.as_ref().map(ActiveSession::snapshot));
    }
}
