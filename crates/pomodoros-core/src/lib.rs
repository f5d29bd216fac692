//! # Pomodoros Core Library
//!
//! The session orchestrator behind the Pomodoros focus timer. A host (the
//! CLI, a desktop shell, a mobile wrapper) starts a session from a
//! [`TaskConfig`] and attaches observers; the orchestrator owns the countdown
//! from then on, independent of any front-end's lifetime.
//!
//! ## Architecture
//!
//! - **Audio**: [`AudioResourceManager`] keeps one ambient loop and one
//!   alarm slot, each released before it is refilled; device calls run on a
//!   background audio service
//! - **Timer**: [`TickScheduler`] drives a drift-free countdown for the
//!   current phase
//! - **Session**: [`SessionStateMachine`] walks Focus / Short Break /
//!   Long Break; [`SessionOrchestrator`] serializes every mutation on one
//!   background task
//! - **Bus**: [`ObserverBus`] pushes [`Event`]s to any number of observers
//! - **Storage**: TOML [`Config`] holding preferences and task definitions

pub mod audio;
pub mod bus;
pub mod error;
pub mod events;
pub mod indicator;
pub mod prefs;
pub mod session;
pub mod storage;
pub mod timer;

pub use audio::{AudioOutput, AudioResourceManager, PlayMode, Playback, SilentOutput, Sound, Voice};
pub use bus::{Observer, ObserverBus, ObserverId};
pub use error::{AudioError, ConfigError, CoreError, SessionError, ValidationError};
pub use events::Event;
pub use indicator::{NoopIndicator, SessionIndicator};
pub use prefs::{Preferences, VolumePreferences};
pub use session::{
    OrchestratorOptions, Phase, Services, SessionOrchestrator, SessionState,
    SessionStateMachine, Snapshot, Stage, TaskConfig,
};
pub use storage::Config;
pub use timer::{SchedulerEvent, TickScheduler};
