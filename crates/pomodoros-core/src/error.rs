//! Core error types for pomodoros-core.
//!
//! Errors are grouped by the component that raises them. [`CoreError`]
//! is what the orchestrator handle returns: a [`SessionError`] or a
//! [`ValidationError`]. [`AudioError`] is recovered inside the audio layer
//! and [`ConfigError`] is returned as-is by the config file API.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomodoros-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Session lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `start` was called while a session (running or paused) exists.
    #[error("a session is already running")]
    AlreadyRunning,

    /// The operation needs an active session and there is none.
    #[error("no active session")]
    NoActiveSession,

    /// The orchestrator task has exited.
    #[error("session orchestrator has shut down")]
    Shutdown,
}

/// Audio and haptic device errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The sound id is not part of the catalogue.
    #[error("unknown sound id: {0}")]
    UnknownSoundId(String),

    /// The device refused to hand out an audio or haptic resource.
    #[error("audio resource unavailable: {0}")]
    AudioResourceUnavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The config directory could not be determined or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
