use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Phase;

/// Every observable change of the active session produces an Event.
/// Front-ends receive them through the observer bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        task: String,
        cycles: u32,
        at: DateTime<Utc>,
    },
    /// A phase countdown began. `remaining_ms` is the full phase duration.
    PhaseStarted {
        phase: Phase,
        cycle_index: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    Tick {
        phase: Phase,
        cycle_index: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran to zero and its alarm was requested.
    PhaseCompleted {
        phase: Phase,
        cycle_index: u32,
        alarm: String,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: Phase,
        cycle_index: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        phase: Phase,
        cycle_index: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Terminal event: the long break completed.
    SessionFinished {
        task: String,
        at: DateTime<Utc>,
    },
    SessionStopped {
        task: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Remaining time carried by progress events.
    pub fn remaining_ms(&self) -> Option<u64> {
        match self {
            Event::PhaseStarted { remaining_ms, .. }
            | Event::Tick { remaining_ms, .. }
            | Event::SessionPaused { remaining_ms, .. }
            | Event::SessionResumed { remaining_ms, .. } => Some(*remaining_ms),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionFinished { .. } | Event::SessionStopped { .. })
    }
}
