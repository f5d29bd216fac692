use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Mutable state of the one active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    /// 1-based, always within `1..=cycles`.
    pub cycle_index: u32,
    /// Non-increasing while running, frozen while paused.
    pub remaining_ms: u64,
    pub running: bool,
}

/// Side-effect-free copy of the session state for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub task: String,
    pub phase: Phase,
    pub cycle_index: u32,
    pub cycles: u32,
    pub remaining_ms: u64,
    pub running: bool,
}

impl Snapshot {
    /// Remaining time truncated to whole seconds.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms / 1000
    }

    /// `MM:SS`, as shown on the timer face.
    pub fn display(&self) -> String {
        let secs = self.remaining_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
