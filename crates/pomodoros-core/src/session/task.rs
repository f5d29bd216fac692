use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::audio::sound::{NONE, VIBRATION};
use crate::error::ValidationError;

/// A user-defined task: three phase durations, a repeat count and the
/// sounds played in each phase.
///
/// Read once when a session starts; the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub name: String,
    /// Focus duration in minutes.
    #[serde(default = "default_pomodoro_duration")]
    pub pomodoro_duration: u32,
    /// Short break duration in minutes.
    #[serde(default = "default_short_break_duration")]
    pub short_break_duration: u32,
    /// Long break duration in minutes.
    #[serde(default = "default_long_break_duration")]
    pub long_break_duration: u32,
    /// Number of focus phases before the long break.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    #[serde(default = "default_alarm")]
    pub pomodoro_alarm_sound: String,
    #[serde(default = "default_alarm")]
    pub short_break_alarm_sound: String,
    #[serde(default = "default_alarm")]
    pub long_break_alarm_sound: String,
    #[serde(default = "default_background")]
    pub pomodoro_background_sound: String,
    #[serde(default = "default_background")]
    pub short_break_background_sound: String,
    #[serde(default = "default_background")]
    pub long_break_background_sound: String,
    /// Display hint for front-ends.
    #[serde(default)]
    pub color: String,
}

fn default_pomodoro_duration() -> u32 {
    25
}
fn default_short_break_duration() -> u32 {
    5
}
fn default_long_break_duration() -> u32 {
    15
}
fn default_cycles() -> u32 {
    4
}
fn default_alarm() -> String {
    VIBRATION.into()
}
fn default_background() -> String {
    NONE.into()
}

impl TaskConfig {
    /// A task with the classic 25/5/15 x4 layout, vibration alarms and no
    /// ambient sound.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pomodoro_duration: default_pomodoro_duration(),
            short_break_duration: default_short_break_duration(),
            long_break_duration: default_long_break_duration(),
            cycles: default_cycles(),
            pomodoro_alarm_sound: default_alarm(),
            short_break_alarm_sound: default_alarm(),
            long_break_alarm_sound: default_alarm(),
            pomodoro_background_sound: default_background(),
            short_break_background_sound: default_background(),
            long_break_background_sound: default_background(),
            color: String::new(),
        }
    }

    pub fn with_durations(mut self, pomodoro: u32, short_break: u32, long_break: u32) -> Self {
        self.pomodoro_duration = pomodoro;
        self.short_break_duration = short_break;
        self.long_break_duration = long_break;
        self
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the alarm sound of every phase.
    pub fn with_alarm(mut self, sound: &str) -> Self {
        self.pomodoro_alarm_sound = sound.into();
        self.short_break_alarm_sound = sound.into();
        self.long_break_alarm_sound = sound.into();
        self
    }

    /// Set the ambient sound of every phase.
    pub fn with_background(mut self, sound: &str) -> Self {
        self.pomodoro_background_sound = sound.into();
        self.short_break_background_sound = sound.into();
        self.long_break_background_sound = sound.into();
        self
    }

    /// # Errors
    ///
    /// Returns an error if the name is blank or `cycles` is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "task name must not be empty".into(),
            });
        }
        if self.cycles == 0 {
            return Err(ValidationError::InvalidValue {
                field: "cycles".into(),
                message: "cycles must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Configured duration of a phase in minutes.
    pub fn duration_min(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.pomodoro_duration,
            Phase::ShortBreak => self.short_break_duration,
            Phase::LongBreak => self.long_break_duration,
        }
    }

    /// Configured duration of a phase in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_ms(&self, phase: Phase) -> u64 {
        u64::from(self.duration_min(phase))
            .saturating_mul(60)
            .saturating_mul(1000)
    }

    pub fn alarm_sound(&self, phase: Phase) -> &str {
        match phase {
            Phase::Focus => &self.pomodoro_alarm_sound,
            Phase::ShortBreak => &self.short_break_alarm_sound,
            Phase::LongBreak => &self.long_break_alarm_sound,
        }
    }

    pub fn background_sound(&self, phase: Phase) -> &str {
        match phase {
            Phase::Focus => &self.pomodoro_background_sound,
            Phase::ShortBreak => &self.short_break_background_sound,
            Phase::LongBreak => &self.long_break_background_sound,
        }
    }
}
