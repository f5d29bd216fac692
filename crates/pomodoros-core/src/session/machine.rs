//! Phase and cycle logic.
//!
//! ## Transitions
//!
//! ```text
//! Focus(i) --(i < cycles)--> ShortBreak(i) --> Focus(i+1)
//! Focus(cycles) --> LongBreak --> Finished
//! ```
//!
//! Transitions happen only when the scheduler reports completion. On
//! completion the next countdown starts first. Only then is audio requested:
//! the ended phase's alarm, followed by the next phase's ambient loop in place
//! of the old one.

use tracing::info;

use super::phase::{Phase, Stage};
use super::task::TaskConfig;
use crate::audio::AudioResourceManager;
use crate::prefs::VolumePreferences;
use crate::timer::TickScheduler;

/// The collaborators a phase entry drives.
pub struct PhaseContext<'a> {
    pub audio: &'a mut AudioResourceManager,
    pub scheduler: &'a mut TickScheduler,
    pub prefs: &'a dyn VolumePreferences,
    pub tick_interval_ms: u64,
}

/// Outcome of entering a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered {
        phase: Phase,
        cycle_index: u32,
        duration_ms: u64,
    },
    Finished,
}

/// A phase that ran to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub phase: Phase,
    pub cycle_index: u32,
    pub alarm: String,
    pub next: Transition,
}

#[derive(Debug)]
pub struct SessionStateMachine {
    config: TaskConfig,
    stage: Stage,
}

impl SessionStateMachine {
    /// Enter `Focus(1)`.
    pub fn begin(config: TaskConfig, ctx: &mut PhaseContext<'_>) -> (Self, Transition) {
        let mut machine = Self {
            config,
            stage: Stage::Focus(1),
        };
        info!(task = %machine.config.name, cycles = machine.config.cycles, "session begins");
        let transition = machine.enter(ctx);
        machine.swap_ambient(ctx);
        (machine, transition)
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn cycle_index(&self) -> u32 {
        self.stage.cycle_index(self.config.cycles)
    }

    /// Handle the end of the current countdown. `None` once finished.
    pub fn complete(&mut self, ctx: &mut PhaseContext<'_>) -> Option<Completion> {
        let phase = self.stage.phase()?;
        let cycle_index = self.cycle_index();
        let alarm = self.config.alarm_sound(phase).to_string();

        let from = self.stage;
        self.stage = self.stage.next(self.config.cycles);
        info!(%from, to = %self.stage, "phase completed");
        let next = self.enter(ctx);
        ctx.audio.play_alarm(&alarm, ctx.prefs.alarm_volume());
        self.swap_ambient(ctx);
        Some(Completion {
            phase,
            cycle_index,
            alarm,
            next,
        })
    }

    /// Restart the current phase's ambient loop after a pause.
    pub fn resume_ambient(&self, audio: &mut AudioResourceManager, prefs: &dyn VolumePreferences) {
        if let Some(phase) = self.stage.phase() {
            audio.play_ambient(self.config.background_sound(phase), prefs.ambient_volume());
        }
    }

    /// Start the countdown of the current stage.
    fn enter(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        let Some(phase) = self.stage.phase() else {
            info!(task = %self.config.name, "session finished");
            return Transition::Finished;
        };
        let duration_ms = self.config.duration_ms(phase);
        ctx.scheduler.start(duration_ms, ctx.tick_interval_ms);
        Transition::Entered {
            phase,
            cycle_index: self.cycle_index(),
            duration_ms,
        }
    }

    fn swap_ambient(&self, ctx: &mut PhaseContext<'_>) {
        match self.stage.phase() {
            Some(phase) => ctx
                .audio
                .play_ambient(self.config.background_sound(phase), ctx.prefs.ambient_volume()),
            None => ctx.audio.stop_ambient(),
        }
    }
}
