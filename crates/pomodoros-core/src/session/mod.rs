mod machine;
mod orchestrator;
mod phase;
mod state;
mod task;

pub use machine::{Completion, PhaseContext, SessionStateMachine, Transition};
pub use orchestrator::{OrchestratorOptions, Services, SessionOrchestrator};
pub use phase::{Phase, Stage};
pub use state::{SessionState, Snapshot};
pub use task::TaskConfig;
