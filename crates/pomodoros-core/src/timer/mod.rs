mod scheduler;

pub use scheduler::{SchedulerEvent, TickScheduler, DEFAULT_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};
