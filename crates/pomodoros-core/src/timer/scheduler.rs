//! Interruptible countdown for a single phase.
//!
//! The scheduler owns no thread and no task. The orchestrator polls
//! [`TickScheduler::next`] from its event loop; every deadline is computed
//! from the instant the countdown started, so late wake-ups never shift the
//! following ticks.
//!
//! ## Emission
//!
//! ```text
//! start(2500, 1000)  ->  Tick(1500) @1000, Tick(500) @2000, Completed @2500
//! start(2000, 1000)  ->  Tick(1000) @1000, Tick(0)   @2000, Completed @2000
//! start(0, 1000)     ->  Completed @0
//! ```

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
/// Smallest tick interval a config file may ask for.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Tick { remaining_ms: u64 },
    Completed,
}

#[derive(Debug, Clone)]
struct Countdown {
    started_at: Instant,
    total_ms: u64,
    interval_ms: u64,
    /// Ticks already delivered.
    ticks: u64,
}

impl Countdown {
    /// Offset of the next tick boundary, if it falls inside the countdown.
    fn next_boundary_ms(&self) -> Option<u64> {
        let offset = self.interval_ms.saturating_mul(self.ticks + 1);
        (offset <= self.total_ms).then_some(offset)
    }

    fn remaining_ms_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_millis();
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.total_ms.saturating_sub(elapsed)
    }
}

/// Drives one countdown at a time.
#[derive(Debug, Default)]
pub struct TickScheduler {
    countdown: Option<Countdown>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin counting down `total_ms`, replacing any active countdown.
    ///
    /// An interval of zero is clamped to one millisecond.
    pub fn start(&mut self, total_ms: u64, interval_ms: u64) {
        self.countdown = Some(Countdown {
            started_at: Instant::now(),
            total_ms,
            interval_ms: interval_ms.max(1),
            ticks: 0,
        });
    }

    /// Stop delivery. Returns the precise remaining time if a countdown was
    /// active; calling it again is a no-op.
    pub fn cancel(&mut self) -> Option<u64> {
        self.countdown
            .take()
            .map(|c| c.remaining_ms_at(Instant::now()))
    }

    pub fn is_active(&self) -> bool {
        self.countdown.is_some()
    }

    /// Remaining time of the active countdown at this instant.
    pub fn remaining_ms(&self) -> Option<u64> {
        self.countdown
            .as_ref()
            .map(|c| c.remaining_ms_at(Instant::now()))
    }

    /// Wait for the next tick or the completion of the active countdown.
    ///
    /// Never resolves while idle. Cancel-safe: dropping the future before it
    /// resolves leaves the countdown untouched.
    pub async fn next(&mut self) -> SchedulerEvent {
        let Some(countdown) = self.countdown.as_ref() else {
            return std::future::pending().await;
        };

        match countdown.next_boundary_ms() {
            Some(offset) => {
                let remaining_ms = countdown.total_ms - offset;
                sleep_until(countdown.started_at + Duration::from_millis(offset)).await;
                if let Some(countdown) = self.countdown.as_mut() {
                    countdown.ticks += 1;
                }
                SchedulerEvent::Tick { remaining_ms }
            }
            None => {
                sleep_until(countdown.started_at + Duration::from_millis(countdown.total_ms)).await;
                self.countdown = None;
                SchedulerEvent::Completed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(scheduler: &mut TickScheduler) -> Vec<SchedulerEvent> {
        let mut events = Vec::new();
        loop {
            let event = scheduler.next().await;
            events.push(event);
            if event == SchedulerEvent::Completed {
                return events;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_then_completes() {
        let mut scheduler = TickScheduler::new();
        scheduler.start(2500, 1000);
        let events = drain(&mut scheduler).await;
        assert_eq!(
            events,
            vec![
                SchedulerEvent::Tick { remaining_ms: 1500 },
                SchedulerEvent::Tick { remaining_ms: 500 },
                SchedulerEvent::Completed,
            ]
        );
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn aligned_duration_ends_with_zero_tick() {
        let mut scheduler = TickScheduler::new();
        scheduler.start(3000, 1000);
        let events = drain(&mut scheduler).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[2], SchedulerEvent::Tick { remaining_ms: 0 });
        assert_eq!(events[3], SchedulerEvent::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes_without_ticks() {
        let mut scheduler = TickScheduler::new();
        let before = Instant::now();
        scheduler.start(0, 1000);
        assert_eq!(scheduler.next().await, SchedulerEvent::Completed);
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_fire_on_absolute_deadlines() {
        let mut scheduler = TickScheduler::new();
        let start = Instant::now();
        scheduler.start(5000, 1000);
        for k in 1..=5u64 {
            scheduler.next().await;
            assert_eq!(Instant::now() - start, Duration::from_millis(k * 1000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_reports_precise_remaining_and_is_idempotent() {
        let mut scheduler = TickScheduler::new();
        scheduler.start(10_000, 1000);
        tokio::time::advance(Duration::from_millis(2_345)).await;
        assert_eq!(scheduler.cancel(), Some(7_655));
        assert_eq!(scheduler.cancel(), None);
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_scheduler_never_resolves() {
        let mut scheduler = TickScheduler::new();
        let waited =
            tokio::time::timeout(Duration::from_secs(60), scheduler.next()).await;
        assert!(waited.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn start_replaces_active_countdown() {
        let mut scheduler = TickScheduler::new();
        scheduler.start(60_000, 1000);
        scheduler.start(1500, 1000);
        let events = drain(&mut scheduler).await;
        assert_eq!(
            events,
            vec![SchedulerEvent::Tick { remaining_ms: 500 }, SchedulerEvent::Completed]
        );
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut scheduler = TickScheduler::new();
        scheduler.start(10, 0);
        assert_eq!(scheduler.countdown.as_ref().map(|c| c.interval_ms), Some(1));
    }
}
