//! Fixed-interval schedule feeding ticks into the main loop.
//!
//! The timer task never runs work itself. It posts `Tick { generation }`
//! into the main loop inbox; the main loop ignores ticks whose generation is
//! not the current one. Ticks are coalesced per schedule: while one is
//! waiting in the inbox the timer does not queue another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::main_loop::LoopCommand;

const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// The live recurring task.
#[derive(Debug)]
pub struct ScheduleHandle {
    generation: u64,
    interval: Duration,
    tick_pending: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_live(&self) -> bool {
        !self.task.is_finished()
    }

    fn cancel(self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub struct Poller {
    inbox: mpsc::WeakSender<LoopCommand>,
    current: Option<ScheduleHandle>,
    generation: u64,
    arm_count: u32,
}

impl Poller {
    /// The poller holds only a weak sender so the inbox closes once every
    /// external handle is gone.
    pub fn new(inbox: &mpsc::Sender<LoopCommand>) -> Self {
        Self {
            inbox: inbox.downgrade(),
            current: None,
            generation: 0,
            arm_count: 0,
        }
    }

    /// Arm the recurring task. The first tick fires after `initial_delay`,
    /// then every `interval`.
    pub fn schedule(&mut self, initial_delay: Duration, interval: Duration) {
        self.arm_count += 1;
        info!(
            initial_delay_ms = initial_delay.as_millis() as u64,
            interval_seconds = interval.as_secs(),
            "Arming autofulfill poller"
        );
        self.spawn_schedule(initial_delay, interval);
    }

    /// Replace the current schedule with one at `interval`, starting now.
    /// An in-flight tick is not interrupted.
    pub fn reschedule(&mut self, interval: Duration) {
        info!(interval_seconds = interval.as_secs(), "Rescheduling autofulfill poller");
        self.spawn_schedule(Duration::ZERO, interval);
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            debug!(generation = handle.generation, "Cancelling poller schedule");
            handle.cancel();
        }
    }

    fn spawn_schedule(&mut self, initial_delay: Duration, interval: Duration) {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let inbox = self.inbox.clone();
        let tick_pending = Arc::new(AtomicBool::new(false));
        let task_pending = Arc::clone(&tick_pending);

        let task = tokio::spawn(async move {
            tokio::time::sleep(initial_delay).await;

            let mut ticker = tokio::time::interval(interval.max(MIN_TICK_PERIOD));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if task_pending.swap(true, Ordering::AcqRel) {
                    debug!(generation = generation, "Previous tick still queued, coalescing");
                    continue;
                }

                let Some(sender) = inbox.upgrade() else {
                    break;
                };
                if sender.send(LoopCommand::Tick { generation }).await.is_err() {
                    break;
                }
            }
            debug!(generation = generation, "Poller schedule stopped");
        });

        self.current = Some(ScheduleHandle {
            generation,
            interval,
            tick_pending,
            task,
        });
    }

    /// Called by the main loop when it pops a tick. Returns whether the tick
    /// belongs to the live schedule.
    pub fn accept_tick(&self, generation: u64) -> bool {
        match &self.current {
            Some(handle) if handle.generation == generation => {
                handle.tick_pending.store(false, Ordering::Release);
                true
            }
            _ => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.current.is_some()
    }

    /// Number of schedules currently held; never more than one.
    pub fn handle_count(&self) -> usize {
        usize::from(self.current.as_ref().is_some_and(ScheduleHandle::is_live))
    }

    pub fn current_interval(&self) -> Option<Duration> {
        self.current.as_ref().map(ScheduleHandle::interval)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// How many times [`Poller::schedule`] armed the poller.
    pub fn arm_count(&self) -> u32 {
        self.arm_count
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}
