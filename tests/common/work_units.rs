use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use autofulfill_core::error::{AutofulfillError, Result};
use autofulfill_core::orchestration::{CycleContext, CycleReport, CycleStatus, WorkUnit};
use autofulfill_core::stats::Outcome;

/// What a scripted run does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Succeed,
    Fail,
    Panic,
}

/// Counters shared between a [`ScriptedWorkUnit`] and the test body
#[derive(Debug, Default)]
pub struct RunProbe {
    runs: AtomicU32,
    completed: AtomicU32,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RunProbe {
    pub fn runs(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight(Arc<RunProbe>);

impl InFlight {
    fn enter(probe: &Arc<RunProbe>) -> Self {
        let now = probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(Arc::clone(probe))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Work unit that follows a per-run script and succeeds once the script
/// runs out. Each successful run records one succeeded request.
#[derive(Debug)]
pub struct ScriptedWorkUnit {
    script: Vec<Step>,
    hold: Duration,
    probe: Arc<RunProbe>,
}

impl ScriptedWorkUnit {
    pub fn new(script: Vec<Step>) -> (Self, Arc<RunProbe>) {
        Self::holding(script, Duration::ZERO)
    }

    /// Like `new`, but every run sleeps for `hold` before finishing.
    pub fn holding(script: Vec<Step>, hold: Duration) -> (Self, Arc<RunProbe>) {
        let probe = Arc::new(RunProbe::default());
        let unit = Self {
            script,
            hold,
            probe: Arc::clone(&probe),
        };
        (unit, probe)
    }
}

#[async_trait]
impl WorkUnit for ScriptedWorkUnit {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(&mut self, ctx: &mut CycleContext<'_>) -> Result<CycleReport> {
        let run = self.probe.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight::enter(&self.probe);

        if !self.hold.is_zero() {
            tokio::time::sleep(self.hold).await;
        }

        let step = self
            .script
            .get(run as usize - 1)
            .copied()
            .unwrap_or(Step::Succeed);

        match step {
            Step::Succeed => {
                ctx.record(Outcome::Succeeded);
                self.probe.completed.fetch_add(1, Ordering::SeqCst);
                Ok(ctx.report(CycleStatus::Completed))
            }
            Step::Fail => Err(AutofulfillError::DependencyShapeMismatch(format!(
                "scripted failure on run {run}"
            ))),
            Step::Panic => panic!("scripted panic on run {run}"),
        }
    }
}
