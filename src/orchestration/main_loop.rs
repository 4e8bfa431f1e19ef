//! # Main Loop
//!
//! Single consumer of the autofulfill inbox. Every state mutation (config,
//! counters, throttle, gateway writes) happens here, one command at a time,
//! so a work unit can never run concurrently with itself or with a command.
//!
//! Timer tasks and command callers only post [`LoopCommand`]s; callers that
//! need an answer wait on the oneshot responder carried by the command.

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::context::{AutofulfillContext, SystemPhase};
use super::cycle::{CycleContext, CycleReport, CycleStatus, CycleTrigger, WorkUnit};
use super::listing::{collect_requests, RequestListing};
use super::poller::Poller;
use crate::error::{AutofulfillError, Result};
use crate::logging::{log_cycle_operation, log_error};
use crate::notification::MessageCategory;
use crate::readiness::Readiness;
use crate::stats::StatsSnapshot;

/// Responder carried by commands that expect an answer
pub type CommandResponder<T> = oneshot::Sender<Result<T>>;

#[derive(Debug)]
pub enum LoopCommand {
    /// Evaluate the readiness gate; arms the poller on the first pass
    CheckReadiness {
        resp: CommandResponder<Readiness>,
    },
    /// Scheduled tick from the poller task with the given generation
    Tick { generation: u64 },
    /// Run one cycle out of band
    Trigger {
        resp: CommandResponder<CycleReport>,
    },
    SetEnabled {
        enabled: bool,
        resp: CommandResponder<()>,
    },
    /// Validate and apply a new interval; reschedules when armed
    SetInterval {
        seconds: u32,
        resp: CommandResponder<u32>,
    },
    SetShowMessages {
        show: bool,
        resp: CommandResponder<()>,
    },
    GetStatus {
        resp: CommandResponder<SystemStatus>,
    },
    GetStats {
        resp: CommandResponder<StatsSnapshot>,
    },
    ListRequests {
        resp: CommandResponder<RequestListing>,
    },
    Shutdown {
        resp: CommandResponder<()>,
    },
}

/// Current configuration and scheduler state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub phase: SystemPhase,
    pub enabled: bool,
    pub check_time_seconds: u32,
    pub show_in_game_messages: bool,
    pub poller_armed: bool,
    /// Recurring timer tasks alive right now; at most one
    pub live_schedules: usize,
    pub schedule_generation: u64,
    pub arm_count: u32,
    pub cycles_run: u64,
}

/// Cloneable entry point for posting into the main loop.
#[derive(Debug, Clone)]
pub struct MainLoopHandle {
    sender: mpsc::Sender<LoopCommand>,
}

impl MainLoopHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(CommandResponder<T>) -> LoopCommand,
    ) -> Result<T> {
        let (resp, rx) = oneshot::channel();
        self.sender.send(build(resp)).await?;
        rx.await?
    }

    pub async fn check_readiness(&self) -> Result<Readiness> {
        self.request(|resp| LoopCommand::CheckReadiness { resp }).await
    }

    pub async fn trigger(&self) -> Result<CycleReport> {
        self.request(|resp| LoopCommand::Trigger { resp }).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.request(|resp| LoopCommand::SetEnabled { enabled, resp })
            .await
    }

    pub async fn set_interval(&self, seconds: u32) -> Result<u32> {
        self.request(|resp| LoopCommand::SetInterval { seconds, resp })
            .await
    }

    pub async fn set_show_messages(&self, show: bool) -> Result<()> {
        self.request(|resp| LoopCommand::SetShowMessages { show, resp })
            .await
    }

    pub async fn status(&self) -> Result<SystemStatus> {
        self.request(|resp| LoopCommand::GetStatus { resp }).await
    }

    pub async fn stats(&self) -> Result<StatsSnapshot> {
        self.request(|resp| LoopCommand::GetStats { resp }).await
    }

    pub async fn list_requests(&self) -> Result<RequestListing> {
        self.request(|resp| LoopCommand::ListRequests { resp }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.request(|resp| LoopCommand::Shutdown { resp }).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

pub struct MainLoop {
    context: AutofulfillContext,
    work_unit: Box<dyn WorkUnit>,
    poller: Poller,
    inbox: mpsc::Receiver<LoopCommand>,
    cycles_run: u64,
}

impl MainLoop {
    pub fn new(
        context: AutofulfillContext,
        work_unit: Box<dyn WorkUnit>,
        capacity: usize,
    ) -> (Self, MainLoopHandle) {
        let (sender, inbox) = mpsc::channel(capacity);
        let poller = Poller::new(&sender);

        info!(
            work_unit = %work_unit.name(),
            capacity = capacity,
            "Creating autofulfill main loop"
        );

        let main_loop = Self {
            context,
            work_unit,
            poller,
            inbox,
            cycles_run: 0,
        };
        (main_loop, MainLoopHandle { sender })
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Starting autofulfill main loop");

        while let Some(command) = self.inbox.recv().await {
            if !self.handle_command(command).await {
                break;
            }
        }

        self.poller.cancel();
        info!(cycles_run = self.cycles_run, "Autofulfill main loop stopped");
    }

    async fn handle_command(&mut self, command: LoopCommand) -> bool {
        match command {
            LoopCommand::CheckReadiness { resp } => {
                let readiness = self.handle_check_readiness().await;
                let _ = resp.send(Ok(readiness));
            }
            LoopCommand::Tick { generation } => {
                if self.poller.accept_tick(generation) {
                    self.run_cycle(CycleTrigger::Scheduled).await;
                } else {
                    debug!(
                        generation = generation,
                        current = self.poller.generation(),
                        "Ignoring tick from replaced schedule"
                    );
                }
            }
            LoopCommand::Trigger { resp } => {
                let report = self.run_cycle(CycleTrigger::Manual).await;
                let _ = resp.send(Ok(report));
            }
            LoopCommand::SetEnabled { enabled, resp } => {
                self.context.set_enabled(enabled);
                info!(enabled = enabled, "Autofulfill enabled flag changed");
                let _ = resp.send(Ok(()));
            }
            LoopCommand::SetInterval { seconds, resp } => {
                let result = self.handle_set_interval(seconds);
                let _ = resp.send(result);
            }
            LoopCommand::SetShowMessages { show, resp } => {
                self.context.set_show_messages(show);
                info!(show_in_game_messages = show, "In-game messages flag changed");
                let _ = resp.send(Ok(()));
            }
            LoopCommand::GetStatus { resp } => {
                let _ = resp.send(Ok(self.status()));
            }
            LoopCommand::GetStats { resp } => {
                let _ = resp.send(Ok(self.context.stats()));
            }
            LoopCommand::ListRequests { resp } => {
                let gateway = self.context.gateway();
                let _ = resp.send(collect_requests(gateway.as_ref()).await);
            }
            LoopCommand::Shutdown { resp } => {
                info!("Shutting down autofulfill main loop");
                let _ = resp.send(Ok(()));
                return false;
            }
        }
        true
    }

    async fn handle_check_readiness(&mut self) -> Readiness {
        let readiness = self.context.check_readiness().await;
        if readiness.is_ready() && self.context.mark_ready() {
            self.context
                .notify(MessageCategory::Info, "Autofulfill system started");
            let initial_delay = self.context.timing().initial_poll_delay();
            let interval = self.context.poller_config().interval();
            self.poller.schedule(initial_delay, interval);
        }
        readiness
    }

    fn handle_set_interval(&mut self, seconds: u32) -> Result<u32> {
        let seconds = self.context.set_interval(seconds)?;
        if self.poller.is_armed() {
            self.poller.reschedule(self.context.poller_config().interval());
        }
        info!(interval_seconds = seconds, "Autofulfill interval changed");
        Ok(seconds)
    }

    fn status(&self) -> SystemStatus {
        let config = self.context.poller_config();
        SystemStatus {
            phase: self.context.phase(),
            enabled: config.enabled,
            check_time_seconds: config.check_time_seconds,
            show_in_game_messages: config.show_in_game_messages,
            poller_armed: self.poller.is_armed(),
            live_schedules: self.poller.handle_count(),
            schedule_generation: self.poller.generation(),
            arm_count: self.poller.arm_count(),
            cycles_run: self.cycles_run,
        }
    }

    /// Run the work unit once. Errors and panics are contained here and
    /// never reach the schedule.
    async fn run_cycle(&mut self, trigger: CycleTrigger) -> CycleReport {
        if !self.context.poller_config().enabled {
            debug!(trigger = %trigger, "Autofulfill disabled, skipping cycle");
            return CycleReport::new(trigger, CycleStatus::Disabled);
        }

        self.context.begin_cycle();
        self.cycles_run += 1;

        let result = {
            let mut ctx = CycleContext::new(&mut self.context, trigger);
            AssertUnwindSafe(self.work_unit.run(&mut ctx))
                .catch_unwind()
                .await
        };

        let report = match result {
            Ok(Ok(report)) => report,
            Ok(Err(cycle_error)) => {
                self.handle_cycle_error(&cycle_error);
                CycleReport::new(trigger, CycleStatus::Failed(cycle_error.to_string()))
            }
            Err(panic_payload) => {
                let panic_msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!(
                    work_unit = %self.work_unit.name(),
                    panic_msg = %panic_msg,
                    "Work unit panicked"
                );
                let cycle_error =
                    AutofulfillError::Internal(format!("work unit panicked: {panic_msg}"));
                self.handle_cycle_error(&cycle_error);
                CycleReport::new(trigger, CycleStatus::Failed(cycle_error.to_string()))
            }
        };

        debug!(cycle_id = %report.cycle_id, status = ?report.status, "Cycle finished");
        log_cycle_operation(
            &trigger.to_string(),
            report.colonies,
            report.outcomes.processed,
            report.outcomes.succeeded,
            report.outcomes.failed,
            report.outcomes.skipped,
            report.duration.as_millis() as u64,
        );
        report
    }

    fn handle_cycle_error(&mut self, cycle_error: &AutofulfillError) {
        log_error(
            "main_loop",
            "run_cycle",
            &cycle_error.to_string(),
            Some(self.work_unit.name()),
        );
        if !cycle_error.is_transient() {
            self.context.notify(
                MessageCategory::Error,
                &format!("Autofulfill error: {cycle_error}"),
            );
        }
    }
}
