//! # System Bootstrap
//!
//! Wires the context, the main loop and the startup supervisor together and
//! hands back a [`SystemHandle`] for command access and shutdown.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::context::AutofulfillContext;
use super::cycle::{AutofulfillCycle, WorkUnit};
use super::main_loop::{MainLoop, MainLoopHandle};
use crate::clock::Clock;
use crate::config::AutofulfillConfig;
use crate::constants::MAIN_LOOP_CHANNEL_CAPACITY;
use crate::error::{AutofulfillError, Result};
use crate::gateway::ColonyGateway;
use crate::notification::Observers;
use crate::readiness::StartupSupervisor;

/// Running autofulfill system
#[derive(Debug)]
pub struct SystemHandle {
    main_loop: MainLoopHandle,
    loop_task: Option<JoinHandle<()>>,
    supervisor_task: Option<JoinHandle<u32>>,
    observers: Arc<Observers>,
}

impl SystemHandle {
    /// Entry point for commands
    pub fn main_loop(&self) -> &MainLoopHandle {
        &self.main_loop
    }

    pub fn observers(&self) -> &Arc<Observers> {
        &self.observers
    }

    pub fn is_running(&self) -> bool {
        self.loop_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Whether the startup supervisor has reached READY (or given up because
    /// the main loop went away).
    pub fn startup_finished(&self) -> bool {
        self.supervisor_task
            .as_ref()
            .map_or(true, |task| task.is_finished())
    }

    /// Stop the supervisor and the main loop and wait for the loop to exit.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(supervisor) = self.supervisor_task.take() {
            supervisor.abort();
        }

        let Some(loop_task) = self.loop_task.take() else {
            warn!("Autofulfill system already stopped");
            return Ok(());
        };

        match self.main_loop.shutdown().await {
            Ok(()) | Err(AutofulfillError::ChannelClosed(_)) => {}
            Err(e) => return Err(e),
        }

        loop_task
            .await
            .map_err(|e| AutofulfillError::Internal(format!("main loop task failed: {e}")))?;
        info!("Autofulfill system stopped");
        Ok(())
    }
}

pub struct AutofulfillSystem;

impl AutofulfillSystem {
    /// Start with the production work unit. Must be called inside a tokio
    /// runtime.
    pub fn start(
        config: &AutofulfillConfig,
        gateway: Arc<dyn ColonyGateway>,
        observers: Arc<Observers>,
        clock: Arc<dyn Clock>,
    ) -> SystemHandle {
        Self::start_with_work_unit(
            config,
            gateway,
            observers,
            clock,
            Box::new(AutofulfillCycle::new()),
        )
    }

    pub fn start_with_work_unit(
        config: &AutofulfillConfig,
        gateway: Arc<dyn ColonyGateway>,
        observers: Arc<Observers>,
        clock: Arc<dyn Clock>,
        work_unit: Box<dyn WorkUnit>,
    ) -> SystemHandle {
        info!(
            gateway = %gateway.name(),
            enabled = config.autofulfill.enabled,
            interval_seconds = config.autofulfill.check_time_seconds,
            "Starting autofulfill system"
        );

        let context = AutofulfillContext::new(config, gateway, Arc::clone(&observers), clock);
        let (main_loop, handle) = MainLoop::new(context, work_unit, MAIN_LOOP_CHANNEL_CAPACITY);
        let loop_task = main_loop.spawn();

        let supervisor = StartupSupervisor::new(
            handle.clone(),
            config.timing.startup_grace(),
            config.timing.readiness_retry(),
            config.timing.readiness_error_retry(),
        );
        let supervisor_task = supervisor.spawn();

        SystemHandle {
            main_loop: handle,
            loop_task: Some(loop_task),
            supervisor_task: Some(supervisor_task),
            observers,
        }
    }
}
