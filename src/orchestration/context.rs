//! State owned by the main loop.
//!
//! Everything here is mutated only from inside the main loop task, so none
//! of it needs locking. Other tasks reach it through
//! [`super::MainLoopHandle`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::{AutofulfillConfig, ConfigResult, PollerConfig, TimingConfig};
use crate::gateway::ColonyGateway;
use crate::notification::{MessageCategory, Notifier, Observers};
use crate::readiness::{Readiness, ReadinessGate};
use crate::stats::{Outcome, SessionCounters, StatsSnapshot};

/// Startup phase of the whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemPhase {
    /// Waiting for the colony surface to become ready
    Waiting,
    /// Gate passed and the poller has been armed
    Ready,
}

impl fmt::Display for SystemPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemPhase::Waiting => f.write_str("waiting"),
            SystemPhase::Ready => f.write_str("ready"),
        }
    }
}

pub struct AutofulfillContext {
    gateway: Arc<dyn ColonyGateway>,
    clock: Arc<dyn Clock>,
    poller_config: PollerConfig,
    timing: TimingConfig,
    counters: SessionCounters,
    notifier: Notifier,
    gate: ReadinessGate,
    phase: SystemPhase,
}

impl fmt::Debug for AutofulfillContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutofulfillContext")
            .field("gateway", &self.gateway.name())
            .field("poller_config", &self.poller_config)
            .field("counters", &self.counters)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl AutofulfillContext {
    pub fn new(
        config: &AutofulfillConfig,
        gateway: Arc<dyn ColonyGateway>,
        observers: Arc<Observers>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let poller_config = config.autofulfill.clone();
        let timing = config.timing.clone();

        Self {
            notifier: Notifier::new(
                observers,
                poller_config.interval(),
                timing.max_messages_per_category,
            ),
            counters: SessionCounters::new(now, timing.stats_reset_interval()),
            gate: ReadinessGate::new(now, timing.startup_grace()),
            gateway,
            clock,
            poller_config,
            timing,
            phase: SystemPhase::Waiting,
        }
    }

    pub fn gateway(&self) -> Arc<dyn ColonyGateway> {
        Arc::clone(&self.gateway)
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn poller_config(&self) -> &PollerConfig {
        &self.poller_config
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn phase(&self) -> SystemPhase {
        self.phase
    }

    /// Move to `Ready`. Returns false when already ready.
    pub fn mark_ready(&mut self) -> bool {
        if self.phase == SystemPhase::Ready {
            return false;
        }
        self.phase = SystemPhase::Ready;
        info!("Autofulfill system fully enabled");
        true
    }

    pub async fn check_readiness(&self) -> Readiness {
        self.gate.check(self.gateway.as_ref(), self.clock.now()).await
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.poller_config.enabled = enabled;
    }

    pub fn set_show_messages(&mut self, show: bool) {
        self.poller_config.show_in_game_messages = show;
    }

    /// Validate and apply a new poll interval. The throttle cooldown follows.
    pub fn set_interval(&mut self, seconds: u32) -> ConfigResult<u32> {
        let seconds = PollerConfig::validate_interval(seconds)?;
        self.poller_config.check_time_seconds = seconds;
        self.notifier
            .throttle_mut()
            .set_cooldown(self.poller_config.interval());
        Ok(seconds)
    }

    /// Reset counters and throttle together when the session window expired.
    pub fn begin_cycle(&mut self) -> bool {
        let now = self.clock.now();
        if self.counters.maybe_reset(now) {
            self.notifier.throttle_mut().clear();
            debug!("Notification throttle cleared for new session window");
            return true;
        }
        false
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.counters.record(outcome);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.counters.snapshot()
    }

    /// Offer a status line to the throttle and, if accepted, to observers.
    pub fn notify(&mut self, category: MessageCategory, message: &str) -> bool {
        let now = self.clock.now();
        let show = self.poller_config.show_in_game_messages;
        self.notifier.notify(show, category, message, now)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
