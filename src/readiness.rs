//! # Readiness
//!
//! [`ReadinessGate`] answers "is the colony surface safe to touch yet".
//! [`StartupSupervisor`] drives the WAITING -> READY transition by asking the
//! main loop to evaluate the gate on a fixed backoff until it passes.

use std::fmt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::gateway::{ColonyGateway, GatewayError};
use crate::orchestration::MainLoopHandle;

/// Outcome of one gate evaluation. Only `Ready` lets work proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// Startup grace has not elapsed yet
    Grace { remaining: Duration },
    /// The surface exists but is still initialising
    NotReady(String),
    /// The top-level handle cannot be resolved
    Unavailable(String),
    /// The handle resolved but a basic read through it misbehaved
    Malformed(String),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }

    /// Malformed dependencies get the longer retry delay.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Readiness::Malformed(_))
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Ready => f.write_str("ready"),
            Readiness::Grace { remaining } => {
                write!(f, "startup grace ({}s remaining)", remaining.as_secs())
            }
            Readiness::NotReady(reason) => write!(f, "not ready: {reason}"),
            Readiness::Unavailable(reason) => write!(f, "unavailable: {reason}"),
            Readiness::Malformed(reason) => write!(f, "malformed: {reason}"),
        }
    }
}

/// Time- and probe-gated readiness check. Has no side effects of its own.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    started_at: Instant,
    startup_grace: Duration,
}

impl ReadinessGate {
    pub fn new(started_at: Instant, startup_grace: Duration) -> Self {
        Self {
            started_at,
            startup_grace,
        }
    }

    /// Evaluate the gate: grace period first, then the gateway probe.
    /// Every failure becomes a non-ready variant; nothing is raised.
    pub async fn check(&self, gateway: &dyn ColonyGateway, now: Instant) -> Readiness {
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed < self.startup_grace {
            return Readiness::Grace {
                remaining: self.startup_grace - elapsed,
            };
        }

        match gateway.probe().await {
            Ok(()) => Readiness::Ready,
            Err(GatewayError::NotReady(reason)) => Readiness::NotReady(reason),
            Err(GatewayError::Unavailable(reason)) => Readiness::Unavailable(reason),
            Err(GatewayError::ShapeMismatch(reason)) => Readiness::Malformed(reason),
        }
    }

    pub async fn is_ready(&self, gateway: &dyn ColonyGateway, now: Instant) -> bool {
        self.check(gateway, now).await.is_ready()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Background task that waits out the startup grace and then polls the
/// main loop's readiness check until it reports ready.
///
/// It only posts into the main loop; arming the poller happens there, once.
#[derive(Debug, Clone)]
pub struct StartupSupervisor {
    handle: MainLoopHandle,
    startup_grace: Duration,
    retry: Duration,
    error_retry: Duration,
}

impl StartupSupervisor {
    pub fn new(
        handle: MainLoopHandle,
        startup_grace: Duration,
        retry: Duration,
        error_retry: Duration,
    ) -> Self {
        Self {
            handle,
            startup_grace,
            retry,
            error_retry,
        }
    }

    pub fn spawn(self) -> JoinHandle<u32> {
        tokio::spawn(self.run())
    }

    /// Returns the number of readiness checks performed, or early when the
    /// main loop goes away.
    pub async fn run(self) -> u32 {
        info!(
            grace_ms = self.startup_grace.as_millis() as u64,
            "Waiting for colony surface before enabling autofulfill"
        );
        tokio::time::sleep(self.startup_grace).await;

        let mut checks = 0u32;
        loop {
            checks += 1;
            let readiness = match self.handle.check_readiness().await {
                Ok(readiness) => readiness,
                Err(e) => {
                    debug!(error = %e, "Main loop gone, stopping startup supervisor");
                    return checks;
                }
            };

            if readiness.is_ready() {
                info!(checks = checks, "Colony surface ready");
                return checks;
            }

            let delay = if readiness.is_malformed() {
                warn!(
                    readiness = %readiness,
                    retry_ms = self.error_retry.as_millis() as u64,
                    "Colony surface malformed, retrying later"
                );
                self.error_retry
            } else {
                info!(
                    readiness = %readiness,
                    retry_ms = self.retry.as_millis() as u64,
                    "Colony surface not ready yet, retrying"
                );
                self.retry
            };
            tokio::time::sleep(delay).await;
        }
    }
}
