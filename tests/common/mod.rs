#![allow(dead_code)]

pub mod gateways;
pub mod sinks;
pub mod strategies;
pub mod work_units;

pub use gateways::*;
pub use sinks::*;
pub use strategies::*;
pub use work_units::*;

use std::time::Duration;

use autofulfill_core::config::AutofulfillConfig;
use autofulfill_core::orchestration::{MainLoopHandle, SystemStatus};

/// Settings that reach READY and start ticking as soon as possible.
pub fn fast_config() -> AutofulfillConfig {
    let mut config = AutofulfillConfig::default();
    config.autofulfill.check_time_seconds = 1;
    config.timing.startup_grace_ms = 0;
    config.timing.readiness_retry_ms = 10;
    config.timing.readiness_error_retry_ms = 40;
    config.timing.initial_poll_delay_ms = 0;
    config
}

/// Poll the main loop status until `predicate` holds or `limit` elapses.
pub async fn wait_for_status(
    handle: &MainLoopHandle,
    limit: Duration,
    predicate: impl Fn(&SystemStatus) -> bool,
) -> SystemStatus {
    tokio::time::timeout(limit, async {
        loop {
            let status = handle.status().await.expect("main loop should answer");
            if predicate(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("status condition not reached in time")
}
