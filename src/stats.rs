//! Session-scoped fulfilment counters.
//!
//! Counters only grow inside a session window. When the window is older than
//! the reset interval, [`SessionCounters::maybe_reset`] zeroes them and starts
//! a new window; the caller clears the notification throttle at the same time.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of processing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct SessionCounters {
    processed: u64,
    succeeded: u64,
    failed: u64,
    skipped: u64,
    window_started_at: Instant,
    reset_interval: Duration,
}

impl SessionCounters {
    pub fn new(now: Instant, reset_interval: Duration) -> Self {
        Self {
            processed: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            window_started_at: now,
            reset_interval,
        }
    }

    /// Count one processed request with its outcome.
    pub fn record(&mut self, outcome: Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Start a new window when the current one is older than the reset
    /// interval. Returns true when a reset happened.
    pub fn maybe_reset(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.window_started_at) <= self.reset_interval {
            return false;
        }

        debug!(
            processed = self.processed,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            "Session window expired, resetting counters"
        );
        self.processed = 0;
        self.succeeded = 0;
        self.failed = 0;
        self.skipped = 0;
        self.window_started_at = now;
        true
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed,
            succeeded: self.succeeded,
            failed: self.failed,
            skipped: self.skipped,
        }
    }

    pub fn window_started_at(&self) -> Instant {
        self.window_started_at
    }
}

/// Point-in-time copy of the counters, safe to hand outside the main loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl StatsSnapshot {
    /// Percentage of processed requests that succeeded; `None` before any
    /// request was processed.
    pub fn success_rate(&self) -> Option<f64> {
        if self.processed == 0 {
            return None;
        }
        Some(self.succeeded as f64 / self.processed as f64 * 100.0)
    }

    pub fn has_data(&self) -> bool {
        self.processed > 0
    }

    /// One-line summary used for the periodic STATS notification.
    pub fn summary_line(&self) -> String {
        format!(
            "Autofulfill Stats: {} processed, {} successful ({:.1}%), {} failed, {} skipped",
            self.processed,
            self.succeeded,
            self.success_rate().unwrap_or(0.0),
            self.failed,
            self.skipped
        )
    }
}
