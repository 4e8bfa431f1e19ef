//! # Autofulfill Configuration
//!
//! Process-wide settings for the poller. The file format mirrors the
//! generated `autofulfill.toml`:
//!
//! ```toml
//! [autofulfill]
//! enabled = true
//! check_time_seconds = 5
//! show_in_game_messages = true
//!
//! [timing]
//! startup_grace_ms = 120000
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use autofulfill_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load_from_file("config/autofulfill.toml")?;
//! println!("interval: {}s", manager.config().autofulfill.check_time_seconds);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::*;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Complete settings document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofulfillConfig {
    pub autofulfill: PollerConfig,
    pub timing: TimingConfig,
}

impl AutofulfillConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.autofulfill.validate()?;
        self.timing.validate()
    }
}

/// Settings the command surface can change at runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Ticks are no-ops while disabled
    pub enabled: bool,
    /// Poll interval, also the notification cooldown
    pub check_time_seconds: u32,
    /// When off, notifications are only logged
    pub show_in_game_messages: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_time_seconds: DEFAULT_CHECK_TIME_SECONDS,
            show_in_game_messages: true,
        }
    }
}

impl PollerConfig {
    /// Reject an interval outside `1..=3600` seconds.
    pub fn validate_interval(seconds: u32) -> ConfigResult<u32> {
        if (MIN_CHECK_TIME_SECONDS..=MAX_CHECK_TIME_SECONDS).contains(&seconds) {
            Ok(seconds)
        } else {
            Err(ConfigurationError::invalid_value(
                "check_time_seconds",
                seconds.to_string(),
                format!("must be between {MIN_CHECK_TIME_SECONDS} and {MAX_CHECK_TIME_SECONDS} seconds"),
            ))
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Self::validate_interval(self.check_time_seconds).map(|_| ())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.check_time_seconds))
    }
}

/// Startup, window and throttle timings (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub startup_grace_ms: u64,
    pub readiness_retry_ms: u64,
    pub readiness_error_retry_ms: u64,
    pub initial_poll_delay_ms: u64,
    pub stats_reset_interval_ms: u64,
    pub max_messages_per_category: u32,
    pub stats_broadcast_every: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            readiness_retry_ms: DEFAULT_READINESS_RETRY_MS,
            readiness_error_retry_ms: DEFAULT_READINESS_ERROR_RETRY_MS,
            initial_poll_delay_ms: DEFAULT_INITIAL_POLL_DELAY_MS,
            stats_reset_interval_ms: DEFAULT_STATS_RESET_INTERVAL_MS,
            max_messages_per_category: DEFAULT_MAX_MESSAGES_PER_CATEGORY,
            stats_broadcast_every: DEFAULT_STATS_BROADCAST_EVERY,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_messages_per_category == 0 {
            return Err(ConfigurationError::invalid_value(
                "max_messages_per_category",
                "0",
                "at least one message per category must be allowed",
            ));
        }
        if self.stats_broadcast_every == 0 {
            return Err(ConfigurationError::invalid_value(
                "stats_broadcast_every",
                "0",
                "must be a positive number of processed requests",
            ));
        }
        if self.readiness_retry_ms == 0 || self.readiness_error_retry_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "readiness_retry_ms",
                "0",
                "readiness backoff must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    pub fn readiness_retry(&self) -> Duration {
        Duration::from_millis(self.readiness_retry_ms)
    }

    pub fn readiness_error_retry(&self) -> Duration {
        Duration::from_millis(self.readiness_error_retry_ms)
    }

    pub fn initial_poll_delay(&self) -> Duration {
        Duration::from_millis(self.initial_poll_delay_ms)
    }

    pub fn stats_reset_interval(&self) -> Duration {
        Duration::from_millis(self.stats_reset_interval_ms)
    }
}
