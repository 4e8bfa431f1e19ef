//! # System Constants
//!
//! Defaults and operational bounds for the autofulfill poller. Every timing
//! value here can be overridden through [`crate::config::TimingConfig`].

/// Poll interval bounds accepted by the `delay` command and the config file.
pub const MIN_CHECK_TIME_SECONDS: u32 = 1;
pub const MAX_CHECK_TIME_SECONDS: u32 = 3600;
pub const DEFAULT_CHECK_TIME_SECONDS: u32 = 5;

/// Minimum time since server start before the colony surface is touched.
pub const DEFAULT_STARTUP_GRACE_MS: u64 = 120_000;
/// Sleep between readiness checks while the dependency is still loading.
pub const DEFAULT_READINESS_RETRY_MS: u64 = 30_000;
/// Sleep after a readiness check that failed with a malformed dependency.
pub const DEFAULT_READINESS_ERROR_RETRY_MS: u64 = 60_000;
/// One-time settling delay before the first scheduled tick.
pub const DEFAULT_INITIAL_POLL_DELAY_MS: u64 = 60_000;
/// Length of a session window; counters and throttle entries reset after it.
pub const DEFAULT_STATS_RESET_INTERVAL_MS: u64 = 300_000;

/// Identical notifications accepted per session window.
pub const DEFAULT_MAX_MESSAGES_PER_CATEGORY: u32 = 3;
/// A STATS line is offered whenever `processed` is a multiple of this.
pub const DEFAULT_STATS_BROADCAST_EVERY: u64 = 10;

/// Capacity of the main loop inbox.
pub const MAIN_LOOP_CHANNEL_CAPACITY: usize = 256;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "AUTOFULFILL";

/// Request states that still wait on a resolver.
pub mod request_states {
    pub const ACTIVE: &[&str] = &[
        "PENDING",
        "IN_PROGRESS",
        "FOLLOWUP_IN_PROGRESS",
        "IN_PROGRESS_DELIVERY",
        "FOLLOWUP_IN_PROGRESS_DELIVERY",
        "IN_PROGRESS_PICKUP",
        "FOLLOWUP_IN_PROGRESS_PICKUP",
    ];
}

/// Item paths that stand for "nothing in this slot".
pub const AIR_ITEM_NAMES: &[&str] = &["air", "cave_air", "void_air"];

/// Namespaces stripped from item description ids for display.
pub const ITEM_NAMESPACES: &[&str] = &["minecraft.", "minecolonies."];
