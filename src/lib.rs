#![allow(clippy::doc_markdown)] // Allow technical terms in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Autofulfill Core
//!
//! Readiness-gated poller that resolves colony resource requests by putting
//! the requested items straight into a citizen's inventory.
//!
//! ## Overview
//!
//! The colony simulation is an external system this crate does not own. It
//! is reached only through the [`gateway::ColonyGateway`] port. Until that
//! surface reports ready, a startup supervisor keeps checking on a fixed
//! backoff. Once ready, a fixed-interval poller feeds ticks into a single
//! main loop, which runs one fulfilment cycle per tick.
//!
//! ## Architecture
//!
//! - **Main loop actor**: one tokio task owns configuration, counters, the
//!   notification throttle and all gateway writes. Everything else posts
//!   commands into its inbox.
//! - **Poller**: one cancellable timer task per schedule, tagged with a
//!   generation so ticks from a replaced schedule are dropped.
//! - **Notifications**: throttled by `(category, content)` with a cooldown
//!   equal to the poll interval and a per-window budget.
//! - **Session counters**: processed/succeeded/failed/skipped, reset together
//!   with the throttle when the session window expires.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - Main loop, poller, work unit and bootstrap
//! - [`readiness`] - Readiness gate and startup supervisor
//! - [`notification`] - Message categories, throttle and observers
//! - [`stats`] - Session counters
//! - [`commands`] - Text command surface
//! - [`gateway`] - Port to the colony simulation and an in-memory adapter
//! - [`models`] - Plain value types returned by the gateway
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Error taxonomy
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use autofulfill_core::clock::SystemClock;
//! use autofulfill_core::commands::CommandSurface;
//! use autofulfill_core::config::AutofulfillConfig;
//! use autofulfill_core::gateway::{InMemoryColonyGateway, WorldSnapshot};
//! use autofulfill_core::notification::{ConsoleSink, Observers};
//! use autofulfill_core::orchestration::AutofulfillSystem;
//!
//! # async fn example() -> autofulfill_core::Result<()> {
//! let observers = Arc::new(Observers::new());
//! observers.register(Arc::new(ConsoleSink));
//!
//! let mut system = AutofulfillSystem::start(
//!     &AutofulfillConfig::default(),
//!     Arc::new(InMemoryColonyGateway::new(WorldSnapshot::demo())),
//!     observers,
//!     Arc::new(SystemClock),
//! );
//!
//! let commands = CommandSurface::new(system.main_loop().clone());
//! for line in commands.execute_line("/autofulfill status").await.lines {
//!     println!("{line}");
//! }
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod clock;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod notification;
pub mod orchestration;
pub mod readiness;
pub mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{CommandResponse, CommandSurface};
pub use config::{AutofulfillConfig, ConfigManager, PollerConfig, TimingConfig};
pub use error::{AutofulfillError, Result};
pub use gateway::{ColonyGateway, GatewayError, GatewayResult, InMemoryColonyGateway};
pub use notification::{MessageCategory, MessageSink, Observers};
pub use orchestration::{AutofulfillSystem, CycleReport, MainLoopHandle, SystemHandle};
pub use readiness::{Readiness, ReadinessGate};
pub use stats::{Outcome, SessionCounters, StatsSnapshot};
