//! # Orchestration
//!
//! The readiness-gated poller: a single main loop that owns all mutable
//! state, a fixed-interval [`Poller`] that feeds it ticks, and the
//! [`AutofulfillCycle`] work unit it runs on every tick.

pub mod bootstrap;
pub mod context;
pub mod cycle;
pub mod listing;
pub mod main_loop;
pub mod poller;

pub use bootstrap::{AutofulfillSystem, SystemHandle};
pub use context::{AutofulfillContext, SystemPhase};
pub use cycle::{
    AutofulfillCycle, CycleContext, CycleReport, CycleStatus, CycleTrigger, WorkUnit,
};
pub use listing::{collect_requests, ColonyRequests, RequestListing};
pub use main_loop::{CommandResponder, LoopCommand, MainLoop, MainLoopHandle, SystemStatus};
pub use poller::{Poller, ScheduleHandle};
