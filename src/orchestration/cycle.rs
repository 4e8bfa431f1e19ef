//! # Fulfilment cycle
//!
//! One pass over every colony: each open request raised by a requester
//! building gets its first display stack inserted into the inventory of the
//! citizen working on it, and is marked resolved when everything fit.
//!
//! Dependency failures are contained at the smallest scope that can absorb
//! them. A request that cannot be handled records exactly one outcome; a
//! colony or building that cannot be read is skipped entirely.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use super::context::AutofulfillContext;
use crate::error::Result;
use crate::gateway::{ColonyGateway, GatewayError};
use crate::logging::log_fulfillment;
use crate::models::{Colony, Request, Requester};
use crate::notification::MessageCategory;
use crate::readiness::Readiness;
use crate::stats::{Outcome, StatsSnapshot};

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleTrigger {
    Scheduled,
    Manual,
}

impl fmt::Display for CycleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleTrigger::Scheduled => f.write_str("scheduled"),
            CycleTrigger::Manual => f.write_str("manual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CycleStatus {
    Completed,
    /// Poller disabled; nothing ran
    Disabled,
    /// Readiness gate did not pass
    NotReady(String),
    /// Nothing to do, or the colony surface was unavailable
    Skipped(String),
    /// The work unit returned an error or panicked
    Failed(String),
}

/// Summary of one cycle. `outcomes` counts only this cycle's requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle_id: Uuid,
    pub trigger: CycleTrigger,
    pub status: CycleStatus,
    pub colonies: usize,
    pub outcomes: StatsSnapshot,
    pub duration: Duration,
}

impl CycleReport {
    pub fn new(trigger: CycleTrigger, status: CycleStatus) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            trigger,
            status,
            colonies: 0,
            outcomes: StatsSnapshot::default(),
            duration: Duration::ZERO,
        }
    }

    pub fn summary_line(&self) -> String {
        match &self.status {
            CycleStatus::Completed => format!(
                "Cycle completed: {} colonies, {} requests ({} fulfilled, {} failed, {} skipped)",
                self.colonies,
                self.outcomes.processed,
                self.outcomes.succeeded,
                self.outcomes.failed,
                self.outcomes.skipped
            ),
            CycleStatus::Disabled => "Cycle skipped: autofulfill is disabled".to_string(),
            CycleStatus::NotReady(reason) => format!("Cycle skipped: colonies not ready ({reason})"),
            CycleStatus::Skipped(reason) => format!("Cycle skipped: {reason}"),
            CycleStatus::Failed(reason) => format!("Cycle failed: {reason}"),
        }
    }
}

/// Borrowed view of the main loop state handed to a work unit.
pub struct CycleContext<'a> {
    context: &'a mut AutofulfillContext,
    cycle_id: Uuid,
    trigger: CycleTrigger,
    started: Instant,
    colonies: usize,
    outcomes: StatsSnapshot,
}

impl<'a> CycleContext<'a> {
    pub fn new(context: &'a mut AutofulfillContext, trigger: CycleTrigger) -> Self {
        Self {
            started: context.now(),
            context,
            cycle_id: Uuid::new_v4(),
            trigger,
            colonies: 0,
            outcomes: StatsSnapshot::default(),
        }
    }

    pub fn trigger(&self) -> CycleTrigger {
        self.trigger
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    pub fn gateway(&self) -> Arc<dyn ColonyGateway> {
        self.context.gateway()
    }

    pub async fn readiness(&self) -> Readiness {
        self.context.check_readiness().await
    }

    /// Count one processed request in both the session and this cycle.
    pub fn record(&mut self, outcome: Outcome) {
        self.context.record(outcome);
        self.outcomes.processed += 1;
        match outcome {
            Outcome::Succeeded => self.outcomes.succeeded += 1,
            Outcome::Failed => self.outcomes.failed += 1,
            Outcome::Skipped => self.outcomes.skipped += 1,
        }
    }

    pub fn colony_processed(&mut self) {
        self.colonies += 1;
    }

    pub fn notify(&mut self, category: MessageCategory, message: &str) -> bool {
        self.context.notify(category, message)
    }

    /// Session-wide counters
    pub fn session_stats(&self) -> StatsSnapshot {
        self.context.stats()
    }

    pub fn stats_broadcast_every(&self) -> u64 {
        self.context.timing().stats_broadcast_every
    }

    pub fn report(&self, status: CycleStatus) -> CycleReport {
        CycleReport {
            cycle_id: self.cycle_id,
            trigger: self.trigger,
            status,
            colonies: self.colonies,
            outcomes: self.outcomes,
            duration: self.context.now().saturating_duration_since(self.started),
        }
    }
}

/// The unit of work executed on every tick.
#[async_trait]
pub trait WorkUnit: Send {
    fn name(&self) -> &str;

    async fn run(&mut self, ctx: &mut CycleContext<'_>) -> Result<CycleReport>;
}

/// Production work unit: fulfil deliverable building requests.
#[derive(Debug, Default)]
pub struct AutofulfillCycle;

impl AutofulfillCycle {
    pub fn new() -> Self {
        Self
    }

    async fn process_colony(
        &self,
        ctx: &mut CycleContext<'_>,
        gateway: &dyn ColonyGateway,
        colony: &Colony,
    ) {
        let buildings = match gateway.buildings(colony).await {
            Ok(buildings) => buildings,
            Err(e) => {
                warn!(colony = %colony, error = %e, "Skipping colony, buildings unreadable");
                return;
            }
        };

        for building in buildings.iter().filter(|b| b.is_requester) {
            let requests = match gateway.requests_for_building(colony, building).await {
                Ok(requests) => requests,
                Err(e) => {
                    debug!(
                        colony = %colony,
                        building = %building,
                        error = %e,
                        "Skipping building, requests unreadable"
                    );
                    continue;
                }
            };

            for request in &requests {
                let outcome = self.process_request(ctx, gateway, colony, request).await;
                ctx.record(outcome);
            }
        }
    }

    async fn process_request(
        &self,
        ctx: &mut CycleContext<'_>,
        gateway: &dyn ColonyGateway,
        colony: &Colony,
        request: &Request,
    ) -> Outcome {
        let request_id = request.id.to_string();
        let skip = |reason: &str| {
            log_fulfillment(&colony.name, &request_id, None, None, None, "skipped", Some(reason));
            Outcome::Skipped
        };

        match &request.requester {
            Some(Requester::Building(_)) => {}
            Some(_) => return skip("requester is not building-based"),
            None => return skip("request has no requester"),
        }

        let building = match gateway.building_for_request(colony, request).await {
            Ok(Some(building)) => building,
            Ok(None) => return skip("requesting building not found"),
            Err(e) => return outcome_for_gateway_error(colony, &request_id, &e),
        };

        let Some(requested) = request.requestable.deliverable_count() else {
            return skip("requestable is not deliverable");
        };

        let citizen = match gateway.citizen_for_request(colony, &building, request).await {
            Ok(Some(citizen)) => citizen,
            Ok(None) => {
                ctx.notify(MessageCategory::Warning, "No citizen assigned for request");
                return Outcome::Failed;
            }
            Err(e) => return outcome_for_gateway_error(colony, &request_id, &e),
        };

        let Some(display) = request.display_stacks.first() else {
            ctx.notify(MessageCategory::Warning, "No items found for request");
            return Outcome::Failed;
        };

        let count = requested.min(display.max_stack_size);
        let stack = display.with_count(count);
        let item = stack.display_name();
        let building_name = building.display_name();

        let remainder = match gateway.insert_into_inventory(colony, &citizen, stack).await {
            Ok(remainder) => remainder,
            Err(e) => return self.fulfilment_error(ctx, colony, &request_id, e),
        };

        if !remainder.is_empty() {
            log_fulfillment(
                &colony.name,
                &request_id,
                Some(&building_name),
                Some(&item),
                Some(count),
                "partial",
                Some(&format!("{} did not fit", remainder.count)),
            );
            ctx.notify(
                MessageCategory::Error,
                &format!("Could not add {count}x {item} to inventory"),
            );
            return Outcome::Failed;
        }

        if let Err(e) = gateway.mark_resolved(colony, request).await {
            return self.fulfilment_error(ctx, colony, &request_id, e);
        }

        log_fulfillment(
            &colony.name,
            &request_id,
            Some(&building_name),
            Some(&item),
            Some(count),
            "fulfilled",
            Some(&citizen.name),
        );
        ctx.notify(
            MessageCategory::Success,
            &format!("Fulfilled {count}x {item} for {building_name}"),
        );
        Outcome::Succeeded
    }

    /// Insert or resolve failed: the only case where raw detail reaches users.
    fn fulfilment_error(
        &self,
        ctx: &mut CycleContext<'_>,
        colony: &Colony,
        request_id: &str,
        error: GatewayError,
    ) -> Outcome {
        let outcome = outcome_for_gateway_error(colony, request_id, &error);
        if outcome == Outcome::Failed {
            ctx.notify(
                MessageCategory::Error,
                &format!("Error fulfilling request: {error}"),
            );
        }
        outcome
    }
}

fn outcome_for_gateway_error(colony: &Colony, request_id: &str, error: &GatewayError) -> Outcome {
    let detail = error.to_string();
    match error {
        GatewayError::Unavailable(_) => {
            log_fulfillment(&colony.name, request_id, None, None, None, "skipped", Some(&detail));
            Outcome::Skipped
        }
        GatewayError::ShapeMismatch(_) | GatewayError::NotReady(_) => {
            log_fulfillment(&colony.name, request_id, None, None, None, "failed", Some(&detail));
            Outcome::Failed
        }
    }
}

#[async_trait]
impl WorkUnit for AutofulfillCycle {
    fn name(&self) -> &str {
        "autofulfill"
    }

    async fn run(&mut self, ctx: &mut CycleContext<'_>) -> Result<CycleReport> {
        let readiness = ctx.readiness().await;
        if !readiness.is_ready() {
            debug!(readiness = %readiness, "Colony surface not ready, skipping cycle");
            return Ok(ctx.report(CycleStatus::NotReady(readiness.to_string())));
        }

        let gateway = ctx.gateway();
        let colonies = match gateway.colonies().await {
            Ok(colonies) => colonies,
            Err(GatewayError::Unavailable(reason)) => {
                warn!(reason = %reason, "Colony manager not available, skipping autofulfill cycle");
                return Ok(ctx.report(CycleStatus::Skipped(format!("colonies unavailable: {reason}"))));
            }
            Err(e) => return Err(e.into()),
        };

        if colonies.is_empty() {
            debug!("No colonies found, skipping autofulfill cycle");
            return Ok(ctx.report(CycleStatus::Skipped("no colonies".to_string())));
        }

        for colony in &colonies {
            debug!(colony = %colony, "Processing colony");
            self.process_colony(ctx, gateway.as_ref(), colony).await;
            ctx.colony_processed();
        }

        ctx.notify(
            MessageCategory::Progress,
            &format!("Processed {} colonies for autofulfill", colonies.len()),
        );

        let session = ctx.session_stats();
        let every = ctx.stats_broadcast_every();
        if session.processed > 0 && session.processed % every == 0 {
            ctx.notify(MessageCategory::Stats, &session.summary_line());
        }

        Ok(ctx.report(CycleStatus::Completed))
    }
}
