//! The narrow port between the poller and the colony surface it does not own.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Building, Citizen, Colony, ItemStack, Request};

/// Why a gateway operation could not complete.
///
/// Every call site treats these as "skip this item" except `NotReady`,
/// which belongs to the startup backoff path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The surface or a required element of it cannot be located
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The element exists but does not behave as expected
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    /// The surface exists but is still initialising
    #[error("not ready: {0}")]
    NotReady(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Operations the poller needs from the colony simulation.
///
/// Implementations must be cheap to call repeatedly; they are only ever
/// invoked from the main loop, one call at a time.
#[async_trait]
pub trait ColonyGateway: Send + Sync + 'static {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Resolve the top-level handle and perform one basic read through it.
    async fn probe(&self) -> GatewayResult<()>;

    async fn colonies(&self) -> GatewayResult<Vec<Colony>>;

    async fn buildings(&self, colony: &Colony) -> GatewayResult<Vec<Building>>;

    async fn citizens(&self, colony: &Colony) -> GatewayResult<Vec<Citizen>>;

    /// Requests raised by a building
    async fn requests_for_building(
        &self,
        colony: &Colony,
        building: &Building,
    ) -> GatewayResult<Vec<Request>>;

    /// Requests raised by a citizen
    async fn requests_for_citizen(
        &self,
        colony: &Colony,
        citizen: &Citizen,
    ) -> GatewayResult<Vec<Request>>;

    /// The building a building-based requester stands for
    async fn building_for_request(
        &self,
        colony: &Colony,
        request: &Request,
    ) -> GatewayResult<Option<Building>>;

    /// Citizen assigned to this request, else the first citizen working in
    /// `building`, else `None`.
    async fn citizen_for_request(
        &self,
        colony: &Colony,
        building: &Building,
        request: &Request,
    ) -> GatewayResult<Option<Citizen>>;

    /// Put `stack` into the citizen's inventory; returns what did not fit.
    async fn insert_into_inventory(
        &self,
        colony: &Colony,
        citizen: &Citizen,
        stack: ItemStack,
    ) -> GatewayResult<ItemStack>;

    async fn mark_resolved(&self, colony: &Colony, request: &Request) -> GatewayResult<()>;
}
