use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use autofulfill_core::gateway::{
    ColonyGateway, GatewayError, GatewayResult, InMemoryColonyGateway, WorldSnapshot,
};
use autofulfill_core::models::{Building, Citizen, Colony, ItemStack, Request, RequestId};

/// World whose readiness probe answers from a script, then succeeds.
/// Inventory inserts can be made to fail with a fixed error, and building or
/// citizen lookups can be made to fail for single requests.
#[derive(Debug)]
pub struct ScriptedProbeGateway {
    inner: InMemoryColonyGateway,
    script: Mutex<VecDeque<GatewayResult<()>>>,
    probes: AtomicU32,
    insert_failure: Mutex<Option<GatewayError>>,
    building_failures: Mutex<HashMap<RequestId, GatewayError>>,
    citizen_failures: Mutex<HashMap<RequestId, GatewayError>>,
}

impl ScriptedProbeGateway {
    pub fn new(script: Vec<GatewayResult<()>>) -> Self {
        Self::with_world(WorldSnapshot::demo(), script)
    }

    pub fn with_world(world: WorldSnapshot, script: Vec<GatewayResult<()>>) -> Self {
        Self {
            inner: InMemoryColonyGateway::new(world),
            script: Mutex::new(script.into()),
            probes: AtomicU32::new(0),
            insert_failure: Mutex::new(None),
            building_failures: Mutex::new(HashMap::new()),
            citizen_failures: Mutex::new(HashMap::new()),
        }
    }

    /// Resolving the requesting building of `request` fails with `error`.
    pub fn fail_building_lookup(&self, request: RequestId, error: GatewayError) {
        self.building_failures.lock().insert(request, error);
    }

    /// Resolving the citizen working on `request` fails with `error`.
    pub fn fail_citizen_lookup(&self, request: RequestId, error: GatewayError) {
        self.citizen_failures.lock().insert(request, error);
    }

    /// Every following insert fails with `error`.
    pub fn fail_inserts(&self, error: GatewayError) {
        *self.insert_failure.lock() = Some(error);
    }

    pub fn inner(&self) -> &InMemoryColonyGateway {
        &self.inner
    }

    /// Number of probes answered so far
    pub fn probes(&self) -> u32 {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ColonyGateway for ScriptedProbeGateway {
    fn name(&self) -> &'static str {
        "scripted_probe"
    }

    async fn probe(&self) -> GatewayResult<()> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.script.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn colonies(&self) -> GatewayResult<Vec<Colony>> {
        self.inner.colonies().await
    }

    async fn buildings(&self, colony: &Colony) -> GatewayResult<Vec<Building>> {
        self.inner.buildings(colony).await
    }

    async fn citizens(&self, colony: &Colony) -> GatewayResult<Vec<Citizen>> {
        self.inner.citizens(colony).await
    }

    async fn requests_for_building(
        &self,
        colony: &Colony,
        building: &Building,
    ) -> GatewayResult<Vec<Request>> {
        self.inner.requests_for_building(colony, building).await
    }

    async fn requests_for_citizen(
        &self,
        colony: &Colony,
        citizen: &Citizen,
    ) -> GatewayResult<Vec<Request>> {
        self.inner.requests_for_citizen(colony, citizen).await
    }

    async fn building_for_request(
        &self,
        colony: &Colony,
        request: &Request,
    ) -> GatewayResult<Option<Building>> {
        let failure = self.building_failures.lock().get(&request.id).cloned();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner.building_for_request(colony, request).await
    }

    async fn citizen_for_request(
        &self,
        colony: &Colony,
        building: &Building,
        request: &Request,
    ) -> GatewayResult<Option<Citizen>> {
        let failure = self.citizen_failures.lock().get(&request.id).cloned();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner.citizen_for_request(colony, building, request).await
    }

    async fn insert_into_inventory(
        &self,
        colony: &Colony,
        citizen: &Citizen,
        stack: ItemStack,
    ) -> GatewayResult<ItemStack> {
        let failure = self.insert_failure.lock().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner.insert_into_inventory(colony, citizen, stack).await
    }

    async fn mark_resolved(&self, colony: &Colony, request: &Request) -> GatewayResult<()> {
        self.inner.mark_resolved(colony, request).await
    }
}
