//! In-memory colony surface.
//!
//! Stands in for the live colony simulation: a [`WorldSnapshot`] (loadable
//! from JSON) held behind a lock, with finite citizen inventories, a
//! configurable number of "still loading" probes and an online switch.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::debug;

use super::traits::{ColonyGateway, GatewayError, GatewayResult};
use crate::models::{
    Building, BuildingId, Citizen, CitizenId, Colony, ColonyId, ItemStack, Request, RequestId,
    RequestState, Requester,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    #[serde(default)]
    pub colonies: Vec<ColonySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySnapshot {
    pub id: ColonyId,
    pub name: String,
    #[serde(default)]
    pub buildings: Vec<BuildingSnapshot>,
    #[serde(default)]
    pub citizens: Vec<CitizenSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSnapshot {
    pub id: BuildingId,
    pub kind: String,
    #[serde(default = "default_true")]
    pub is_requester: bool,
    #[serde(default)]
    pub assigned_citizens: Vec<CitizenId>,
    #[serde(default)]
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenSnapshot {
    pub id: CitizenId,
    pub name: String,
    #[serde(default = "default_inventory_slots")]
    pub inventory_slots: usize,
    #[serde(default)]
    pub inventory: Vec<ItemStack>,
    /// Requests this citizen is working on
    #[serde(default)]
    pub assigned_requests: Vec<RequestId>,
    /// Requests raised by the citizen itself (food, tools, ...)
    #[serde(default)]
    pub requests: Vec<Request>,
}

fn default_true() -> bool {
    true
}

fn default_inventory_slots() -> usize {
    27
}

impl WorldSnapshot {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// A small world with one builder waiting on planks.
    pub fn demo() -> Self {
        use crate::models::Requestable;

        WorldSnapshot {
            colonies: vec![ColonySnapshot {
                id: 1,
                name: "Riverside".to_string(),
                buildings: vec![
                    BuildingSnapshot {
                        id: 10,
                        kind: "BuildingBuilder".to_string(),
                        is_requester: true,
                        assigned_citizens: vec![100],
                        requests: vec![
                            Request {
                                id: 1000,
                                state: RequestState::InProgress,
                                requester: Some(Requester::Building(10)),
                                requestable: Requestable::Deliverable { count: 32 },
                                display_stacks: vec![ItemStack::new(
                                    "item.minecraft.oak_planks",
                                    1,
                                    64,
                                )],
                            },
                            Request {
                                id: 1001,
                                state: RequestState::Pending,
                                requester: Some(Requester::Building(10)),
                                requestable: Requestable::Other {
                                    name: "Tool".to_string(),
                                },
                                display_stacks: vec![ItemStack::new(
                                    "item.minecraft.iron_axe",
                                    1,
                                    1,
                                )],
                            },
                        ],
                    },
                    BuildingSnapshot {
                        id: 11,
                        kind: "BuildingTownHall".to_string(),
                        is_requester: false,
                        assigned_citizens: vec![],
                        requests: vec![],
                    },
                ],
                citizens: vec![CitizenSnapshot {
                    id: 100,
                    name: "Ada Mason".to_string(),
                    inventory_slots: default_inventory_slots(),
                    inventory: vec![],
                    assigned_requests: vec![],
                    requests: vec![],
                }],
            }],
        }
    }
}

/// [`ColonyGateway`] over an owned [`WorldSnapshot`]
#[derive(Debug)]
pub struct InMemoryColonyGateway {
    world: RwLock<WorldSnapshot>,
    not_ready_probes: AtomicU32,
    online: AtomicBool,
}

impl InMemoryColonyGateway {
    pub fn new(world: WorldSnapshot) -> Self {
        Self {
            world: RwLock::new(world),
            not_ready_probes: AtomicU32::new(0),
            online: AtomicBool::new(true),
        }
    }

    /// Report "not ready" for the next `probes` readiness probes.
    pub fn with_not_ready_probes(self, probes: u32) -> Self {
        self.not_ready_probes.store(probes, Ordering::SeqCst);
        self
    }

    /// Take the whole surface offline (every call becomes `Unavailable`).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.read().clone()
    }

    pub fn request_state(&self, colony_id: ColonyId, request_id: RequestId) -> Option<RequestState> {
        let world = self.world.read();
        let colony = world.colonies.iter().find(|c| c.id == colony_id)?;
        let state = all_requests(colony)
            .find(|r| r.id == request_id)
            .map(|r| r.state);
        state
    }

    pub fn inventory(&self, colony_id: ColonyId, citizen_id: CitizenId) -> Vec<ItemStack> {
        let world = self.world.read();
        world
            .colonies
            .iter()
            .find(|c| c.id == colony_id)
            .and_then(|c| c.citizens.iter().find(|cz| cz.id == citizen_id))
            .map(|cz| cz.inventory.clone())
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> GatewayResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unavailable("colony manager offline".to_string()))
        }
    }

    fn with_colony<T>(
        &self,
        colony: &Colony,
        f: impl FnOnce(&ColonySnapshot) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        self.ensure_online()?;
        let world = self.world.read();
        let snapshot = world
            .colonies
            .iter()
            .find(|c| c.id == colony.id)
            .ok_or_else(|| GatewayError::Unavailable(format!("colony {} not found", colony.id)))?;
        f(snapshot)
    }

    fn with_colony_mut<T>(
        &self,
        colony: &Colony,
        f: impl FnOnce(&mut ColonySnapshot) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        self.ensure_online()?;
        let mut world = self.world.write();
        let snapshot = world
            .colonies
            .iter_mut()
            .find(|c| c.id == colony.id)
            .ok_or_else(|| GatewayError::Unavailable(format!("colony {} not found", colony.id)))?;
        f(snapshot)
    }
}

fn all_requests(colony: &ColonySnapshot) -> impl Iterator<Item = &Request> {
    colony
        .buildings
        .iter()
        .flat_map(|b| b.requests.iter())
        .chain(colony.citizens.iter().flat_map(|c| c.requests.iter()))
}

fn is_open(request: &Request) -> bool {
    !matches!(
        request.state,
        RequestState::Resolved
            | RequestState::Completed
            | RequestState::Received
            | RequestState::Cancelled
            | RequestState::Failed
    )
}

fn to_building(snapshot: &BuildingSnapshot) -> Building {
    Building {
        id: snapshot.id,
        kind: snapshot.kind.clone(),
        is_requester: snapshot.is_requester,
    }
}

fn to_citizen(snapshot: &CitizenSnapshot) -> Citizen {
    Citizen {
        id: snapshot.id,
        name: snapshot.name.clone(),
    }
}

/// Merge into matching stacks first, then fill free slots.
fn insert_stack(citizen: &mut CitizenSnapshot, stack: ItemStack) -> ItemStack {
    let mut remaining = stack.count;
    let max = stack.max_stack_size.max(1);

    for slot in citizen
        .inventory
        .iter_mut()
        .filter(|s| s.item_id == stack.item_id)
    {
        if remaining == 0 {
            break;
        }
        let space = max.saturating_sub(slot.count);
        let moved = space.min(remaining);
        slot.count += moved;
        remaining -= moved;
    }

    while remaining > 0 && citizen.inventory.len() < citizen.inventory_slots {
        let moved = remaining.min(max);
        citizen.inventory.push(stack.with_count(moved));
        remaining -= moved;
    }

    stack.with_count(remaining)
}

#[async_trait]
impl ColonyGateway for InMemoryColonyGateway {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn probe(&self) -> GatewayResult<()> {
        self.ensure_online()?;
        let remaining = self.not_ready_probes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.not_ready_probes.store(remaining - 1, Ordering::SeqCst);
            return Err(GatewayError::NotReady(format!(
                "colony manager still loading ({remaining} probes left)"
            )));
        }
        let world = self.world.read();
        if let Some(first) = world.colonies.first() {
            debug!(colony_id = first.id, "Readiness probe read first colony");
        }
        Ok(())
    }

    async fn colonies(&self) -> GatewayResult<Vec<Colony>> {
        self.ensure_online()?;
        Ok(self
            .world
            .read()
            .colonies
            .iter()
            .map(|c| Colony {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    async fn buildings(&self, colony: &Colony) -> GatewayResult<Vec<Building>> {
        self.with_colony(colony, |c| Ok(c.buildings.iter().map(to_building).collect()))
    }

    async fn citizens(&self, colony: &Colony) -> GatewayResult<Vec<Citizen>> {
        self.with_colony(colony, |c| Ok(c.citizens.iter().map(to_citizen).collect()))
    }

    async fn requests_for_building(
        &self,
        colony: &Colony,
        building: &Building,
    ) -> GatewayResult<Vec<Request>> {
        self.with_colony(colony, |c| {
            let snapshot = c
                .buildings
                .iter()
                .find(|b| b.id == building.id)
                .ok_or_else(|| {
                    GatewayError::Unavailable(format!("building {} not found", building.id))
                })?;
            if !snapshot.is_requester {
                return Err(GatewayError::ShapeMismatch(format!(
                    "building {} is not a requester",
                    building.id
                )));
            }
            Ok(snapshot.requests.iter().filter(|r| is_open(r)).cloned().collect())
        })
    }

    async fn requests_for_citizen(
        &self,
        colony: &Colony,
        citizen: &Citizen,
    ) -> GatewayResult<Vec<Request>> {
        self.with_colony(colony, |c| {
            let snapshot = c.citizens.iter().find(|cz| cz.id == citizen.id).ok_or_else(|| {
                GatewayError::Unavailable(format!("citizen {} not found", citizen.id))
            })?;
            Ok(snapshot.requests.iter().filter(|r| is_open(r)).cloned().collect())
        })
    }

    async fn building_for_request(
        &self,
        colony: &Colony,
        request: &Request,
    ) -> GatewayResult<Option<Building>> {
        let Some(Requester::Building(building_id)) = request.requester else {
            return Ok(None);
        };
        self.with_colony(colony, |c| {
            Ok(c.buildings
                .iter()
                .find(|b| b.id == building_id)
                .map(to_building))
        })
    }

    async fn citizen_for_request(
        &self,
        colony: &Colony,
        building: &Building,
        request: &Request,
    ) -> GatewayResult<Option<Citizen>> {
        self.with_colony(colony, |c| {
            if let Some(assigned) = c
                .citizens
                .iter()
                .find(|cz| cz.assigned_requests.contains(&request.id))
            {
                return Ok(Some(to_citizen(assigned)));
            }

            let first_worker = c
                .buildings
                .iter()
                .find(|b| b.id == building.id)
                .and_then(|b| b.assigned_citizens.first())
                .and_then(|id| c.citizens.iter().find(|cz| cz.id == *id))
                .map(to_citizen);
            Ok(first_worker)
        })
    }

    async fn insert_into_inventory(
        &self,
        colony: &Colony,
        citizen: &Citizen,
        stack: ItemStack,
    ) -> GatewayResult<ItemStack> {
        self.with_colony_mut(colony, |c| {
            let snapshot = c
                .citizens
                .iter_mut()
                .find(|cz| cz.id == citizen.id)
                .ok_or_else(|| {
                    GatewayError::Unavailable(format!("citizen {} not found", citizen.id))
                })?;
            Ok(insert_stack(snapshot, stack))
        })
    }

    async fn mark_resolved(&self, colony: &Colony, request: &Request) -> GatewayResult<()> {
        self.with_colony_mut(colony, |c| {
            let target = c
                .buildings
                .iter_mut()
                .flat_map(|b| b.requests.iter_mut())
                .chain(c.citizens.iter_mut().flat_map(|cz| cz.requests.iter_mut()))
                .find(|r| r.id == request.id)
                .ok_or_else(|| {
                    GatewayError::Unavailable(format!("request {} not found", request.id))
                })?;
            target.state = RequestState::Resolved;
            Ok(())
        })
    }
}
