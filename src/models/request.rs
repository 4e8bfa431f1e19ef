//! Colony requests: lifecycle state, requester and what is asked for.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::colony::{BuildingId, CitizenId};
use super::item_stack::ItemStack;

pub type RequestId = u64;

/// Lifecycle state of a colony request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    Created,
    Assigned,
    Pending,
    InProgress,
    FollowupInProgress,
    InProgressDelivery,
    FollowupInProgressDelivery,
    InProgressPickup,
    FollowupInProgressPickup,
    Completed,
    Resolved,
    Received,
    Cancelled,
    Failed,
}

impl RequestState {
    /// Still waiting on a resolver
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            RequestState::Pending
                | RequestState::InProgress
                | RequestState::FollowupInProgress
                | RequestState::InProgressDelivery
                | RequestState::FollowupInProgressDelivery
                | RequestState::InProgressPickup
                | RequestState::FollowupInProgressPickup
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Created => "CREATED",
            RequestState::Assigned => "ASSIGNED",
            RequestState::Pending => "PENDING",
            RequestState::InProgress => "IN_PROGRESS",
            RequestState::FollowupInProgress => "FOLLOWUP_IN_PROGRESS",
            RequestState::InProgressDelivery => "IN_PROGRESS_DELIVERY",
            RequestState::FollowupInProgressDelivery => "FOLLOWUP_IN_PROGRESS_DELIVERY",
            RequestState::InProgressPickup => "IN_PROGRESS_PICKUP",
            RequestState::FollowupInProgressPickup => "FOLLOWUP_IN_PROGRESS_PICKUP",
            RequestState::Completed => "COMPLETED",
            RequestState::Resolved => "RESOLVED",
            RequestState::Received => "RECEIVED",
            RequestState::Cancelled => "CANCELLED",
            RequestState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who raised a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Requester {
    Building(BuildingId),
    Citizen(CitizenId),
    /// Any other requester implementation, by type name
    Other(String),
}

impl Requester {
    pub fn is_building_based(&self) -> bool {
        matches!(self, Requester::Building(_))
    }
}

/// What a request asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Requestable {
    /// Items that can be delivered into an inventory
    Deliverable { count: u32 },
    /// Anything else (tools, food categories, ...), by type name
    Other { name: String },
}

impl Requestable {
    pub fn deliverable_count(&self) -> Option<u32> {
        match self {
            Requestable::Deliverable { count } => Some(*count),
            Requestable::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub state: RequestState,
    #[serde(default)]
    pub requester: Option<Requester>,
    pub requestable: Requestable,
    #[serde(default)]
    pub display_stacks: Vec<ItemStack>,
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}]", self.id, self.state)?;
        if let Some(stack) = self.display_stacks.first() {
            write!(f, " {}", stack.display_name())?;
        }
        if let Some(count) = self.requestable.deliverable_count() {
            write!(f, " x{count}")?;
        }
        Ok(())
    }
}
