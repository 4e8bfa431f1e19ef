//! Value types returned by the colony gateway.
//!
//! These are owned snapshots of the external colony state. Nothing here
//! holds a live reference into the dependency; every mutation goes back
//! through [`crate::gateway::ColonyGateway`].

pub mod colony;
pub mod item_stack;
pub mod request;

pub use colony::{Building, BuildingId, Citizen, CitizenId, Colony, ColonyId};
pub use item_stack::ItemStack;
pub use request::{Request, RequestId, RequestState, Requestable, Requester};
