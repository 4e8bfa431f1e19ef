//! # Colony Gateway
//!
//! Port to the external colony simulation. The poller only sees
//! [`ColonyGateway`]; adapters decide how the surface is reached.
//!
//! - [`InMemoryColonyGateway`] - owned simulated world, used by the binary
//!   and by tests

pub mod in_memory;
pub mod traits;

pub use in_memory::{
    BuildingSnapshot, CitizenSnapshot, ColonySnapshot, InMemoryColonyGateway, WorldSnapshot,
};
pub use traits::{ColonyGateway, GatewayError, GatewayResult};
