//! Colonies, buildings and citizens as read from the colony surface.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ColonyId = u32;
pub type BuildingId = u64;
pub type CitizenId = u64;

/// Top-level domain of the colony surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Colony {
    pub id: ColonyId,
    pub name: String,
}

impl fmt::Display for Colony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

/// A building inside a colony. Only requester buildings can raise requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    /// Concrete building type, e.g. `BuildingBuilder`
    pub kind: String,
    #[serde(default = "default_true")]
    pub is_requester: bool,
}

fn default_true() -> bool {
    true
}

impl Building {
    /// `BuildingBuilder` => `Builder`
    pub fn display_name(&self) -> String {
        let name = self.kind.replace("Building", "");
        if name.is_empty() {
            self.kind.clone()
        } else {
            name
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.kind, self.id)
    }
}

/// A villager that can hold items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,
}

impl fmt::Display for Citizen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_display_name_strips_type_marker() {
        let builder = Building {
            id: 1,
            kind: "BuildingBuilder".into(),
            is_requester: true,
        };
        assert_eq!(builder.display_name(), "Builder");

        let bare = Building {
            id: 2,
            kind: "Building".into(),
            is_requester: true,
        };
        assert_eq!(bare.display_name(), "Building");
    }
}
