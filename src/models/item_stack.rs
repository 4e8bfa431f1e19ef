//! Item stacks as they travel between requests and citizen inventories.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{AIR_ITEM_NAMES, ITEM_NAMESPACES};

/// A stack of one item type, identified by its description id
/// (e.g. `item.minecraft.oak_planks`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub count: u32,
    #[serde(default = "default_max_stack_size")]
    pub max_stack_size: u32,
}

fn default_max_stack_size() -> u32 {
    64
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, count: u32, max_stack_size: u32) -> Self {
        Self {
            item_id: item_id.into(),
            count,
            max_stack_size,
        }
    }

    pub fn empty() -> Self {
        Self::new("air", 0, default_max_stack_size())
    }

    /// Zero count, or one of the air items. Only the last `.`/`:` segment
    /// of the id is compared, so `oak_chair` is a real item.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item_id.is_empty() || self.is_air()
    }

    fn is_air(&self) -> bool {
        let path = self
            .item_id
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(&self.item_id);
        AIR_ITEM_NAMES.contains(&path)
    }

    /// Same item, different count.
    pub fn with_count(&self, count: u32) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// `item.minecraft.oak_planks` => `oak_planks`
    pub fn display_name(&self) -> String {
        let mut name = self
            .item_id
            .strip_prefix("item.")
            .or_else(|| self.item_id.strip_prefix("block."))
            .unwrap_or(&self.item_id)
            .to_string();
        for namespace in ITEM_NAMESPACES {
            name = name.replace(namespace, "");
        }
        name
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.count, self.display_name())
    }
}
