//! Item definitions loaded from the item excel table (a JSON array).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::GameError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ItemType {
    #[serde(rename = "ITEM_VIRTUAL")]
    Virtual,
    #[default]
    #[serde(rename = "ITEM_MATERIAL")]
    Material,
    #[serde(rename = "ITEM_RELIQUARY")]
    Reliquary,
    #[serde(rename = "ITEM_WEAPON")]
    Weapon,
    #[serde(rename = "ITEM_DISPLAY")]
    Display,
    #[serde(rename = "ITEM_FURNITURE")]
    Furniture,
}

impl ItemType {
    /// Weapons and artifacts never stack.
    pub fn is_equip(&self) -> bool {
        matches!(self, Self::Weapon | Self::Reliquary)
    }
}

/// Static definition of one item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub item_type: ItemType,
    /// Gadget shown in the world when the item is dropped.
    #[serde(default)]
    pub gadget_id: u32,
    #[serde(default = "default_stack_limit")]
    pub stack_limit: u32,
    #[serde(default)]
    pub rank_level: u32,
    /// Weapon passive affixes; zero entries are placeholders.
    #[serde(default)]
    pub skill_affix: Vec<u32>,
    /// Main stat of an artifact.
    #[serde(default)]
    pub main_prop_id: u32,
}

fn default_stack_limit() -> u32 {
    1
}

/// Every known item definition, keyed by id.
#[derive(Debug, Default)]
pub struct ItemDataRegistry {
    by_id: HashMap<u32, Arc<ItemData>>,
}

impl ItemDataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let entries: Vec<ItemData> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(entry);
        }
        debug!("Loaded {} item definitions", registry.len());
        Ok(registry)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Register a definition. A later definition replaces an earlier one.
    pub fn insert(&mut self, data: ItemData) -> Arc<ItemData> {
        let id = data.id;
        let data = Arc::new(data);
        if self.by_id.insert(id, data.clone()).is_some() {
            warn!("Duplicate item definition {}, keeping the last one", id);
        }
        data
    }

    pub fn get(&self, id: u32) -> Option<Arc<ItemData>> {
        self.by_id.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemData>> {
        self.by_id.values()
    }
}
