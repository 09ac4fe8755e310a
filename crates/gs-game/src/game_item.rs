//! Item value object: a definition paired with a stack size.

use std::collections::BTreeMap;
use std::sync::Arc;

use gs_proto::item::{ItemDetail, ItemPayload, ReliquaryDetail, WeaponDetail};

use crate::item_data::{ItemData, ItemType};

/// One item instance. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GameItem {
    item_data: Arc<ItemData>,
    guid: u64,
    count: u32,
    level: u32,
    exp: u32,
    promote_level: u32,
    refinement: u32,
    affixes: Vec<u32>,
}

impl GameItem {
    pub fn new(item_data: Arc<ItemData>, count: u32) -> Self {
        let item_type = item_data.item_type;
        let (count, level) = if item_type.is_equip() {
            (1, 1)
        } else {
            (count, 0)
        };
        let affixes = match item_type {
            ItemType::Weapon => item_data
                .skill_affix
                .iter()
                .copied()
                .filter(|&affix| affix > 0)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            item_data,
            // Dropped items are not owned by anyone yet.
            guid: 0,
            count,
            level,
            exp: 0,
            promote_level: 0,
            refinement: 0,
            affixes,
        }
    }

    pub fn item_data(&self) -> &Arc<ItemData> {
        &self.item_data
    }

    pub fn item_id(&self) -> u32 {
        self.item_data.id
    }

    pub fn item_type(&self) -> ItemType {
        self.item_data.item_type
    }

    pub fn guid(&self) -> u64 {
        self.guid
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn to_proto(&self) -> ItemPayload {
        let detail = match self.item_type() {
            ItemType::Weapon => ItemDetail::Weapon(WeaponDetail {
                level: self.level,
                exp: self.exp,
                promote_level: self.promote_level,
                affix_map: self
                    .affixes
                    .iter()
                    .map(|&affix| (affix, self.refinement))
                    .collect::<BTreeMap<_, _>>(),
            }),
            ItemType::Reliquary => ItemDetail::Reliquary(ReliquaryDetail {
                level: self.level,
                exp: self.exp,
                promote_level: self.promote_level,
                main_prop_id: self.item_data.main_prop_id,
            }),
            ItemType::Furniture => ItemDetail::Furniture { count: self.count },
            ItemType::Virtual | ItemType::Material | ItemType::Display => {
                ItemDetail::Material { count: self.count }
            }
        };

        ItemPayload {
            item_id: self.item_id(),
            guid: self.guid,
            detail,
        }
    }
}
