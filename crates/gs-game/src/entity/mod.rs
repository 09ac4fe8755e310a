//! Scene entities.

pub mod client_gadget;
pub mod gadget;
pub mod item;

pub use client_gadget::{CreateGadgetRequest, EntityClientGadget};
pub use gadget::{GadgetBase, GadgetEntity};
pub use item::EntityItem;

use gs_proto::packets::SceneEntityInfo;
use gs_proto::types::Vec3;

/// Anything a scene can hold.
#[derive(Debug, Clone)]
pub enum Entity {
    Item(EntityItem),
    ClientGadget(EntityClientGadget),
}

impl Entity {
    fn gadget(&self) -> &dyn GadgetEntity {
        match self {
            Entity::Item(item) => item,
            Entity::ClientGadget(gadget) => gadget,
        }
    }

    pub fn id(&self) -> u32 {
        self.gadget().id()
    }

    pub fn position(&self) -> Vec3 {
        self.gadget().position()
    }

    pub fn rotation(&self) -> Vec3 {
        self.gadget().rotation()
    }

    pub fn to_proto(&self) -> SceneEntityInfo {
        self.gadget().to_proto()
    }

    pub fn as_item(&self) -> Option<&EntityItem> {
        match self {
            Entity::Item(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_client_gadget(&self) -> Option<&EntityClientGadget> {
        match self {
            Entity::ClientGadget(gadget) => Some(gadget),
            _ => None,
        }
    }
}

impl From<EntityItem> for Entity {
    fn from(item: EntityItem) -> Self {
        Entity::Item(item)
    }
}

impl From<EntityClientGadget> for Entity {
    fn from(gadget: EntityClientGadget) -> Self {
        Entity::ClientGadget(gadget)
    }
}
