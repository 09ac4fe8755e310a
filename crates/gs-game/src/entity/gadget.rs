//! State and serialization shared by every gadget.

use gs_proto::packets::{
    GadgetBornType, LifeState, MotionInfo, SceneEntityInfo, SceneGadgetInfo,
    SceneGadgetInfoBuilder,
};
use gs_proto::types::Vec3;

use crate::entity_id::EntityIdType;

/// Fields common to all gadgets.
#[derive(Debug, Clone, PartialEq)]
pub struct GadgetBase {
    pub(crate) id: u32,
    pub(crate) scene_id: u32,
    pub(crate) position: Vec3,
    pub(crate) rotation: Vec3,
    pub(crate) gadget_id: u32,
    pub(crate) authority_peer_id: u32,
    pub(crate) born_type: GadgetBornType,
    pub(crate) enable_interact: bool,
    pub(crate) config_id: u32,
    pub(crate) group_id: u32,
    pub(crate) gadget_state: u32,
    pub(crate) gadget_type: u32,
    pub(crate) owner_entity_id: u32,
    pub(crate) life_state: LifeState,
}

impl GadgetBase {
    pub(crate) fn new(
        id: u32,
        scene_id: u32,
        gadget_id: u32,
        authority_peer_id: u32,
        position: Vec3,
        rotation: Vec3,
    ) -> Self {
        Self {
            id,
            scene_id,
            position,
            rotation,
            gadget_id,
            authority_peer_id,
            born_type: GadgetBornType::None,
            enable_interact: false,
            config_id: 0,
            group_id: 0,
            gadget_state: 0,
            gadget_type: 0,
            owner_entity_id: 0,
            life_state: LifeState::Alive,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn scene_id(&self) -> u32 {
        self.scene_id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn gadget_id(&self) -> u32 {
        self.gadget_id
    }

    pub fn authority_peer_id(&self) -> u32 {
        self.authority_peer_id
    }

    pub fn born_type(&self) -> GadgetBornType {
        self.born_type
    }

    pub fn is_enable_interact(&self) -> bool {
        self.enable_interact
    }

    pub fn config_id(&self) -> u32 {
        self.config_id
    }

    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn gadget_type(&self) -> u32 {
        self.gadget_type
    }

    pub fn life_state(&self) -> LifeState {
        self.life_state
    }

    /// Builder pre-filled with the generic gadget fields.
    pub fn gadget_init_proto(&self) -> SceneGadgetInfoBuilder {
        SceneGadgetInfo::builder()
            .gadget_id(self.gadget_id)
            .group_id(self.group_id)
            .config_id(self.config_id)
            .owner_entity_id(self.owner_entity_id)
            .born_type(self.born_type)
            .gadget_state(self.gadget_state)
            .gadget_type(self.gadget_type)
            .authority_peer_id(self.authority_peer_id)
            .enable_interact(self.enable_interact)
    }

    /// Wrap a finished gadget record into a full scene entity record.
    pub fn to_entity_info(&self, gadget: SceneGadgetInfo) -> SceneEntityInfo {
        SceneEntityInfo {
            entity_type: EntityIdType::Gadget.prot_entity_type(),
            entity_id: self.id,
            motion_info: MotionInfo {
                pos: self.position,
                rot: self.rotation,
                speed: Vec3::ZERO,
            },
            life_state: self.life_state,
            gadget: Some(gadget),
        }
    }
}

/// A gadget kind: shared base state plus its own gadget content.
pub trait GadgetEntity {
    fn base(&self) -> &GadgetBase;

    fn to_gadget_proto(&self) -> SceneGadgetInfo;

    fn id(&self) -> u32 {
        self.base().id()
    }

    fn position(&self) -> Vec3 {
        self.base().position()
    }

    fn rotation(&self) -> Vec3 {
        self.base().rotation()
    }

    fn to_proto(&self) -> SceneEntityInfo {
        self.base().to_entity_info(self.to_gadget_proto())
    }
}
