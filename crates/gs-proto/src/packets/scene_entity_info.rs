//! SceneEntityInfo: one entity as seen by clients in a scene.
//!
//! ```text
//! SceneEntityInfo { ProtEntityType entity_type = 1; uint32 entity_id = 2;
//!                   MotionInfo motion_info = 4; LifeState life_state = 7;
//!                   SceneGadgetInfo gadget = 19; }
//! MotionInfo      { Vector pos = 1; Vector rot = 2; Vector speed = 3; }
//! ```

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::packets::SceneGadgetInfo;
use crate::types::Vec3;
use crate::wire::{self, WireEnum, WireMessage, WireType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtEntityType {
    #[default]
    None = 0,
    Avatar = 1,
    Monster = 2,
    Npc = 3,
    Gadget = 4,
    Weather = 7,
    Team = 9,
    MpLevel = 11,
}

impl WireEnum for ProtEntityType {
    const NAME: &'static str = "ProtEntityType";

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Avatar),
            2 => Some(Self::Monster),
            3 => Some(Self::Npc),
            4 => Some(Self::Gadget),
            7 => Some(Self::Weather),
            9 => Some(Self::Team),
            11 => Some(Self::MpLevel),
            _ => None,
        }
    }

    fn as_u32(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LifeState {
    #[default]
    None = 0,
    Alive = 1,
    Dead = 2,
    Revive = 3,
}

impl WireEnum for LifeState {
    const NAME: &'static str = "LifeState";

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Alive),
            2 => Some(Self::Dead),
            3 => Some(Self::Revive),
            _ => None,
        }
    }

    fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Where an entity is and where it is heading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionInfo {
    pub pos: Vec3,
    pub rot: Vec3,
    pub speed: Vec3,
}

impl WireMessage for MotionInfo {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_message(buf, 1, &self.pos);
        wire::write_message(buf, 2, &self.rot);
        wire::write_message(buf, 3, &self.speed);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.pos = wire::read_message(buf, wire_type)?,
            2 => self.rot = wire::read_message(buf, wire_type)?,
            3 => self.speed = wire::read_message(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneEntityInfo {
    pub entity_type: ProtEntityType,
    pub entity_id: u32,
    pub motion_info: MotionInfo,
    pub life_state: LifeState,
    pub gadget: Option<SceneGadgetInfo>,
}

impl WireMessage for SceneEntityInfo {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_enum(buf, 1, self.entity_type);
        wire::write_uint32(buf, 2, self.entity_id);
        wire::write_message(buf, 4, &self.motion_info);
        wire::write_enum(buf, 7, self.life_state);
        if let Some(gadget) = &self.gadget {
            wire::write_message(buf, 19, gadget);
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.entity_type = wire::read_enum(buf, wire_type)?,
            2 => self.entity_id = wire::read_uint32(buf, wire_type)?,
            4 => self.motion_info = wire::read_message(buf, wire_type)?,
            7 => self.life_state = wire::read_enum(buf, wire_type)?,
            19 => self.gadget = Some(wire::read_message(buf, wire_type)?),
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}
