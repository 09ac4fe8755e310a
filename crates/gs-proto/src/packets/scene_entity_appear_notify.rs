//! SceneEntityAppearNotify: Server → Client.
//!
//! Makes one or more entities visible to the receiving players.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::packets::{id, Packet, SceneEntityInfo};
use crate::wire::{self, WireEnum, WireMessage, WireType};

/// Why an entity enters or leaves a player's view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisionType {
    #[default]
    None = 0,
    Meet = 1,
    Reborn = 2,
    Replace = 3,
    WaypointReborn = 4,
    Miss = 5,
    Die = 6,
    GatherEscape = 7,
    Refresh = 8,
    Transport = 9,
    ReplaceDie = 10,
    ReplaceNoNotify = 11,
    Born = 12,
    Pickup = 13,
    Remove = 14,
}

impl WireEnum for VisionType {
    const NAME: &'static str = "VisionType";

    fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::None,
            1 => Self::Meet,
            2 => Self::Reborn,
            3 => Self::Replace,
            4 => Self::WaypointReborn,
            5 => Self::Miss,
            6 => Self::Die,
            7 => Self::GatherEscape,
            8 => Self::Refresh,
            9 => Self::Transport,
            10 => Self::ReplaceDie,
            11 => Self::ReplaceNoNotify,
            12 => Self::Born,
            13 => Self::Pickup,
            14 => Self::Remove,
            _ => return None,
        })
    }

    fn as_u32(self) -> u32 {
        self as u32
    }
}

/// `{ repeated SceneEntityInfo entity_list = 1; VisionType appear_type = 2; uint32 param = 3; }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneEntityAppearNotify {
    pub entity_list: Vec<SceneEntityInfo>,
    pub appear_type: VisionType,
    /// For [`VisionType::Replace`], the id of the entity being replaced.
    pub param: u32,
}

impl SceneEntityAppearNotify {
    pub fn new(entity_list: Vec<SceneEntityInfo>, appear_type: VisionType) -> Self {
        Self {
            entity_list,
            appear_type,
            param: 0,
        }
    }
}

impl Packet for SceneEntityAppearNotify {
    const CMD_ID: u16 = id::SCENE_ENTITY_APPEAR_NOTIFY;
}

impl WireMessage for SceneEntityAppearNotify {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        for entity in &self.entity_list {
            wire::write_message(buf, 1, entity);
        }
        wire::write_enum(buf, 2, self.appear_type);
        wire::write_uint32(buf, 3, self.param);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.entity_list.push(wire::read_message(buf, wire_type)?),
            2 => self.appear_type = wire::read_enum(buf, wire_type)?,
            3 => self.param = wire::read_uint32(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}
