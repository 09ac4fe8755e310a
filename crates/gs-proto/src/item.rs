//! Item payload: the serialized form of one item stack or equipment piece.
//!
//! ```text
//! Item      { uint32 item_id = 1; uint64 guid = 2;
//!             oneof detail { Material material = 5; Equip equip = 6; Furniture furniture = 7; } }
//! Material  { uint32 count = 1; }
//! Furniture { uint32 count = 1; }
//! Equip     { oneof detail { Reliquary reliquary = 1; Weapon weapon = 2; } bool is_locked = 3; }
//! Weapon    { uint32 level = 1; uint32 exp = 2; uint32 promote_level = 3; map<uint32, uint32> affix_map = 4; }
//! Reliquary { uint32 level = 1; uint32 exp = 2; uint32 promote_level = 3; uint32 main_prop_id = 4; }
//! ```

use std::collections::BTreeMap;

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::wire::{self, WireMessage, WireType};

/// Serialized item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPayload {
    pub item_id: u32,
    pub guid: u64,
    pub detail: ItemDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemDetail {
    Material { count: u32 },
    Furniture { count: u32 },
    Weapon(WeaponDetail),
    Reliquary(ReliquaryDetail),
}

impl Default for ItemDetail {
    fn default() -> Self {
        ItemDetail::Material { count: 0 }
    }
}

impl ItemPayload {
    /// Stack size carried by the payload. Equipment always counts as one.
    pub fn count(&self) -> u32 {
        match &self.detail {
            ItemDetail::Material { count } | ItemDetail::Furniture { count } => *count,
            ItemDetail::Weapon(_) | ItemDetail::Reliquary(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponDetail {
    pub level: u32,
    pub exp: u32,
    pub promote_level: u32,
    /// Affix id → refinement index.
    pub affix_map: BTreeMap<u32, u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReliquaryDetail {
    pub level: u32,
    pub exp: u32,
    pub promote_level: u32,
    pub main_prop_id: u32,
}

impl WireMessage for ItemPayload {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.item_id);
        wire::write_uint64(buf, 2, self.guid);
        match &self.detail {
            ItemDetail::Material { count } => wire::write_message(buf, 5, &Count(*count)),
            ItemDetail::Furniture { count } => wire::write_message(buf, 7, &Count(*count)),
            ItemDetail::Weapon(weapon) => {
                wire::write_message(buf, 6, &Equip::Weapon(weapon.clone()))
            }
            ItemDetail::Reliquary(reliquary) => {
                wire::write_message(buf, 6, &Equip::Reliquary(reliquary.clone()))
            }
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.item_id = wire::read_uint32(buf, wire_type)?,
            2 => self.guid = wire::read_uint64(buf, wire_type)?,
            5 => {
                let Count(count) = wire::read_message(buf, wire_type)?;
                self.detail = ItemDetail::Material { count };
            }
            6 => {
                self.detail = match wire::read_message::<Equip>(buf, wire_type)? {
                    Equip::Weapon(weapon) => ItemDetail::Weapon(weapon),
                    Equip::Reliquary(reliquary) => ItemDetail::Reliquary(reliquary),
                    Equip::Empty => {
                        return Err(ProtoError::InvalidData("equip without detail".into()))
                    }
                };
            }
            7 => {
                let Count(count) = wire::read_message(buf, wire_type)?;
                self.detail = ItemDetail::Furniture { count };
            }
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

/// Shared shape of `Material` and `Furniture`.
#[derive(Default)]
struct Count(u32);

impl WireMessage for Count {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.0);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.0 = wire::read_uint32(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

#[derive(Default)]
enum Equip {
    #[default]
    Empty,
    Reliquary(ReliquaryDetail),
    Weapon(WeaponDetail),
}

impl WireMessage for Equip {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        match self {
            Equip::Empty => {}
            Equip::Reliquary(reliquary) => wire::write_message(buf, 1, reliquary),
            Equip::Weapon(weapon) => wire::write_message(buf, 2, weapon),
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => *self = Equip::Reliquary(wire::read_message(buf, wire_type)?),
            2 => *self = Equip::Weapon(wire::read_message(buf, wire_type)?),
            // is_locked is not tracked server-side for dropped equipment.
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

impl WireMessage for WeaponDetail {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.level);
        wire::write_uint32(buf, 2, self.exp);
        wire::write_uint32(buf, 3, self.promote_level);
        wire::write_uint32_map(buf, 4, &self.affix_map);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.level = wire::read_uint32(buf, wire_type)?,
            2 => self.exp = wire::read_uint32(buf, wire_type)?,
            3 => self.promote_level = wire::read_uint32(buf, wire_type)?,
            4 => wire::read_uint32_map_entry(buf, wire_type, &mut self.affix_map)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

impl WireMessage for ReliquaryDetail {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.level);
        wire::write_uint32(buf, 2, self.exp);
        wire::write_uint32(buf, 3, self.promote_level);
        wire::write_uint32(buf, 4, self.main_prop_id);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.level = wire::read_uint32(buf, wire_type)?,
            2 => self.exp = wire::read_uint32(buf, wire_type)?,
            3 => self.promote_level = wire::read_uint32(buf, wire_type)?,
            4 => self.main_prop_id = wire::read_uint32(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}
