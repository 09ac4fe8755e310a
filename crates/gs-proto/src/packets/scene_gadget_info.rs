//! SceneGadgetInfo: gadget-specific part of a scene entity record.
//!
//! ```text
//! SceneGadgetInfo { uint32 gadget_id = 1; uint32 group_id = 2; uint32 config_id = 3;
//!                   uint32 owner_entity_id = 4; GadgetBornType born_type = 5;
//!                   uint32 gadget_state = 6; uint32 gadget_type = 7;
//!                   uint32 authority_peer_id = 9; bool is_enable_interact = 10;
//!                   oneof content { Item trifle_item = 12; ClientGadgetInfo client_gadget = 13; } }
//! ```

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::item::ItemPayload;
use crate::wire::{self, WireEnum, WireMessage, WireType};

/// How a gadget shows up when it is spawned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GadgetBornType {
    #[default]
    None = 0,
    InAir = 1,
    PlayerUse = 2,
    MonsterHit = 3,
    MonsterDie = 4,
    Gadget = 5,
    Ground = 6,
}

impl WireEnum for GadgetBornType {
    const NAME: &'static str = "GadgetBornType";

    fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::InAir),
            2 => Some(Self::PlayerUse),
            3 => Some(Self::MonsterHit),
            4 => Some(Self::MonsterDie),
            5 => Some(Self::Gadget),
            6 => Some(Self::Ground),
            _ => None,
        }
    }

    fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Type-specific content of a gadget.
#[derive(Debug, Clone, PartialEq)]
pub enum GadgetContent {
    /// A dropped item waiting to be picked up.
    TrifleItem(ItemPayload),
    /// A gadget created by a client (e.g. an elemental construct).
    ClientGadget(ClientGadgetInfo),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientGadgetInfo {
    pub camp_id: u32,
    pub camp_type: u32,
    pub guid: u64,
    pub owner_entity_id: u32,
    pub target_entity_id: u32,
    pub async_load: bool,
}

impl WireMessage for ClientGadgetInfo {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.camp_id);
        wire::write_uint32(buf, 2, self.camp_type);
        wire::write_uint64(buf, 3, self.guid);
        wire::write_uint32(buf, 4, self.owner_entity_id);
        wire::write_uint32(buf, 5, self.target_entity_id);
        wire::write_bool(buf, 6, self.async_load);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.camp_id = wire::read_uint32(buf, wire_type)?,
            2 => self.camp_type = wire::read_uint32(buf, wire_type)?,
            3 => self.guid = wire::read_uint64(buf, wire_type)?,
            4 => self.owner_entity_id = wire::read_uint32(buf, wire_type)?,
            5 => self.target_entity_id = wire::read_uint32(buf, wire_type)?,
            6 => self.async_load = wire::read_bool(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

/// Gadget record sent inside a scene entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGadgetInfo {
    pub gadget_id: u32,
    pub group_id: u32,
    pub config_id: u32,
    pub owner_entity_id: u32,
    pub born_type: GadgetBornType,
    pub gadget_state: u32,
    pub gadget_type: u32,
    pub authority_peer_id: u32,
    pub is_enable_interact: bool,
    pub content: Option<GadgetContent>,
}

impl SceneGadgetInfo {
    pub fn builder() -> SceneGadgetInfoBuilder {
        SceneGadgetInfoBuilder::default()
    }

    pub fn trifle_item(&self) -> Option<&ItemPayload> {
        match &self.content {
            Some(GadgetContent::TrifleItem(item)) => Some(item),
            _ => None,
        }
    }

    pub fn client_gadget(&self) -> Option<&ClientGadgetInfo> {
        match &self.content {
            Some(GadgetContent::ClientGadget(info)) => Some(info),
            _ => None,
        }
    }
}

impl WireMessage for SceneGadgetInfo {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.gadget_id);
        wire::write_uint32(buf, 2, self.group_id);
        wire::write_uint32(buf, 3, self.config_id);
        wire::write_uint32(buf, 4, self.owner_entity_id);
        wire::write_enum(buf, 5, self.born_type);
        wire::write_uint32(buf, 6, self.gadget_state);
        wire::write_uint32(buf, 7, self.gadget_type);
        wire::write_uint32(buf, 9, self.authority_peer_id);
        wire::write_bool(buf, 10, self.is_enable_interact);
        match &self.content {
            Some(GadgetContent::TrifleItem(item)) => wire::write_message(buf, 12, item),
            Some(GadgetContent::ClientGadget(info)) => wire::write_message(buf, 13, info),
            None => {}
        }
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.gadget_id = wire::read_uint32(buf, wire_type)?,
            2 => self.group_id = wire::read_uint32(buf, wire_type)?,
            3 => self.config_id = wire::read_uint32(buf, wire_type)?,
            4 => self.owner_entity_id = wire::read_uint32(buf, wire_type)?,
            5 => self.born_type = wire::read_enum(buf, wire_type)?,
            6 => self.gadget_state = wire::read_uint32(buf, wire_type)?,
            7 => self.gadget_type = wire::read_uint32(buf, wire_type)?,
            9 => self.authority_peer_id = wire::read_uint32(buf, wire_type)?,
            10 => self.is_enable_interact = wire::read_bool(buf, wire_type)?,
            12 => {
                self.content = Some(GadgetContent::TrifleItem(wire::read_message(
                    buf, wire_type,
                )?))
            }
            13 => {
                self.content = Some(GadgetContent::ClientGadget(wire::read_message(
                    buf, wire_type,
                )?))
            }
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

/// Incrementally assembles a [`SceneGadgetInfo`].
///
/// Gadget kinds start from a builder pre-filled with the generic fields and
/// only add their own content before calling [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SceneGadgetInfoBuilder {
    info: SceneGadgetInfo,
}

impl SceneGadgetInfoBuilder {
    pub fn gadget_id(mut self, gadget_id: u32) -> Self {
        self.info.gadget_id = gadget_id;
        self
    }

    pub fn group_id(mut self, group_id: u32) -> Self {
        self.info.group_id = group_id;
        self
    }

    pub fn config_id(mut self, config_id: u32) -> Self {
        self.info.config_id = config_id;
        self
    }

    pub fn owner_entity_id(mut self, owner_entity_id: u32) -> Self {
        self.info.owner_entity_id = owner_entity_id;
        self
    }

    pub fn born_type(mut self, born_type: GadgetBornType) -> Self {
        self.info.born_type = born_type;
        self
    }

    pub fn gadget_state(mut self, gadget_state: u32) -> Self {
        self.info.gadget_state = gadget_state;
        self
    }

    pub fn gadget_type(mut self, gadget_type: u32) -> Self {
        self.info.gadget_type = gadget_type;
        self
    }

    pub fn authority_peer_id(mut self, authority_peer_id: u32) -> Self {
        self.info.authority_peer_id = authority_peer_id;
        self
    }

    pub fn enable_interact(mut self, enable: bool) -> Self {
        self.info.is_enable_interact = enable;
        self
    }

    pub fn trifle_item(mut self, item: ItemPayload) -> Self {
        self.info.content = Some(GadgetContent::TrifleItem(item));
        self
    }

    pub fn client_gadget(mut self, info: ClientGadgetInfo) -> Self {
        self.info.content = Some(GadgetContent::ClientGadget(info));
        self
    }

    pub fn build(self) -> SceneGadgetInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDetail;

    fn sample_item() -> ItemPayload {
        ItemPayload {
            item_id: 101,
            guid: 0,
            detail: ItemDetail::Material { count: 5 },
        }
    }

    #[test]
    fn builder_sets_fields() {
        let info = SceneGadgetInfo::builder()
            .gadget_id(70600055)
            .born_type(GadgetBornType::InAir)
            .authority_peer_id(1)
            .enable_interact(true)
            .trifle_item(sample_item())
            .build();
        assert_eq!(info.gadget_id, 70600055);
        assert_eq!(info.born_type, GadgetBornType::InAir);
        assert_eq!(info.authority_peer_id, 1);
        assert!(info.is_enable_interact);
        assert_eq!(info.trifle_item(), Some(&sample_item()));
        assert!(info.client_gadget().is_none());
    }

    #[test]
    fn content_replaced_not_merged() {
        let info = SceneGadgetInfo::builder()
            .trifle_item(sample_item())
            .client_gadget(ClientGadgetInfo::default())
            .build();
        assert!(info.trifle_item().is_none());
        assert!(info.client_gadget().is_some());
    }

    #[test]
    fn decode_trifle_item_gadget() {
        let info = SceneGadgetInfo::builder()
            .gadget_id(70600055)
            .config_id(3)
            .gadget_type(1)
            .born_type(GadgetBornType::InAir)
            .authority_peer_id(2)
            .enable_interact(true)
            .trifle_item(sample_item())
            .build();
        let decoded = SceneGadgetInfo::decode(&mut info.encode_to_bytes()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.gadget_type, 1);
    }

    #[test]
    fn decode_client_gadget() {
        let info = SceneGadgetInfo::builder()
            .gadget_id(41038001)
            .born_type(GadgetBornType::PlayerUse)
            .client_gadget(ClientGadgetInfo {
                camp_id: 1,
                camp_type: 2,
                guid: 77,
                owner_entity_id: 0x0100_0001,
                target_entity_id: 0,
                async_load: true,
            })
            .build();
        let decoded = SceneGadgetInfo::decode(&mut info.encode_to_bytes()).unwrap();
        assert_eq!(decoded.client_gadget().map(|c| c.guid), Some(77));
        assert_eq!(decoded, info);
    }

    #[test]
    fn bad_born_type_rejected() {
        // born_type = 42
        let mut data = bytes::Bytes::from_static(&[0x28, 42]);
        assert!(matches!(
            SceneGadgetInfo::decode(&mut data),
            Err(ProtoError::InvalidEnum { name: "GadgetBornType", value: 42 })
        ));
    }
}
