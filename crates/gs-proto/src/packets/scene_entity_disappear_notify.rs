//! SceneEntityDisappearNotify: Server → Client.
//!
//! Removes entities from the receiving players' view.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::packets::{id, Packet, VisionType};
use crate::wire::{self, WireMessage, WireType};

/// `{ repeated uint32 entity_list = 1; VisionType disappear_type = 2; }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneEntityDisappearNotify {
    pub entity_list: Vec<u32>,
    pub disappear_type: VisionType,
}

impl SceneEntityDisappearNotify {
    pub fn new(entity_list: Vec<u32>, disappear_type: VisionType) -> Self {
        Self {
            entity_list,
            disappear_type,
        }
    }
}

impl Packet for SceneEntityDisappearNotify {
    const CMD_ID: u16 = id::SCENE_ENTITY_DISAPPEAR_NOTIFY;
}

impl WireMessage for SceneEntityDisappearNotify {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_packed_uint32(buf, 1, &self.entity_list);
        wire::write_enum(buf, 2, self.disappear_type);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => wire::read_packed_uint32(buf, wire_type, &mut self.entity_list)?,
            2 => self.disappear_type = wire::read_enum(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_single_entity() {
        let pkt = SceneEntityDisappearNotify::new(vec![0x0400_0001], VisionType::Die);
        let bytes = pkt.encode_to_bytes();
        // key(1, LD) + len(4) + varint(0x04000001)=4 bytes + key(2, varint) + 6
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes[0], 0x0A);
        assert_eq!(bytes[1], 4);
        assert_eq!(&bytes[6..], &[0x10, 6]);
    }

    #[test]
    fn decode_many() {
        let pkt = SceneEntityDisappearNotify::new(vec![1, 2, 0x0400_0003], VisionType::Remove);
        let decoded = SceneEntityDisappearNotify::decode(&mut pkt.encode_to_bytes()).unwrap();
        assert_eq!(decoded, pkt);
    }
}
