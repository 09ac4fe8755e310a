//! SceneTimeNotify: Server → Client.
//!
//! Synchronizes the in-game clock of a scene.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::packets::{id, Packet};
use crate::wire::{self, WireMessage, WireType};

/// `{ uint32 scene_id = 1; uint64 scene_time = 2; bool is_paused = 3; }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneTimeNotify {
    pub scene_id: u32,
    /// Minutes since midnight.
    pub scene_time: u64,
    pub is_paused: bool,
}

impl Packet for SceneTimeNotify {
    const CMD_ID: u16 = id::SCENE_TIME_NOTIFY;
}

impl WireMessage for SceneTimeNotify {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        wire::write_uint32(buf, 1, self.scene_id);
        wire::write_uint64(buf, 2, self.scene_time);
        wire::write_bool(buf, 3, self.is_paused);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.scene_id = wire::read_uint32(buf, wire_type)?,
            2 => self.scene_time = wire::read_uint64(buf, wire_type)?,
            3 => self.is_paused = wire::read_bool(buf, wire_type)?,
            _ => wire::skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_time() {
        let pkt = SceneTimeNotify {
            scene_id: 3,
            scene_time: 480,
            is_paused: false,
        };
        // scene_id=3, scene_time=480 (0xE0 0x03)
        assert_eq!(&pkt.encode_to_bytes()[..], &[0x08, 0x03, 0x10, 0xE0, 0x03]);
    }
}
