//! Packet framing.
//!
//! ```text
//! u16 0x4567 | u16 cmd_id | u16 head_len | u32 payload_len | head | payload | u16 0x89AB
//! ```
//!
//! All integers are big-endian. The head is an opaque, possibly empty,
//! metadata message.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::ensure_remaining;
use crate::error::ProtoError;
use crate::packets::Packet;

pub const HEAD_MAGIC: u16 = 0x4567;
pub const TAIL_MAGIC: u16 = 0x89AB;

/// Fixed bytes around head and payload.
pub const FRAME_OVERHEAD: usize = 2 + 2 + 2 + 4 + 2;

/// One framed game packet.
#[derive(Debug, Clone, PartialEq)]
pub struct GamePacket {
    pub cmd_id: u16,
    pub head: Bytes,
    pub payload: Bytes,
}

impl GamePacket {
    /// Frame a typed packet with an empty head.
    pub fn new<P: Packet>(packet: &P) -> Self {
        Self {
            cmd_id: P::CMD_ID,
            head: Bytes::new(),
            payload: packet.encode_to_bytes(),
        }
    }

    /// Size of this packet once framed.
    pub fn framed_len(&self) -> usize {
        FRAME_OVERHEAD + self.head.len() + self.payload.len()
    }

    /// Decode the payload as `P`, checking the command id first.
    pub fn decode_payload<P: Packet>(&self) -> Result<P, ProtoError> {
        if self.cmd_id != P::CMD_ID {
            return Err(ProtoError::InvalidData(format!(
                "expected cmd {}, got {}",
                P::CMD_ID,
                self.cmd_id
            )));
        }
        P::decode(&mut self.payload.clone())
    }
}

pub fn encode_frame(packet: &GamePacket) -> Result<Bytes, ProtoError> {
    let head_len =
        u16::try_from(packet.head.len()).map_err(|_| ProtoError::FrameTooLarge(packet.head.len()))?;
    let payload_len = u32::try_from(packet.payload.len())
        .map_err(|_| ProtoError::FrameTooLarge(packet.payload.len()))?;

    let mut buf = BytesMut::with_capacity(packet.framed_len());
    buf.put_u16(HEAD_MAGIC);
    buf.put_u16(packet.cmd_id);
    buf.put_u16(head_len);
    buf.put_u32(payload_len);
    buf.put_slice(&packet.head);
    buf.put_slice(&packet.payload);
    buf.put_u16(TAIL_MAGIC);
    Ok(buf.freeze())
}

/// Decode one frame from the front of `buf`, leaving any following frames.
pub fn decode_frame(buf: &mut impl Buf) -> Result<GamePacket, ProtoError> {
    ensure_remaining(&*buf, FRAME_OVERHEAD)?;
    let magic = buf.get_u16();
    if magic != HEAD_MAGIC {
        return Err(ProtoError::BadMagic {
            expected: HEAD_MAGIC,
            got: magic,
        });
    }
    let cmd_id = buf.get_u16();
    let head_len = buf.get_u16() as usize;
    let payload_len = buf.get_u32() as usize;

    ensure_remaining(&*buf, head_len + payload_len + 2)?;
    let head = buf.copy_to_bytes(head_len);
    let payload = buf.copy_to_bytes(payload_len);

    let tail = buf.get_u16();
    if tail != TAIL_MAGIC {
        return Err(ProtoError::BadMagic {
            expected: TAIL_MAGIC,
            got: tail,
        });
    }

    Ok(GamePacket {
        cmd_id,
        head,
        payload,
    })
}
