//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::types::VarIntError),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("unknown wire type: {0}")]
    InvalidWireType(u8),

    #[error("field number 0 is reserved")]
    ReservedField,

    #[error("invalid {name} value: {value}")]
    InvalidEnum { name: &'static str, value: u32 },

    #[error("bad frame magic: expected 0x{expected:04X}, got 0x{got:04X}")]
    BadMagic { expected: u16, got: u16 },

    #[error("frame section too large: {0} bytes")]
    FrameTooLarge(usize),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
