//! Protobuf-compatible field codec.
//!
//! Every message is a flat sequence of `key | value` records where
//! `key = field_number << 3 | wire_type`. Scalar fields holding their
//! default value are omitted, matching proto3 encoders, and fields a
//! message does not know are skipped on decode.

use std::collections::BTreeMap;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::codec::{ensure_remaining, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{VarUInt32, VarUInt64};

/// Wire type carried in the low three bits of a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn from_u8(value: u8) -> Result<Self, ProtoError> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(ProtoError::InvalidWireType(other)),
        }
    }
}

/// A message made of numbered fields.
pub trait WireMessage: Default {
    /// Append every non-default field to `buf`.
    fn encode_fields(&self, buf: &mut impl BufMut);

    /// Consume the value of one field whose key has already been read.
    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError>;

    fn encode_to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_fields(&mut buf);
        buf.freeze()
    }

    /// Decode a message spanning the rest of `buf`.
    fn decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let mut msg = Self::default();
        while buf.has_remaining() {
            let (field, wire_type) = read_key(buf)?;
            msg.merge_field(field, wire_type, buf)?;
        }
        Ok(msg)
    }
}

/// A closed enumeration encoded as a varint.
pub trait WireEnum: Sized + Copy {
    const NAME: &'static str;

    fn from_u32(value: u32) -> Option<Self>;

    fn as_u32(self) -> u32;
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub fn write_key(buf: &mut impl BufMut, field: u32, wire_type: WireType) {
    VarUInt32(field << 3 | wire_type as u32).proto_encode(buf);
}

pub fn write_uint32(buf: &mut impl BufMut, field: u32, value: u32) {
    write_uint64(buf, field, value as u64);
}

pub fn write_uint64(buf: &mut impl BufMut, field: u32, value: u64) {
    if value == 0 {
        return;
    }
    write_key(buf, field, WireType::Varint);
    VarUInt64(value).proto_encode(buf);
}

pub fn write_bool(buf: &mut impl BufMut, field: u32, value: bool) {
    if value {
        write_key(buf, field, WireType::Varint);
        buf.put_u8(1);
    }
}

pub fn write_enum<E: WireEnum>(buf: &mut impl BufMut, field: u32, value: E) {
    write_uint32(buf, field, value.as_u32());
}

pub fn write_float(buf: &mut impl BufMut, field: u32, value: f32) {
    if value == 0.0 {
        return;
    }
    write_key(buf, field, WireType::Fixed32);
    buf.put_f32_le(value);
}

pub fn write_bytes(buf: &mut impl BufMut, field: u32, data: &[u8]) {
    write_key(buf, field, WireType::LengthDelimited);
    VarUInt32(data.len() as u32).proto_encode(buf);
    buf.put_slice(data);
}

/// Nested messages are always written, even when empty, so presence survives.
pub fn write_message<M: WireMessage>(buf: &mut impl BufMut, field: u32, msg: &M) {
    write_bytes(buf, field, &msg.encode_to_bytes());
}

pub fn write_packed_uint32(buf: &mut impl BufMut, field: u32, values: &[u32]) {
    if values.is_empty() {
        return;
    }
    let mut packed = BytesMut::new();
    for &value in values {
        VarUInt64(value as u64).proto_encode(&mut packed);
    }
    write_bytes(buf, field, &packed);
}

/// `map<uint32, uint32>`: one `{ key = 1; value = 2 }` entry per pair.
pub fn write_uint32_map(buf: &mut impl BufMut, field: u32, map: &BTreeMap<u32, u32>) {
    for (&key, &value) in map {
        write_message(buf, field, &MapEntry { key, value });
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

pub fn read_key(buf: &mut impl Buf) -> Result<(u32, WireType), ProtoError> {
    let key = VarUInt32::proto_decode(buf)?.0;
    let field = key >> 3;
    if field == 0 {
        return Err(ProtoError::ReservedField);
    }
    Ok((field, WireType::from_u8((key & 0x07) as u8)?))
}

fn expect_wire_type(actual: WireType, expected: WireType) -> Result<(), ProtoError> {
    if actual != expected {
        return Err(ProtoError::InvalidData(format!(
            "expected {expected:?} field, got {actual:?}"
        )));
    }
    Ok(())
}

pub fn read_uint64(buf: &mut impl Buf, wire_type: WireType) -> Result<u64, ProtoError> {
    expect_wire_type(wire_type, WireType::Varint)?;
    Ok(VarUInt64::proto_decode(buf)?.0)
}

/// Values above `u32::MAX` are truncated like other protobuf decoders do.
pub fn read_uint32(buf: &mut impl Buf, wire_type: WireType) -> Result<u32, ProtoError> {
    Ok(read_uint64(buf, wire_type)? as u32)
}

pub fn read_bool(buf: &mut impl Buf, wire_type: WireType) -> Result<bool, ProtoError> {
    Ok(read_uint64(buf, wire_type)? != 0)
}

pub fn read_enum<E: WireEnum>(buf: &mut impl Buf, wire_type: WireType) -> Result<E, ProtoError> {
    let value = read_uint32(buf, wire_type)?;
    E::from_u32(value).ok_or(ProtoError::InvalidEnum {
        name: E::NAME,
        value,
    })
}

pub fn read_float(buf: &mut impl Buf, wire_type: WireType) -> Result<f32, ProtoError> {
    expect_wire_type(wire_type, WireType::Fixed32)?;
    ensure_remaining(&*buf, 4)?;
    Ok(buf.get_f32_le())
}

pub fn read_bytes(buf: &mut impl Buf, wire_type: WireType) -> Result<Bytes, ProtoError> {
    expect_wire_type(wire_type, WireType::LengthDelimited)?;
    let len = VarUInt32::proto_decode(buf)?.0 as usize;
    ensure_remaining(&*buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

pub fn read_message<M: WireMessage>(buf: &mut impl Buf, wire_type: WireType) -> Result<M, ProtoError> {
    let mut data = read_bytes(buf, wire_type)?;
    M::decode(&mut data)
}

/// Accepts both packed and one-value-per-key encodings.
pub fn read_packed_uint32(
    buf: &mut impl Buf,
    wire_type: WireType,
    out: &mut Vec<u32>,
) -> Result<(), ProtoError> {
    if wire_type == WireType::Varint {
        out.push(read_uint32(buf, wire_type)?);
        return Ok(());
    }
    let mut data = read_bytes(buf, wire_type)?;
    while data.has_remaining() {
        out.push(VarUInt64::proto_decode(&mut data)?.0 as u32);
    }
    Ok(())
}

pub fn read_uint32_map_entry(
    buf: &mut impl Buf,
    wire_type: WireType,
    map: &mut BTreeMap<u32, u32>,
) -> Result<(), ProtoError> {
    let entry: MapEntry = read_message(buf, wire_type)?;
    map.insert(entry.key, entry.value);
    Ok(())
}

pub fn skip_field(buf: &mut impl Buf, wire_type: WireType) -> Result<(), ProtoError> {
    trace!("skipping unknown {:?} field", wire_type);
    match wire_type {
        WireType::Varint => {
            VarUInt64::proto_decode(buf)?;
        }
        WireType::Fixed64 => {
            ensure_remaining(&*buf, 8)?;
            buf.advance(8);
        }
        WireType::LengthDelimited => {
            read_bytes(buf, wire_type)?;
        }
        WireType::Fixed32 => {
            ensure_remaining(&*buf, 4)?;
            buf.advance(4);
        }
    }
    Ok(())
}

#[derive(Default)]
struct MapEntry {
    key: u32,
    value: u32,
}

impl WireMessage for MapEntry {
    fn encode_fields(&self, buf: &mut impl BufMut) {
        write_uint32(buf, 1, self.key);
        write_uint32(buf, 2, self.value);
    }

    fn merge_field(
        &mut self,
        field: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
    ) -> Result<(), ProtoError> {
        match field {
            1 => self.key = read_uint32(buf, wire_type)?,
            2 => self.value = read_uint32(buf, wire_type)?,
            _ => skip_field(buf, wire_type)?,
        }
        Ok(())
    }
}
