//! Protocol encoding/decoding traits.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

/// Fail with [`ProtoError::BufferTooShort`] unless `needed` bytes remain.
pub fn ensure_remaining(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        return Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn ensure_remaining_ok() {
        let buf = Bytes::from_static(&[1, 2, 3]);
        assert!(ensure_remaining(&buf, 3).is_ok());
        assert!(ensure_remaining(&buf, 0).is_ok());
    }

    #[test]
    fn ensure_remaining_reports_sizes() {
        let buf = Bytes::from_static(&[1]);
        match ensure_remaining(&buf, 4) {
            Err(ProtoError::BufferTooShort { needed, remaining }) => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
