//! Binary layout of the chunk store.
//!
//! ```text
//! [MAGIC "RQCS"] [VERSION u8] [BYTE ORDER u8] [RESERVED 2 bytes]
//! [chunk] [pad] [chunk] [pad] ...
//! ```
//!
//! Every chunk starts on an 8-byte boundary and holds contiguous 8-byte
//! scalars in the byte order named by the header. Chunks carry no framing;
//! their offsets, lengths and checksums live in the metadata document.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use resq_core::{ArrayBuffer, Dtype};

use crate::error::StoreError;

/// Magic bytes at the start of every chunk store.
pub const MAGIC: [u8; 4] = *b"RQCS";

/// Current chunk store format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the fixed header.
pub const HEADER_LEN: u64 = 8;

/// Alignment of every chunk offset.
pub const ALIGNMENT: u64 = 8;

/// Byte order of stored scalars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// The order of the running target; writers always emit this.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// The order of the running target; writers always emit this.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Header tag byte.
    pub fn tag(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }

    /// Decode a header tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    /// Name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Little => "little",
            Self::Big => "big",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "little" => Ok(Self::Little),
            "big" => Ok(Self::Big),
            other => Err(format!("unknown byte order '{other}'")),
        }
    }
}

// ── Header encode/decode ────────────────────────────────────────

/// Write the fixed header.
pub fn encode_header(w: &mut dyn Write, order: ByteOrder) -> io::Result<()> {
    w.write_all(&MAGIC)?;
    w.write_all(&[FORMAT_VERSION, order.tag(), 0, 0])
}

/// Parse the fixed header, returning the byte order of the chunks.
pub fn decode_header(bytes: &[u8]) -> Result<ByteOrder, StoreError> {
    if bytes.len() < HEADER_LEN as usize {
        return Err(StoreError::corrupt(format!(
            "chunk store is {} bytes, shorter than its header",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(StoreError::corrupt("invalid magic bytes (expected b\"RQCS\")"));
    }
    let version = bytes[4];
    if version > FORMAT_VERSION {
        return Err(StoreError::SchemaVersion {
            found: u32::from(version),
            supported: u32::from(FORMAT_VERSION),
        });
    }
    ByteOrder::from_tag(bytes[5])
        .ok_or_else(|| StoreError::corrupt(format!("unknown byte order tag {}", bytes[5])))
}

// ── Scalar payloads ─────────────────────────────────────────────

/// Zero bytes needed after `offset` to reach the next chunk boundary.
pub fn padding(offset: u64) -> u64 {
    (ALIGNMENT - offset % ALIGNMENT) % ALIGNMENT
}

/// Serialise a scalar payload in `order`.
pub fn encode_scalars(buf: &ArrayBuffer, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() * 8);
    match (buf, order) {
        (ArrayBuffer::F64(v), ByteOrder::Little) => v.iter().for_each(|x| out.extend(x.to_le_bytes())),
        (ArrayBuffer::F64(v), ByteOrder::Big) => v.iter().for_each(|x| out.extend(x.to_be_bytes())),
        (ArrayBuffer::I64(v), ByteOrder::Little) => v.iter().for_each(|x| out.extend(x.to_le_bytes())),
        (ArrayBuffer::I64(v), ByteOrder::Big) => v.iter().for_each(|x| out.extend(x.to_be_bytes())),
    }
    out
}

/// Decode `bytes` as scalars of `dtype` in `order`. `None` when the byte
/// count is not a whole number of scalars.
pub fn decode_scalars(bytes: &[u8], dtype: Dtype, order: ByteOrder) -> Option<ArrayBuffer> {
    if bytes.len() % dtype.size() != 0 {
        return None;
    }
    let words = bytes.chunks_exact(8).map(|c| {
        let mut word = [0u8; 8];
        word.copy_from_slice(c);
        word
    });
    Some(match (dtype, order) {
        (Dtype::F64, ByteOrder::Little) => ArrayBuffer::F64(words.map(f64::from_le_bytes).collect()),
        (Dtype::F64, ByteOrder::Big) => ArrayBuffer::F64(words.map(f64::from_be_bytes).collect()),
        (Dtype::I64, ByteOrder::Little) => ArrayBuffer::I64(words.map(i64::from_le_bytes).collect()),
        (Dtype::I64, ByteOrder::Big) => ArrayBuffer::I64(words.map(i64::from_be_bytes).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let mut buf = Vec::new();
        encode_header(&mut buf, ByteOrder::Big).unwrap();
        assert_eq!(buf, b"RQCS\x01\x01\x00\x00");
        assert_eq!(decode_header(&buf).unwrap(), ByteOrder::Big);
    }

    #[test]
    fn bad_magic_rejected() {
        let err = decode_header(b"XQCS\x01\x00\x00\x00").unwrap_err();
        assert!(matches!(err, StoreError::CorruptContainer { .. }));
    }

    #[test]
    fn short_header_rejected() {
        assert!(matches!(
            decode_header(b"RQCS"),
            Err(StoreError::CorruptContainer { .. })
        ));
    }

    #[test]
    fn newer_version_rejected() {
        assert!(matches!(
            decode_header(b"RQCS\x09\x00\x00\x00"),
            Err(StoreError::SchemaVersion { found: 9, supported: 1 })
        ));
    }

    #[test]
    fn unknown_order_tag_rejected() {
        assert!(matches!(
            decode_header(b"RQCS\x01\x07\x00\x00"),
            Err(StoreError::CorruptContainer { .. })
        ));
    }

    #[test]
    fn padding_reaches_boundary() {
        assert_eq!(padding(8), 0);
        assert_eq!(padding(9), 7);
        assert_eq!(padding(15), 1);
    }

    #[test]
    fn foreign_order_is_converted() {
        let buf = ArrayBuffer::I64(vec![1, -2, i64::MAX]);
        let big = encode_scalars(&buf, ByteOrder::Big);
        assert_eq!(&big[..8], &[0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(decode_scalars(&big, Dtype::I64, ByteOrder::Big), Some(buf.clone()));
        assert_ne!(decode_scalars(&big, Dtype::I64, ByteOrder::Little), Some(buf));
    }

    #[test]
    fn nan_payload_survives() {
        let nan = f64::from_bits(0x7ff8_0000_dead_beef);
        let bytes = encode_scalars(&ArrayBuffer::F64(vec![nan]), ByteOrder::Little);
        match decode_scalars(&bytes, Dtype::F64, ByteOrder::Little) {
            Some(ArrayBuffer::F64(v)) => assert_eq!(v[0].to_bits(), nan.to_bits()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ragged_payload_rejected() {
        assert_eq!(decode_scalars(&[0u8; 12], Dtype::F64, ByteOrder::Little), None);
    }
}
