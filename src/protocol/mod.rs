//! Frame layout and wire-level codecs
//!
//! ```text
//! +--------+------------------------------------------+
//! | Hdr(1B)| Payload                                  |
//! +--------+------------------------------------------+
//! ```
//!
//! The payload is the raw packet when the header's source is
//! [`Source::Literal`], otherwise a concatenated block list.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

pub mod header;
pub mod varint;
pub mod wire;

pub use header::{PacketHeader, Source, Target};
pub use wire::{BlockKind, MAX_BLOCK_LEN};

/// Number of base slots addressable by a 4-bit header field
pub const NUM_BASE_SLOTS: usize = 14;

/// Highest explicit slot index a header may carry
pub const MAX_SLOT_INDEX: usize = NUM_BASE_SLOTS - 1;

/// Errors raised by the wire-level codecs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Varint could not be decoded
    #[error("Invalid varint: {reason}")]
    InvalidVarint {
        /// What was wrong with the encoding
        reason: String,
    },

    /// Header field names a slot that does not exist
    #[error("Invalid header field `{field}`: slot {value} (max: {max})", max = MAX_SLOT_INDEX)]
    InvalidHeaderField {
        /// Field name, `from` or `to`
        field: &'static str,
        /// Offending slot index
        value: usize,
    },

    /// Frame has no header byte
    #[error("Frame is empty")]
    EmptyFrame,
}

/// One compressed unit: header byte plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: PacketHeader,
    payload: Bytes,
}

impl Frame {
    /// Create a frame carrying `packet` verbatim
    pub fn literal(to: Target, packet: Bytes) -> Self {
        Self {
            header: PacketHeader::new(Source::Literal, to),
            payload: packet,
        }
    }

    /// Create a frame carrying an encoded block list against slot `from`
    pub fn delta(from: usize, to: Target, blocks: Bytes) -> Self {
        Self {
            header: PacketHeader::new(Source::Slot(from), to),
            payload: blocks,
        }
    }

    /// Split raw frame bytes into header and payload without copying
    ///
    /// # Errors
    /// Returns [`WireError::EmptyFrame`] if there is no header byte, or
    /// [`WireError::InvalidHeaderField`] if the header is malformed
    pub fn parse(mut frame: Bytes) -> Result<Self, WireError> {
        if frame.is_empty() {
            return Err(WireError::EmptyFrame);
        }
        let header_byte = frame.split_to(1)[0];
        Ok(Self {
            header: PacketHeader::from_byte(header_byte)?,
            payload: frame,
        })
    }

    /// Serialize the frame
    ///
    /// # Errors
    /// Returns [`WireError::InvalidHeaderField`] if the header names a slot
    /// outside the table
    pub fn to_bytes(&self) -> Result<Bytes, WireError> {
        let header_byte = self.header.to_byte()?;
        let mut buf = BytesMut::with_capacity(self.len());
        buf.put_u8(header_byte);
        buf.put_slice(&self.payload);
        Ok(buf.freeze())
    }

    /// Frame header
    pub fn header(&self) -> PacketHeader {
        self.header
    }

    /// Frame payload (raw packet or block list)
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Total encoded size, header included
    pub fn len(&self) -> usize {
        1 + self.payload.len()
    }

    /// Frames always carry a header byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if the payload is the raw packet
    pub fn is_literal(&self) -> bool {
        self.header.is_literal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_frame_layout() {
        let frame = Frame::literal(Target::Slot(2), Bytes::from_static(b"abc"));
        let encoded = frame.to_bytes().unwrap();

        assert_eq!(encoded.as_ref(), &[0xF2, b'a', b'b', b'c']);
        assert_eq!(frame.len(), encoded.len());
        assert!(frame.is_literal());
    }

    #[test]
    fn test_delta_frame_round_trip() {
        let frame = Frame::delta(5, Target::Skip, Bytes::from_static(&[0x00, 0x07]));
        let encoded = frame.to_bytes().unwrap();
        assert_eq!(encoded[0], 0x5F);

        let parsed = Frame::parse(encoded).unwrap();
        assert_eq!(parsed, frame);
        assert!(!parsed.is_literal());
        assert_eq!(parsed.payload().as_ref(), &[0x00, 0x07]);
    }

    #[test]
    fn test_header_only_frame() {
        let parsed = Frame::parse(Bytes::from_static(&[0x00])).unwrap();
        assert_eq!(
            parsed.header(),
            PacketHeader::new(Source::Slot(0), Target::Slot(0))
        );
        assert!(parsed.payload().is_empty());
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_parse_empty_frame() {
        let err = Frame::parse(Bytes::new()).unwrap_err();
        assert_eq!(err, WireError::EmptyFrame);
    }

    #[test]
    fn test_to_bytes_rejects_invalid_slot() {
        let frame = Frame::delta(NUM_BASE_SLOTS, Target::Skip, Bytes::new());
        let err = frame.to_bytes().unwrap_err();
        assert!(err.to_string().contains("slot 14"));
    }

    #[test]
    fn test_slot_constants() {
        assert_eq!(NUM_BASE_SLOTS, 14);
        assert_eq!(MAX_SLOT_INDEX, 13);
        assert_eq!(header::SENTINEL_NIBBLE as usize, NUM_BASE_SLOTS + 1);
    }
}
