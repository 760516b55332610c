//! Packet header codec
//!
//! One byte per frame. The high nibble names the base slot the payload was
//! diffed against, the low nibble names the slot the decoded packet is stored
//! into. The all-ones nibble is the sentinel in both positions.

use super::{MAX_SLOT_INDEX, WireError};

/// Nibble value reserved for `Source::Literal` and `Target::Skip`
pub const SENTINEL_NIBBLE: u8 = 0x0F;

/// Where a frame's payload comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Payload is the raw packet
    Literal,
    /// Payload is a block list against this base slot
    Slot(usize),
}

/// Which base slot the decoded packet overwrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Leave the base table untouched
    Skip,
    /// Store the decoded packet into this slot
    Slot(usize),
}

/// Decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Base the payload is relative to
    pub from: Source,
    /// Slot updated after decoding
    pub to: Target,
}

impl PacketHeader {
    /// Create a header
    pub fn new(from: Source, to: Target) -> Self {
        Self { from, to }
    }

    /// Pack the header into its wire byte
    ///
    /// # Errors
    /// Returns [`WireError::InvalidHeaderField`] if an explicit slot index is
    /// greater than [`MAX_SLOT_INDEX`]
    pub fn to_byte(&self) -> Result<u8, WireError> {
        let from = match self.from {
            Source::Literal => SENTINEL_NIBBLE,
            Source::Slot(index) => slot_nibble("from", index)?,
        };
        let to = match self.to {
            Target::Skip => SENTINEL_NIBBLE,
            Target::Slot(index) => slot_nibble("to", index)?,
        };
        Ok((from << 4) | to)
    }

    /// Unpack a header from its wire byte
    ///
    /// # Errors
    /// Returns [`WireError::InvalidHeaderField`] if a nibble names a slot that
    /// does not exist (the single unused code, 14)
    pub fn from_byte(byte: u8) -> Result<Self, WireError> {
        let from = match byte >> 4 {
            SENTINEL_NIBBLE => Source::Literal,
            nibble => Source::Slot(nibble_slot("from", nibble)?),
        };
        let to = match byte & SENTINEL_NIBBLE {
            SENTINEL_NIBBLE => Target::Skip,
            nibble => Target::Slot(nibble_slot("to", nibble)?),
        };
        Ok(Self { from, to })
    }

    /// Check if the frame carries the packet verbatim
    pub fn is_literal(&self) -> bool {
        matches!(self.from, Source::Literal)
    }
}

fn slot_nibble(field: &'static str, index: usize) -> Result<u8, WireError> {
    if index > MAX_SLOT_INDEX {
        return Err(WireError::InvalidHeaderField { field, value: index });
    }
    Ok(index as u8)
}

fn nibble_slot(field: &'static str, nibble: u8) -> Result<usize, WireError> {
    let index = nibble as usize;
    if index > MAX_SLOT_INDEX {
        return Err(WireError::InvalidHeaderField { field, value: index });
    }
    Ok(index)
}
