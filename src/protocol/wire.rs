//! Block header wire format definitions
//!
//! ```text
//!  bit 7       bits 6..0
//! +-----------+----------------+
//! | literal?  | run length - 1 |
//! +-----------+----------------+
//! ```

/// Largest run a single block can describe
pub const MAX_BLOCK_LEN: usize = 128;

/// Flag marking a literal block
pub const LITERAL_FLAG: u8 = 0b1000_0000;

/// Mask over the stored `run length - 1`
pub const RUN_MASK: u8 = 0b0111_1111;

/// Block kinds distinguished by the header's top bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Raw bytes follow the header
    Literal,
    /// A varint base offset follows the header
    Match,
}

impl BlockKind {
    /// Build a header byte for a run of `run_len` bytes
    ///
    /// Returns `None` if `run_len` is outside `1..=MAX_BLOCK_LEN`
    pub fn header_byte(self, run_len: usize) -> Option<u8> {
        if run_len == 0 || run_len > MAX_BLOCK_LEN {
            return None;
        }
        let run = (run_len - 1) as u8;
        Some(match self {
            Self::Literal => LITERAL_FLAG | run,
            Self::Match => run,
        })
    }

    /// Split a header byte into its kind and run length
    pub fn from_header_byte(byte: u8) -> (Self, usize) {
        let kind = if byte & LITERAL_FLAG != 0 {
            Self::Literal
        } else {
            Self::Match
        };
        (kind, (byte & RUN_MASK) as usize + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_byte_values() {
        assert_eq!(BlockKind::Literal.header_byte(1), Some(0b1000_0000));
        assert_eq!(BlockKind::Literal.header_byte(2), Some(0b1000_0001));
        assert_eq!(BlockKind::Literal.header_byte(128), Some(0b1111_1111));
        assert_eq!(BlockKind::Match.header_byte(1), Some(0b0000_0000));
        assert_eq!(BlockKind::Match.header_byte(128), Some(0b0111_1111));
    }

    #[test]
    fn test_header_byte_rejects_bad_lengths() {
        for kind in [BlockKind::Literal, BlockKind::Match] {
            assert_eq!(kind.header_byte(0), None);
            assert_eq!(kind.header_byte(MAX_BLOCK_LEN + 1), None);
        }
    }

    #[test]
    fn test_every_header_byte_decodes() {
        // All 256 header bytes are meaningful
        for byte in 0..=u8::MAX {
            let (kind, run_len) = BlockKind::from_header_byte(byte);
            assert!((1..=MAX_BLOCK_LEN).contains(&run_len));
            assert_eq!(kind.header_byte(run_len), Some(byte));
        }
    }
}
