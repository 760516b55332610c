//! Block format
//!
//! Wire Format:
//! ```text
//! +---------+----------------------------+
//! | Hdr(1B) | Body                       |
//! +---------+----------------------------+
//! ```
//!
//! Header: bit 7 set for a literal, bits 6..0 hold `run length - 1`.
//!
//! - Literal: `run length` raw bytes follow the header
//! - Match: the base offset follows as a varint; the length is in the header
//!
//! Blocks are concatenated without separators.
//!
//! # Example
//! ```
//! use bytes::Bytes;
//! use deltapack::diff::{Block, BlockCodec, apply_blocks};
//!
//! let base = br#"{"name":"Bob"}"#;
//! let blocks = vec![
//!     Block::Match { offset: 0, length: 9 },
//!     Block::Literal(Bytes::from_static(b"Robert")),
//!     Block::Match { offset: 12, length: 2 },
//! ];
//!
//! let encoded = BlockCodec::encode_blocks(&blocks).unwrap();
//! let decoded = BlockCodec::decode_blocks(&encoded).unwrap();
//! let result = apply_blocks(base, &decoded).unwrap();
//! assert_eq!(result.as_ref(), br#"{"name":"Robert"}"#);
//! ```

use super::DiffError;
use crate::protocol::varint;
use crate::protocol::wire::BlockKind;
use bytes::{BufMut, Bytes, BytesMut};

/// One unit of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Bytes copied verbatim into the output
    Literal(Bytes),
    /// Bytes copied from the base
    Match {
        /// Start of the run in the base
        offset: usize,
        /// Number of bytes to copy
        length: usize,
    },
}

impl Block {
    /// Number of output bytes the block produces
    pub fn data_len(&self) -> usize {
        match self {
            Self::Literal(data) => data.len(),
            Self::Match { length, .. } => *length,
        }
    }

    /// Number of bytes the block occupies once encoded
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Literal(data) => 1 + data.len(),
            Self::Match { offset, .. } => 1 + varint::encoded_len(*offset as u64),
        }
    }

    /// Header kind of the block
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Literal(_) => BlockKind::Literal,
            Self::Match { .. } => BlockKind::Match,
        }
    }
}

/// Block list encoder/decoder
pub struct BlockCodec;

impl BlockCodec {
    /// Append one encoded block to `buf`
    ///
    /// # Returns
    /// Number of bytes written, always equal to [`Block::encoded_len`]
    ///
    /// # Errors
    /// Returns [`DiffError::InvalidBlockLength`] if the run length is outside
    /// `1..=128`. Nothing is written in that case.
    pub fn write_block(block: &Block, buf: &mut BytesMut) -> Result<usize, DiffError> {
        let run_len = block.data_len();
        let header = block
            .kind()
            .header_byte(run_len)
            .ok_or(DiffError::InvalidBlockLength { length: run_len })?;

        buf.put_u8(header);
        match block {
            Block::Literal(data) => {
                buf.put_slice(data);
                Ok(1 + data.len())
            }
            Block::Match { offset, .. } => Ok(1 + varint::write(*offset as u64, buf)),
        }
    }

    /// Decode the block at the start of `input`
    ///
    /// Literal data is returned as a slice of `input`, not a copy.
    ///
    /// # Returns
    /// The block and the number of bytes it occupied
    ///
    /// # Errors
    /// Returns [`DiffError::InvalidFormat`] if `input` ends mid-block, or
    /// [`DiffError::Wire`] if a match offset is not a valid varint
    pub fn read_block(input: &Bytes) -> Result<(Block, usize), DiffError> {
        let Some(&header) = input.first() else {
            return Err(DiffError::InvalidFormat(
                "Missing block header".to_string(),
            ));
        };
        let (kind, run_len) = BlockKind::from_header_byte(header);

        match kind {
            BlockKind::Literal => {
                let end = 1 + run_len;
                if input.len() < end {
                    return Err(DiffError::InvalidFormat(format!(
                        "Literal block needs {} bytes, {} remain",
                        run_len,
                        input.len() - 1
                    )));
                }
                Ok((Block::Literal(input.slice(1..end)), end))
            }
            BlockKind::Match => {
                let (offset, read) = varint::read(&input[1..])?;
                let offset = usize::try_from(offset).map_err(|_| {
                    DiffError::InvalidFormat(format!("Match offset {} out of range", offset))
                })?;
                Ok((
                    Block::Match {
                        offset,
                        length: run_len,
                    },
                    1 + read,
                ))
            }
        }
    }

    /// Encode a block list
    ///
    /// # Errors
    /// Returns [`DiffError::InvalidBlockLength`] for the first block whose run
    /// length is outside `1..=128`
    pub fn encode_blocks(blocks: &[Block]) -> Result<Bytes, DiffError> {
        let size = blocks.iter().map(Block::encoded_len).sum();
        let mut buf = BytesMut::with_capacity(size);

        for block in blocks {
            Self::write_block(block, &mut buf)?;
        }

        Ok(buf.freeze())
    }

    /// Decode a block list spanning all of `payload`
    ///
    /// # Errors
    /// Returns [`DiffError::InvalidFormat`] if the payload ends mid-block
    pub fn decode_blocks(payload: &Bytes) -> Result<Vec<Block>, DiffError> {
        let mut blocks = Vec::new();
        let mut cursor = payload.clone();

        while !cursor.is_empty() {
            let (block, read) = Self::read_block(&cursor)?;
            blocks.push(block);
            let _ = cursor.split_to(read);
        }

        Ok(blocks)
    }
}
