//! Diff and patch over block lists

use super::{Block, DiffError, Matcher};
use crate::protocol::MAX_BLOCK_LEN;
use bytes::{BufMut, Bytes, BytesMut};

/// Calculate the blocks that rebuild `modified` from `base`
///
/// Greedy single pass: at each position the longest match into `base` is
/// taken; bytes with no match accumulate into literal runs of at most 128.
///
/// # Arguments
/// * `base` - Packet the receiver already holds
/// * `modified` - Packet to describe; literal blocks are slices of it
/// * `matcher` - Longest-match strategy
///
/// # Returns
/// Ordered blocks whose data lengths sum to `modified.len()`
pub fn calculate_blocks<M>(base: &[u8], modified: &Bytes, matcher: &M) -> Vec<Block>
where
    M: Matcher + ?Sized,
{
    let mut blocks = Vec::new();
    // Start of the pending literal run, if any
    let mut literal_start: Option<usize> = None;
    let mut position = 0;

    while position < modified.len() {
        match matcher.find_longest_match(base, &modified[position..]) {
            Some(found) => {
                if let Some(start) = literal_start.take() {
                    blocks.push(Block::Literal(modified.slice(start..position)));
                }
                blocks.push(Block::Match {
                    offset: found.offset,
                    length: found.length,
                });
                position += found.length;
            }
            None => {
                let start = *literal_start.get_or_insert(position);
                position += 1;

                if position - start == MAX_BLOCK_LEN {
                    blocks.push(Block::Literal(modified.slice(start..position)));
                    literal_start = None;
                }
            }
        }
    }

    if let Some(start) = literal_start {
        blocks.push(Block::Literal(modified.slice(start..position)));
    }

    debug_assert_eq!(
        blocks.iter().map(Block::data_len).sum::<usize>(),
        modified.len(),
        "block list does not cover the modified packet"
    );

    blocks
}

/// Replay `blocks` against `base`
///
/// # Errors
/// Returns [`DiffError::InvalidOffset`] if a match block reaches outside
/// `base`, which happens when blocks are applied to the wrong base
pub fn apply_blocks(base: &[u8], blocks: &[Block]) -> Result<Bytes, DiffError> {
    let size = blocks.iter().map(Block::data_len).sum();
    let mut result = BytesMut::with_capacity(size);

    for block in blocks {
        match block {
            Block::Literal(data) => result.put_slice(data),
            Block::Match { offset, length } => {
                let range = offset
                    .checked_add(*length)
                    .filter(|end| *end <= base.len())
                    .map(|end| *offset..end)
                    .ok_or(DiffError::InvalidOffset {
                        offset: *offset,
                        length: *length,
                        base_len: base.len(),
                    })?;
                result.put_slice(&base[range]);
            }
        }
    }

    Ok(result.freeze())
}
