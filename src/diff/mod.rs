//! Diff algorithm

use crate::protocol::WireError;
use bytes::Bytes;
use thiserror::Error;

pub mod block;
pub mod engine;
pub mod matcher;
pub mod patch;

pub use block::{Block, BlockCodec};
pub use engine::BlockDiffEngine;
pub use matcher::{ExhaustiveMatcher, MinLengthMatcher};
pub use patch::{apply_blocks, calculate_blocks};

/// Errors that can occur during diff operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// Block run length outside `1..=128`
    #[error("Invalid block length: {length} (expected 1..=128)")]
    InvalidBlockLength {
        /// Offending run length
        length: usize,
    },

    /// Match block reaches past the end of the base
    #[error("Invalid match offset: {offset}+{length} exceeds base length {base_len}")]
    InvalidOffset {
        /// Match offset into the base
        offset: usize,
        /// Match length
        length: usize,
        /// Length of the base the match was applied to
        base_len: usize,
    },

    /// Block stream is truncated or malformed
    #[error("Invalid diff format: {0}")]
    InvalidFormat(String),

    /// Wire-level codec failure
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Location of a run of query bytes inside the base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Start of the run in the base
    pub offset: usize,
    /// Number of matching bytes
    pub length: usize,
}

/// Strategy for locating the longest prefix of a query inside a base
pub trait Matcher: Send + Sync {
    /// Find the longest prefix of `query` that occurs in `base`
    ///
    /// # Arguments
    /// * `base` - Buffer to search in
    /// * `query` - Bytes whose prefix should be located
    ///
    /// # Returns
    /// The match, at most [`MAX_BLOCK_LEN`](crate::protocol::MAX_BLOCK_LEN)
    /// bytes long, or `None` if `query[0]` does not occur in `base`. Among
    /// equally long matches the smallest offset wins.
    fn find_longest_match(&self, base: &[u8], query: &[u8]) -> Option<Match>;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn find_longest_match(&self, base: &[u8], query: &[u8]) -> Option<Match> {
        (**self).find_longest_match(base, query)
    }
}

/// Trait for diff engines that can compute and apply binary diffs
pub trait DiffEngine: Send + Sync {
    /// Compute binary diff between a base and a modified packet
    ///
    /// # Arguments
    /// * `base` - Base packet the receiver already holds
    /// * `modified` - Packet to transmit
    ///
    /// # Returns
    /// Encoded diff that [`apply_diff`](Self::apply_diff) turns back into `modified`
    ///
    /// # Errors
    /// Returns [`DiffError`] if diff computation fails
    fn compute_diff(&self, base: &[u8], modified: &Bytes) -> Result<Bytes, DiffError>;

    /// Apply binary diff to base content
    ///
    /// # Arguments
    /// * `base` - Base content to apply diff to
    /// * `diff` - Encoded diff
    ///
    /// # Errors
    /// Returns [`DiffError`] if the diff is malformed or does not fit `base`
    fn apply_diff(&self, base: &[u8], diff: &Bytes) -> Result<Bytes, DiffError>;

    /// Check if sending the diff beats sending the packet itself
    ///
    /// # Returns
    /// `true` unless the diff is larger than the original
    fn is_diff_worthwhile(&self, original_size: usize, diff_size: usize) -> bool {
        diff_size <= original_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullEngine;

    impl DiffEngine for NullEngine {
        fn compute_diff(&self, _base: &[u8], modified: &Bytes) -> Result<Bytes, DiffError> {
            Ok(modified.clone())
        }

        fn apply_diff(&self, _base: &[u8], diff: &Bytes) -> Result<Bytes, DiffError> {
            Ok(diff.clone())
        }
    }

    #[test]
    fn test_default_diff_worthwhile() {
        let engine = NullEngine;

        assert!(engine.is_diff_worthwhile(100, 20));
        assert!(engine.is_diff_worthwhile(100, 100));
        assert!(!engine.is_diff_worthwhile(100, 101));
        assert!(engine.is_diff_worthwhile(0, 0));
    }

    #[test]
    fn test_error_messages() {
        let err = DiffError::InvalidBlockLength { length: 129 };
        assert!(err.to_string().contains("129"));

        let err = DiffError::InvalidOffset {
            offset: 10,
            length: 5,
            base_len: 12,
        };
        assert!(err.to_string().contains("exceeds base length 12"));

        let err: DiffError = WireError::EmptyFrame.into();
        assert_eq!(err.to_string(), "Frame is empty");
    }
}
