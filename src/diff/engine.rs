//! Diff engine built on block lists and a pluggable matcher

use super::{
    DiffEngine, DiffError, Matcher,
    block::BlockCodec,
    matcher::{ExhaustiveMatcher, MinLengthMatcher},
    patch::{apply_blocks, calculate_blocks},
};
use bytes::Bytes;

/// Diff engine producing the block wire format
pub struct BlockDiffEngine<M = ExhaustiveMatcher> {
    matcher: M,
}

impl BlockDiffEngine<ExhaustiveMatcher> {
    /// Create new diff engine with the exhaustive matcher
    pub fn new() -> Self {
        Self {
            matcher: ExhaustiveMatcher::new(),
        }
    }

    /// Create new diff engine that ignores matches shorter than `min_length`
    pub fn with_min_match_length(
        min_length: usize,
    ) -> BlockDiffEngine<MinLengthMatcher<ExhaustiveMatcher>> {
        BlockDiffEngine::with_matcher(MinLengthMatcher::new(ExhaustiveMatcher::new(), min_length))
    }
}

impl<M: Matcher> BlockDiffEngine<M> {
    /// Create new diff engine around a custom matcher
    pub fn with_matcher(matcher: M) -> Self {
        Self { matcher }
    }

    /// Matcher used for diffing
    pub fn matcher(&self) -> &M {
        &self.matcher
    }
}

impl Default for BlockDiffEngine<ExhaustiveMatcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Matcher> DiffEngine for BlockDiffEngine<M> {
    fn compute_diff(&self, base: &[u8], modified: &Bytes) -> Result<Bytes, DiffError> {
        let blocks = calculate_blocks(base, modified, &self.matcher);
        BlockCodec::encode_blocks(&blocks)
    }

    fn apply_diff(&self, base: &[u8], diff: &Bytes) -> Result<Bytes, DiffError> {
        let blocks = BlockCodec::decode_blocks(diff)?;
        apply_blocks(base, &blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_changes() {
        let engine = BlockDiffEngine::new();
        let data = Bytes::from_static(b"hello world");

        let diff = engine.compute_diff(&data, &data).unwrap();
        let result = engine.apply_diff(&data, &diff).unwrap();

        assert_eq!(result, data);
        // One match block: header + 1-byte offset
        assert_eq!(diff.as_ref(), &[10, 0]);
    }

    #[test]
    fn test_simple_change() {
        let engine = BlockDiffEngine::new();
        let old = b"hello world";
        let new = Bytes::from_static(b"hello universe");

        let diff = engine.compute_diff(old, &new).unwrap();
        let result = engine.apply_diff(old, &diff).unwrap();

        assert_eq!(result, new);
    }

    #[test]
    fn test_empty_base() {
        let engine = BlockDiffEngine::new();
        let new = Bytes::from_static(b"fresh");

        let diff = engine.compute_diff(b"", &new).unwrap();
        assert_eq!(diff.len(), 1 + new.len());
        assert_eq!(engine.apply_diff(b"", &diff).unwrap(), new);
    }

    #[test]
    fn test_apply_against_wrong_base() {
        let engine = BlockDiffEngine::new();
        let base = b"a much longer base packet";
        let new = Bytes::from_static(b"longer base packet");

        let diff = engine.compute_diff(base, &new).unwrap();
        let result = engine.apply_diff(b"tiny", &diff);
        assert!(matches!(result, Err(DiffError::InvalidOffset { .. })));
    }

    #[test]
    fn test_min_match_length_engine() {
        let engine = BlockDiffEngine::with_min_match_length(4);
        assert_eq!(engine.matcher().min_length(), 4);

        let base = b"a-b-c-d";
        let new = Bytes::from_static(b"xaybzc");
        let diff = engine.compute_diff(base, &new).unwrap();

        // Whole packet as a single literal block
        assert_eq!(diff.len(), 1 + new.len());
        assert_eq!(engine.apply_diff(base, &diff).unwrap(), new);
    }

    #[test]
    fn test_diff_worthwhile() {
        let engine = BlockDiffEngine::new();

        assert!(engine.is_diff_worthwhile(1000, 200));
        assert!(!engine.is_diff_worthwhile(10, 11));
    }
}
