//! Longest-match strategies

use super::{Match, Matcher};
use crate::protocol::MAX_BLOCK_LEN;

/// Matcher that tries every offset of the base
///
/// Cost is `O(len(base) * min(len(query), 128))` per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveMatcher;

impl ExhaustiveMatcher {
    /// Create new matcher
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for ExhaustiveMatcher {
    fn find_longest_match(&self, base: &[u8], query: &[u8]) -> Option<Match> {
        let limit = query.len().min(MAX_BLOCK_LEN);
        let first = *query.first()?;
        let mut best: Option<Match> = None;

        for (offset, &byte) in base.iter().enumerate() {
            if byte != first {
                continue;
            }

            let window = &base[offset..];
            let cap = window.len().min(limit);
            let length = window[..cap]
                .iter()
                .zip(&query[..cap])
                .take_while(|(a, b)| a == b)
                .count();

            // Strictly longer only: earlier offsets win ties
            if best.is_none_or(|m| length > m.length) {
                best = Some(Match { offset, length });
                if length == limit {
                    break;
                }
            }
        }

        best
    }
}

/// Matcher that drops matches shorter than a threshold
///
/// A rejected match is reported as no match at all, so the diff engine folds
/// those bytes into the surrounding literal run.
#[derive(Debug, Clone)]
pub struct MinLengthMatcher<M> {
    inner: M,
    min_length: usize,
}

impl<M: Matcher> MinLengthMatcher<M> {
    /// Wrap `inner`, rejecting matches shorter than `min_length`
    pub fn new(inner: M, min_length: usize) -> Self {
        Self { inner, min_length }
    }

    /// Shortest match that is passed through
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl<M: Matcher> Matcher for MinLengthMatcher<M> {
    fn find_longest_match(&self, base: &[u8], query: &[u8]) -> Option<Match> {
        self.inner
            .find_longest_match(base, query)
            .filter(|m| m.length >= self.min_length)
    }
}
