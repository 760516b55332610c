//! # deltapack
//!
//! Delta compression for streams of structurally similar packets, such as
//! periodic game-state snapshots. Each packet is diffed against one of several
//! recently seen base packets and only the differences are sent; the receiver
//! replays them against its own copy of the same base.
//!
//! ## Core Components
//!
//! - [`Compressor`] - Picks the best base, frames the diff, rotates bases
//! - [`Decompressor`] - Mirrors the compressor's base table and rebuilds packets
//! - [`DiffEngine`] - Binary diff computation and application
//! - [`DeltaConfig`] - Configuration options
//!
//! ## Example Usage
//!
//! ```rust
//! use deltapack::{Compressor, Decompressor};
//!
//! # fn main() -> Result<(), deltapack::DeltaError> {
//! let mut compressor = Compressor::new();
//! let mut decompressor = Decompressor::new();
//!
//! for packet in [&br#"{"x":1,"y":2}"#[..], &br#"{"x":1,"y":3}"#[..]] {
//!     let frame = compressor.compress(packet)?;
//!     let decoded = decompressor.decompress(frame)?;
//!     assert_eq!(decoded.as_ref(), packet);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Frames must reach the decompressor in the order the compressor produced
//! them; a lost or reordered frame desynchronizes the two base tables until
//! both sides are [reset](Compressor::reset).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod compressor;
pub mod decompressor;
pub mod diff;
pub mod protocol;
pub mod state;

pub use compressor::{CompressionStats, Compressor, CompressorBuilder};
pub use decompressor::Decompressor;
pub use diff::{DiffEngine, DiffError, Matcher};
pub use protocol::{Frame, PacketHeader, WireError};
pub use state::BaseTable;

/// Configuration for a compression session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaConfig {
    /// Compression ratio below which a diffed packet is promoted to a new base
    pub promotion_ratio: f32,
    /// Shortest base match worth referencing (1 keeps every match)
    pub min_match_length: usize,
}

impl DeltaConfig {
    /// Check that every option is within range
    ///
    /// # Errors
    /// Returns [`DeltaError::InvalidConfig`] for a negative or non-finite
    /// ratio, or a minimum match length outside `1..=128`
    pub fn validate(&self) -> Result<(), DeltaError> {
        if !self.promotion_ratio.is_finite() || self.promotion_ratio < 0.0 {
            return Err(DeltaError::InvalidConfig {
                reason: format!(
                    "promotion_ratio must be finite and non-negative, got {}",
                    self.promotion_ratio
                ),
            });
        }
        if !(1..=protocol::MAX_BLOCK_LEN).contains(&self.min_match_length) {
            return Err(DeltaError::InvalidConfig {
                reason: format!(
                    "min_match_length must be in 1..={}, got {}",
                    protocol::MAX_BLOCK_LEN,
                    self.min_match_length
                ),
            });
        }
        Ok(())
    }
}

impl Default for DeltaConfig {
    fn default() -> Self {
        Self {
            promotion_ratio: 1.5,
            min_match_length: 1,
        }
    }
}

/// Main deltapack errors
#[derive(Debug, Error)]
pub enum DeltaError {
    /// Diff computation or block encoding failed
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// Header or varint encoding failed
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Received frame could not be decoded
    #[error("Invalid frame: {reason}")]
    InvalidFrame {
        /// Failure reason
        reason: String,
    },

    /// Configuration rejected
    #[error("Invalid config: {reason}")]
    InvalidConfig {
        /// Failure reason
        reason: String,
    },
}
