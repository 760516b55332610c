//! Receiving side of a session

use crate::{
    DeltaError,
    diff::{BlockDiffEngine, DiffEngine},
    protocol::{Frame, Source, Target},
    state::BaseTable,
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decompressor for one inbound packet stream
///
/// Holds a copy of the peer compressor's base table. Frames must be fed in
/// the order they were produced.
pub struct Decompressor {
    engine: Arc<dyn DiffEngine>,
    bases: BaseTable,
}

impl Decompressor {
    /// Create a decompressor using the block diff engine
    pub fn new() -> Self {
        Self::with_engine(Arc::new(BlockDiffEngine::new()))
    }

    /// Create a decompressor using a custom diff engine
    ///
    /// Must match the engine of the compressor producing the frames.
    pub fn with_engine(engine: Arc<dyn DiffEngine>) -> Self {
        Self {
            engine,
            bases: BaseTable::new(),
        }
    }

    /// Rebuild the packet carried by `frame`
    ///
    /// # Arguments
    /// * `frame` - Frame bytes exactly as returned by
    ///   [`Compressor::compress`](crate::Compressor::compress)
    ///
    /// # Errors
    /// Returns [`DeltaError::InvalidFrame`] if the frame is empty, names an
    /// unknown slot, or carries a block list that does not fit its base. The
    /// base table is left untouched in that case.
    pub fn decompress(&mut self, frame: impl Into<Bytes>) -> Result<Bytes, DeltaError> {
        let frame = Frame::parse(frame.into()).map_err(|e| invalid_frame(e.to_string()))?;
        let header = frame.header();

        let packet = match header.from {
            Source::Literal => frame.payload().clone(),
            Source::Slot(slot) => {
                let base = self
                    .bases
                    .get(slot)
                    .ok_or_else(|| invalid_frame(format!("unknown base slot {slot}")))?;
                self.engine
                    .apply_diff(base, frame.payload())
                    .map_err(|e| invalid_frame(e.to_string()))?
            }
        };

        debug!(
            from = ?header.from,
            to = ?header.to,
            packet_len = packet.len(),
            "decompressed frame"
        );
        metrics::counter!("deltapack_frames_decoded_total").increment(1);

        if let Target::Slot(slot) = header.to {
            self.bases.store(slot, packet.clone());
        }

        Ok(packet)
    }

    /// Current base packets
    pub fn bases(&self) -> &BaseTable {
        &self.bases
    }

    /// Get diff engine reference
    pub fn diff_engine(&self) -> &Arc<dyn DiffEngine> {
        &self.engine
    }

    /// Drop all bases
    pub fn reset(&mut self) {
        self.bases.clear();
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_frame(reason: String) -> DeltaError {
    warn!(%reason, "rejected frame");
    DeltaError::InvalidFrame { reason }
}
