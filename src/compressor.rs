//! Sending side of a session

use crate::{
    DeltaConfig, DeltaError,
    diff::{BlockDiffEngine, DiffEngine},
    protocol::{Frame, Target},
    state::{BaseTable, SlotCursor},
};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, trace};

/// Counters accumulated over a compressor's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompressionStats {
    /// Frames produced
    pub frames: u64,
    /// Frames that carried the packet verbatim
    pub literal_frames: u64,
    /// Packets stored into a fresh slot
    pub promotions: u64,
    /// Packet bytes consumed
    pub bytes_in: u64,
    /// Frame bytes produced
    pub bytes_out: u64,
}

impl CompressionStats {
    /// Packet bytes per frame byte, or 0.0 before the first frame
    pub fn ratio(&self) -> f64 {
        if self.bytes_out == 0 {
            return 0.0;
        }
        self.bytes_in as f64 / self.bytes_out as f64
    }
}

/// How a packet is framed and where it is stored afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Raw packet into the cursor slot
    Literal { to: usize },
    /// Diff against `from`, packet into the cursor slot
    Promote { from: usize, to: usize },
    /// Diff against `from`, packet replaces that base
    InPlace { slot: usize },
}

impl Placement {
    fn label(self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::Promote { .. } => "promote",
            Self::InPlace { .. } => "in-place",
        }
    }
}

/// Compressor for one outbound packet stream
///
/// Every packet is diffed against all base slots and the smallest diff is
/// framed. The packet then becomes a base itself, either in a fresh slot or
/// replacing the base it was diffed against.
pub struct Compressor {
    config: DeltaConfig,
    engine: Arc<dyn DiffEngine>,
    bases: BaseTable,
    cursor: SlotCursor,
    stats: CompressionStats,
}

impl Compressor {
    /// Create a compressor with the default configuration
    pub fn new() -> Self {
        Self {
            config: DeltaConfig::default(),
            engine: Arc::new(BlockDiffEngine::new()),
            bases: BaseTable::new(),
            cursor: SlotCursor::new(),
            stats: CompressionStats::default(),
        }
    }

    /// Create a new compressor builder
    pub fn builder() -> CompressorBuilder {
        CompressorBuilder::new()
    }

    /// Compress one packet into a frame
    ///
    /// # Arguments
    /// * `packet` - Packet to send; may be empty
    ///
    /// # Returns
    /// Frame bytes, never longer than `packet.len() + 1`
    ///
    /// # Errors
    /// Returns [`DeltaError`] if the diff engine fails. The base table is
    /// left untouched in that case.
    pub fn compress(&mut self, packet: &[u8]) -> Result<Bytes, DeltaError> {
        let packet = Bytes::copy_from_slice(packet);

        let mut best_slot = 0;
        let mut best_diff: Option<Bytes> = None;
        for (slot, base) in self.bases.iter() {
            let diff = self.engine.compute_diff(base, &packet)?;
            trace!(slot, diff_len = diff.len(), "candidate base");

            if best_diff.as_ref().is_none_or(|best| diff.len() < best.len()) {
                best_slot = slot;
                best_diff = Some(diff);
            }
        }
        let diff = best_diff.unwrap_or_default();

        let placement = self.choose_placement(packet.len(), best_slot, diff.len());
        let frame = match placement {
            Placement::Literal { to } => Frame::literal(Target::Slot(to), packet.clone()),
            Placement::Promote { from, to } => Frame::delta(from, Target::Slot(to), diff),
            Placement::InPlace { slot } => Frame::delta(slot, Target::Slot(slot), diff),
        };
        let encoded = frame.to_bytes()?;

        let header = frame.header();
        debug!(
            branch = placement.label(),
            from = ?header.from,
            to = ?header.to,
            packet_len = packet.len(),
            frame_len = encoded.len(),
            "compressed packet"
        );

        self.record(placement, packet.len(), encoded.len());
        match placement {
            Placement::Literal { to } | Placement::Promote { to, .. } => {
                self.cursor.advance();
                self.bases.store(to, packet);
            }
            Placement::InPlace { slot } => self.bases.store(slot, packet),
        }

        Ok(encoded)
    }

    fn choose_placement(&self, packet_len: usize, from: usize, diff_len: usize) -> Placement {
        if !self.engine.is_diff_worthwhile(packet_len, diff_len) {
            return Placement::Literal {
                to: self.cursor.peek(),
            };
        }

        // Empty diff only happens for an empty packet; keep the base
        let ratio = if diff_len == 0 {
            f32::INFINITY
        } else {
            packet_len as f32 / diff_len as f32
        };

        if ratio < self.config.promotion_ratio {
            Placement::Promote {
                from,
                to: self.cursor.peek(),
            }
        } else {
            Placement::InPlace { slot: from }
        }
    }

    fn record(&mut self, placement: Placement, packet_len: usize, frame_len: usize) {
        let stats = &mut self.stats;
        stats.frames += 1;
        stats.bytes_in += packet_len as u64;
        stats.bytes_out += frame_len as u64;

        let kind = match placement {
            Placement::Literal { .. } => {
                stats.literal_frames += 1;
                "literal"
            }
            Placement::Promote { .. } | Placement::InPlace { .. } => "delta",
        };
        metrics::counter!("deltapack_frames_total", "kind" => kind).increment(1);

        if !matches!(placement, Placement::InPlace { .. }) {
            stats.promotions += 1;
            metrics::counter!("deltapack_promotions_total").increment(1);
        }

        metrics::counter!("deltapack_bytes_in_total").increment(packet_len as u64);
        metrics::counter!("deltapack_bytes_out_total").increment(frame_len as u64);
    }

    /// Counters since creation or the last [`reset`](Self::reset)
    pub fn stats(&self) -> CompressionStats {
        self.stats
    }

    /// Get compressor configuration
    pub fn config(&self) -> &DeltaConfig {
        &self.config
    }

    /// Get diff engine reference
    pub fn diff_engine(&self) -> &Arc<dyn DiffEngine> {
        &self.engine
    }

    /// Current base packets
    pub fn bases(&self) -> &BaseTable {
        &self.bases
    }

    /// Drop all bases, rewind the slot cursor and zero the stats
    ///
    /// The receiving [`Decompressor`](crate::Decompressor) must be reset at
    /// the same point in the stream.
    pub fn reset(&mut self) {
        self.bases.clear();
        self.cursor.reset();
        self.stats = CompressionStats::default();
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for configuring a compressor
pub struct CompressorBuilder {
    config: Option<DeltaConfig>,
    diff_engine: Option<Arc<dyn DiffEngine>>,
}

impl CompressorBuilder {
    fn new() -> Self {
        Self {
            config: None,
            diff_engine: None,
        }
    }

    /// Set compressor configuration
    pub fn config(mut self, config: DeltaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set diff engine implementation
    ///
    /// Overrides the engine derived from `min_match_length`.
    pub fn diff_engine(mut self, diff_engine: Arc<dyn DiffEngine>) -> Self {
        self.diff_engine = Some(diff_engine);
        self
    }

    /// Build the compressor
    ///
    /// # Errors
    /// Returns [`DeltaError::InvalidConfig`] if the configuration fails
    /// [`DeltaConfig::validate`]
    pub fn build(self) -> Result<Compressor, DeltaError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let engine = self.diff_engine.unwrap_or_else(|| {
            if config.min_match_length > 1 {
                Arc::new(BlockDiffEngine::with_min_match_length(
                    config.min_match_length,
                ))
            } else {
                Arc::new(BlockDiffEngine::new())
            }
        });

        Ok(Compressor {
            config,
            engine,
            bases: BaseTable::new(),
            cursor: SlotCursor::new(),
            stats: CompressionStats::default(),
        })
    }
}
