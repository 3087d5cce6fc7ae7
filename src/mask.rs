//! GC-content window masking.
//!
//! A strand is cut into consecutive, non-overlapping windows (the last one may be
//! shorter). Any window whose GC fraction falls outside `[gc_min, gc_max]` is
//! overwritten with [`MASK`]. Masking is window-granular, so one off-range window
//! invalidates every primer overlapping it, and the output strand keeps the input
//! length so offsets stay comparable.
use std::ops::Range;

use crate::biochem::BiochemistryPredicates;
use crate::sequence::{Strand, MASK};

/// Masks extreme-GC windows of a strand.
#[derive(Clone, Copy, Debug)]
pub struct WindowMasker {
    pub window: usize,
    pub gc_min: f64,
    pub gc_max: f64,
}

/// Result of masking one strand.
#[derive(Clone, Debug)]
pub struct MaskedStrand {
    pub strand: Strand,
    /// Ranges that were replaced with the mask symbol, in strand order.
    pub masked_windows: Vec<Range<usize>>,
}

impl WindowMasker {
    pub fn new(window: usize, gc_min: f64, gc_max: f64) -> Self {
        WindowMasker { window, gc_min, gc_max }
    }

    /// Produce a masked copy of `strand`.
    pub fn mask(&self, strand: &Strand, predicates: &dyn BiochemistryPredicates) -> MaskedStrand {
        let mut bases = strand.as_bytes().to_vec();
        let mut masked_windows = Vec::new();
        if self.window > 0 {
            for (i, chunk) in bases.chunks_mut(self.window).enumerate() {
                if !predicates.gc_in_range(chunk, self.gc_min, self.gc_max) {
                    let start = i * self.window;
                    masked_windows.push(start..start + chunk.len());
                    chunk.fill(MASK);
                }
            }
        }
        MaskedStrand { strand: Strand::from_normalised(strand.kind(), bases), masked_windows }
    }
}
