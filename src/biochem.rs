//! Biochemical predicates used by masking, filtering and pair scoring.
//!
//! The pipeline only talks to the [`BiochemistryPredicates`] trait, so callers can
//! plug in their own thermodynamics. [`StandardPredicates`] is the built-in set:
//!
//! - **GC fraction**: share of `G`/`C` in a window.
//! - **GC clamp**: the 3′ base is `G` or `C` and at most three of the last five
//!   bases are `G`/`C`.
//! - **Melting temperature**: Wallace rule `2(A+T) + 4(G+C)` below 14 nt, otherwise
//!   `64.9 + 41 (G+C − 16.4) / N`.
//! - **Low complexity**: a homopolymer run of 5 or more, or 4 or more tandem
//!   copies of a dinucleotide (`ATATATAT`).
//!
//! A predicate that cannot be evaluated (too short, non-`ACGT` symbols) reports
//! `None`/`false` so that the caller rejects the candidate instead of failing.
//!
//! # Examples
//! ```
//! use primerscout::biochem::{BiochemistryPredicates, StandardPredicates};
//! let p = StandardPredicates;
//! assert_eq!(p.gc_fraction(b"GGCCAATT"), Some(0.5));
//! assert!(p.gc_clamp_ok(b"AATTAATTAG"));
//! assert!(p.is_low_complexity(b"ACGTTTTTACG"));
//! ```
use crate::sequence::is_primer_base;

/// Homopolymer runs at or above this length are low complexity.
pub const MIN_HOMOPOLYMER_RUN: usize = 5;
/// Dinucleotide tandem copies at or above this count are low complexity.
pub const MIN_DINUCLEOTIDE_REPEATS: usize = 4;
/// Bases inspected at the 3′ end for the GC clamp.
pub const CLAMP_WINDOW: usize = 5;
/// Maximum `G`/`C` count allowed inside [`CLAMP_WINDOW`].
pub const CLAMP_MAX_GC: usize = 3;

/// Predicates the filter pipeline consumes as black boxes.
pub trait BiochemistryPredicates: Sync {
    /// GC fraction in `[0, 1]`, or `None` for an empty window.
    fn gc_fraction(&self, window: &[u8]) -> Option<f64>;

    /// 3′ end stability rule.
    fn gc_clamp_ok(&self, primer: &[u8]) -> bool;

    /// Estimated melting temperature in °C, `None` when it cannot be estimated.
    fn melting_temp(&self, primer: &[u8]) -> Option<f64>;

    fn is_low_complexity(&self, primer: &[u8]) -> bool;

    fn melting_temp_in_range(&self, primer: &[u8], t_min: f64, t_max: f64) -> bool {
        self.melting_temp(primer).is_some_and(|t| t >= t_min && t <= t_max)
    }

    fn gc_in_range(&self, window: &[u8], gc_min: f64, gc_max: f64) -> bool {
        self.gc_fraction(window).is_some_and(|gc| gc >= gc_min && gc <= gc_max)
    }
}

/// Default predicate set (see module docs for the rules).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardPredicates;

#[inline]
fn gc_count(seq: &[u8]) -> usize {
    seq.iter().filter(|&&b| matches!(b, b'G' | b'C')).count()
}

impl BiochemistryPredicates for StandardPredicates {
    fn gc_fraction(&self, window: &[u8]) -> Option<f64> {
        if window.is_empty() {
            return None;
        }
        Some(gc_count(window) as f64 / window.len() as f64)
    }

    fn gc_clamp_ok(&self, primer: &[u8]) -> bool {
        if primer.len() < CLAMP_WINDOW {
            return false;
        }
        let tail = &primer[primer.len() - CLAMP_WINDOW..];
        matches!(tail[CLAMP_WINDOW - 1], b'G' | b'C') && gc_count(tail) <= CLAMP_MAX_GC
    }

    fn melting_temp(&self, primer: &[u8]) -> Option<f64> {
        if primer.is_empty() || !primer.iter().all(|&b| is_primer_base(b)) {
            return None;
        }
        let n = primer.len() as f64;
        let gc = gc_count(primer) as f64;
        if primer.len() < 14 {
            Some(2.0 * (n - gc) + 4.0 * gc)
        } else {
            Some(64.9 + 41.0 * (gc - 16.4) / n)
        }
    }

    fn is_low_complexity(&self, primer: &[u8]) -> bool {
        longest_homopolymer(primer) >= MIN_HOMOPOLYMER_RUN
            || max_dinucleotide_repeats(primer) >= MIN_DINUCLEOTIDE_REPEATS
    }
}

/// Length of the longest single-base run.
pub fn longest_homopolymer(seq: &[u8]) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut prev = None;
    for &b in seq {
        run = if prev == Some(b) { run + 1 } else { 1 };
        prev = Some(b);
        best = best.max(run);
    }
    best
}

/// Largest number of back-to-back copies of any two-base unit (`XY`, `X != Y`).
pub fn max_dinucleotide_repeats(seq: &[u8]) -> usize {
    let mut best = 0;
    for start in 0..seq.len().saturating_sub(1) {
        let unit = &seq[start..start + 2];
        if unit[0] == unit[1] {
            continue;
        }
        let copies = seq[start..].chunks_exact(2).take_while(|c| *c == unit).count();
        best = best.max(copies);
    }
    best
}
