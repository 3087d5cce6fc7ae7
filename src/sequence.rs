//! Core types for **strands**, **genomes** and **candidate primers**.
//!
//! This module holds the data model used across the crate. Strands are immutable
//! once built: masking produces a new [`Strand`] rather than editing the genomic
//! sequence in place, and the index is always built from the unmasked strands.
//!
//! Bases are stored upper-case. Anything outside `ACGT` is normalised to `N` on
//! construction, and the reserved [`MASK`] symbol marks excluded regions. Neither
//! may appear inside a primer.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PrimerError, Result};

/// Symbol written over windows excluded by GC masking.
pub const MASK: u8 = b'-';

/// Symbol any non-`ACGT` input byte is normalised to.
pub const UNKNOWN: u8 = b'N';

/// `true` for the four bases a primer may contain.
#[inline]
pub fn is_primer_base(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T')
}

/// Genome topology, shared by both strands.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Linear,
    Circular,
}

impl Topology {
    pub fn from_circular(is_circular: bool) -> Self {
        if is_circular { Topology::Circular } else { Topology::Linear }
    }

    pub fn is_circular(self) -> bool {
        matches!(self, Topology::Circular)
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Linear => write!(f, "linear"),
            Topology::Circular => write!(f, "circular"),
        }
    }
}

/// Which strand a primer was drawn from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrandKind {
    /// The sequence as read from the input.
    Forward,
    /// Reverse complement of the forward strand.
    Reverse,
}

impl fmt::Display for StrandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrandKind::Forward => write!(f, "+"),
            StrandKind::Reverse => write!(f, "-"),
        }
    }
}

/// An immutable, fixed-length run of bases belonging to one strand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Strand {
    kind: StrandKind,
    bases: Vec<u8>,
}

impl Strand {
    /// Build a strand from raw bytes, upper-casing and normalising non-`ACGT` to `N`.
    /// The mask symbol is kept as is.
    pub fn new(kind: StrandKind, raw: &[u8]) -> Self {
        let bases = raw
            .iter()
            .map(|b| match b.to_ascii_uppercase() {
                c @ (b'A' | b'C' | b'G' | b'T') => c,
                MASK => MASK,
                _ => UNKNOWN,
            })
            .collect();
        Strand { kind, bases }
    }

    /// Wrap bytes that are already normalised (used by the masker).
    pub(crate) fn from_normalised(kind: StrandKind, bases: Vec<u8>) -> Self {
        Strand { kind, bases }
    }

    pub fn kind(&self) -> StrandKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bases
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Every length-`len` window as `(offset, bytes)`; empty when the strand is shorter.
    pub fn windows(&self, len: usize) -> impl Iterator<Item = (usize, &[u8])> + '_ {
        let bases: &[u8] = if len == 0 { &[] } else { &self.bases };
        bases.windows(len.max(1)).enumerate()
    }

    /// Number of positions masked out.
    pub fn masked_bases(&self) -> usize {
        self.bases.iter().filter(|&&b| b == MASK).count()
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bases))
    }
}

/// Anything that can hand out the two strands of a genome.
pub trait SequenceProvider {
    fn forward_strand(&self) -> &Strand;
    fn reverse_strand(&self) -> &Strand;
    fn is_circular(&self) -> bool;

    fn length(&self) -> usize {
        self.forward_strand().len()
    }

    fn topology(&self) -> Topology {
        Topology::from_circular(self.is_circular())
    }
}

/// A genome: identifier, forward strand, its reverse complement and topology.
#[derive(Clone, Debug)]
pub struct Genome {
    id: String,
    forward: Strand,
    reverse: Strand,
    topology: Topology,
}

impl Genome {
    /// Build a genome from forward-strand bytes. The reverse strand is derived.
    ///
    /// # Errors
    /// [`PrimerError::EmptySequence`] when `seq` is empty.
    pub fn new(id: impl Into<String>, seq: &[u8], topology: Topology) -> Result<Self> {
        if seq.is_empty() {
            return Err(PrimerError::EmptySequence);
        }
        let forward = Strand::new(StrandKind::Forward, seq);
        let reverse = Strand::from_normalised(
            StrandKind::Reverse,
            bio::alphabets::dna::revcomp(forward.as_bytes()),
        );
        Ok(Genome { id: id.into(), forward, reverse, topology })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }
}

impl SequenceProvider for Genome {
    fn forward_strand(&self) -> &Strand {
        &self.forward
    }

    fn reverse_strand(&self) -> &Strand {
        &self.reverse
    }

    fn is_circular(&self) -> bool {
        self.topology.is_circular()
    }

    fn topology(&self) -> Topology {
        self.topology
    }
}

/// A candidate primer: its bases plus where it was found.
///
/// Two occurrences of the same bases at different offsets are distinct
/// candidates; the index collapses them into one word with a higher count.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct Primer {
    /// Upper-case `ACGT` bases, 5′ to 3′ on `strand`.
    pub sequence: String,
    /// Strand the primer was read from.
    pub strand: StrandKind,
    /// 0-based start on `strand`.
    pub offset: usize,
}

impl Primer {
    pub fn new(sequence: impl Into<String>, strand: StrandKind, offset: usize) -> Self {
        Primer { sequence: sequence.into(), strand, offset }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.sequence.as_bytes()
    }

    /// Start of the primer's footprint in forward-strand coordinates.
    ///
    /// A reverse-strand primer at offset `j` covers forward positions
    /// `genome_len - j - len .. genome_len - j`.
    pub fn genomic_start(&self, genome_len: usize) -> usize {
        match self.strand {
            StrandKind::Forward => self.offset,
            StrandKind::Reverse => genome_len.saturating_sub(self.offset + self.len()),
        }
    }
}

impl fmt::Display for Primer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}){}", self.strand, self.offset, self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_strand_is_reverse_complement() {
        let g = Genome::new("g", b"aacgTT", Topology::Linear).unwrap();
        assert_eq!(g.forward_strand().as_bytes(), b"AACGTT");
        assert_eq!(g.reverse_strand().as_bytes(), b"AACGTT");
        let g = Genome::new("g", b"AAAC", Topology::Linear).unwrap();
        assert_eq!(g.reverse_strand().as_bytes(), b"GTTT");
        assert_eq!(g.reverse_strand().kind(), StrandKind::Reverse);
    }

    #[test]
    fn ambiguous_bases_become_unknown() {
        let s = Strand::new(StrandKind::Forward, b"ACRYN-x");
        assert_eq!(s.as_bytes(), b"ACNNN-N");
        assert_eq!(s.masked_bases(), 1);
    }

    #[test]
    fn empty_genome_is_rejected() {
        assert!(matches!(Genome::new("g", b"", Topology::Linear), Err(PrimerError::EmptySequence)));
    }

    #[test]
    fn windows_cover_every_offset() {
        let s = Strand::new(StrandKind::Forward, b"ACGTA");
        let w: Vec<_> = s.windows(3).map(|(i, w)| (i, w.to_vec())).collect();
        assert_eq!(w, vec![(0, b"ACG".to_vec()), (1, b"CGT".to_vec()), (2, b"GTA".to_vec())]);
        assert_eq!(s.windows(6).count(), 0);
        assert_eq!(s.windows(0).count(), 0);
    }

    #[test]
    fn reverse_primer_maps_to_forward_coordinates() {
        // Genome of 10; reverse-strand offset 2 with length 3 covers forward 5..8.
        let p = Primer::new("ACG", StrandKind::Reverse, 2);
        assert_eq!(p.genomic_start(10), 5);
        let f = Primer::new("ACG", StrandKind::Forward, 2);
        assert_eq!(f.genomic_start(10), 2);
    }

    #[test]
    fn provider_reports_topology() {
        let g = Genome::new("g", b"ACGT", Topology::Circular).unwrap();
        assert!(g.is_circular());
        assert_eq!(g.length(), 4);
        assert!(!g.with_topology(Topology::Linear).is_circular());
    }
}
