//! Forward/reverse primer pairing.
//!
//! All positions are forward-strand ("genomic") coordinates: a reverse-strand
//! primer is placed at the start of its footprint, see
//! [`Primer::genomic_start`]. For a forward primer at `f` and a reverse primer
//! at `r` of length `Lr` the amplicon spans
//!
//! - linear: `r + Lr − f`, only when `r ≥ f`;
//! - circular: `((r − f) mod n) + Lr`, never more than the genome length `n`,
//!   so pairs may wrap past the origin.
//!
//! A pair is kept when `min_amplicon ≤ span ≤ max_amplicon`. Reverse candidates
//! are sorted by position once; each forward primer then binary-searches the
//! window of positions that can satisfy the bounds instead of trying them all.
use serde::Serialize;

use crate::sequence::{Primer, SequenceProvider, Strand, Topology};

/// A forward and reverse primer bounding an amplicon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrimerPair {
    pub forward: Primer,
    pub reverse: Primer,
    /// Genomic start of the forward primer.
    pub forward_start: usize,
    /// Genomic start of the reverse primer's footprint.
    pub reverse_start: usize,
    pub amplicon_length: usize,
    /// Forward-strand bases from `forward_start`, `amplicon_length` long.
    pub amplicon: String,
}

/// Pairs primers against the forward strand of one genome.
pub struct PrimerPairer<'g> {
    strand: &'g Strand,
}

impl<'g> PrimerPairer<'g> {
    pub fn new<P: SequenceProvider + ?Sized>(genome: &'g P) -> Self {
        PrimerPairer { strand: genome.forward_strand() }
    }

    /// Every pair whose amplicon length lies within `[min_amplicon, max_amplicon]`.
    ///
    /// Output follows `forward` order, then increasing distance to the reverse primer.
    pub fn find_pairs(
        &self,
        forward: &[Primer],
        reverse: &[Primer],
        min_amplicon: usize,
        max_amplicon: usize,
        topology: Topology,
    ) -> Vec<PrimerPair> {
        let n = self.strand.len();
        if n == 0 || reverse.is_empty() || min_amplicon > max_amplicon {
            return Vec::new();
        }
        let mut buckets: Vec<(usize, &Primer)> = reverse.iter().map(|p| (p.genomic_start(n), p)).collect();
        buckets.sort_by_key(|&(start, _)| start);

        let shortest = reverse.iter().map(Primer::len).min().unwrap_or(0);
        let longest = reverse.iter().map(Primer::len).max().unwrap_or(0);
        // Distance between the two starts.
        let lo = min_amplicon.saturating_sub(longest);
        let hi = match max_amplicon.checked_sub(shortest) {
            Some(hi) => hi,
            None => return Vec::new(),
        };

        let mut pairs = Vec::new();
        for fwd in forward {
            let f = fwd.genomic_start(n);
            if f >= n {
                continue;
            }
            for (lo_pos, hi_pos) in search_ranges(f, lo, hi, n, topology) {
                let first = buckets.partition_point(|&(s, _)| s < lo_pos);
                for &(r, rev) in buckets[first..].iter().take_while(|&&(s, _)| s <= hi_pos) {
                    if let Some(pair) = self.pair(fwd, f, rev, r, min_amplicon, max_amplicon, topology) {
                        pairs.push(pair);
                    }
                }
            }
        }
        log::debug!(
            "pairing: {} forward x {} reverse -> {} pairs ({}, {}..={} bp)",
            forward.len(),
            reverse.len(),
            pairs.len(),
            topology,
            min_amplicon,
            max_amplicon
        );
        pairs
    }

    #[allow(clippy::too_many_arguments)]
    fn pair(
        &self,
        fwd: &Primer,
        f: usize,
        rev: &Primer,
        r: usize,
        min_amplicon: usize,
        max_amplicon: usize,
        topology: Topology,
    ) -> Option<PrimerPair> {
        let n = self.strand.len();
        let delta = match topology {
            Topology::Linear => r.checked_sub(f)?,
            Topology::Circular => (r + n - f) % n,
        };
        let span = delta + rev.len();
        if span > n || span < min_amplicon || span > max_amplicon {
            return None;
        }
        Some(PrimerPair {
            forward: fwd.clone(),
            reverse: rev.clone(),
            forward_start: f,
            reverse_start: r,
            amplicon_length: span,
            amplicon: self.amplicon(f, span),
        })
    }

    fn amplicon(&self, start: usize, span: usize) -> String {
        let bases = self.strand.as_bytes();
        let n = bases.len();
        if start + span <= n {
            String::from_utf8_lossy(&bases[start..start + span]).into_owned()
        } else {
            let mut out = Vec::with_capacity(span);
            out.extend_from_slice(&bases[start..]);
            out.extend_from_slice(&bases[..span - (n - start)]);
            String::from_utf8_lossy(&out).into_owned()
        }
    }
}

/// Inclusive position ranges, in increasing distance from `f`, where a reverse
/// primer starting `lo..=hi` bases after `f` can sit.
fn search_ranges(f: usize, lo: usize, hi: usize, n: usize, topology: Topology) -> Vec<(usize, usize)> {
    match topology {
        Topology::Linear => {
            let a = f.saturating_add(lo);
            let b = f.saturating_add(hi).min(n - 1);
            if a > b { vec![] } else { vec![(a, b)] }
        }
        Topology::Circular => {
            let hi = hi.min(n - 1);
            if lo > hi {
                return vec![];
            }
            let (a, b) = (f + lo, f + hi);
            if b < n {
                vec![(a, b)]
            } else if a >= n {
                vec![(a - n, b - n)]
            } else {
                vec![(a, n - 1), (0, b - n)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{Genome, StrandKind};
    use crate::testutil::synthetic_genome;

    fn fwd_at(g: &Genome, offset: usize, len: usize) -> Primer {
        let s = &g.forward_strand().as_bytes()[offset..offset + len];
        Primer::new(String::from_utf8_lossy(s), StrandKind::Forward, offset)
    }

    /// Reverse-strand primer whose footprint starts at genomic `start`.
    fn rev_at(g: &Genome, start: usize, len: usize) -> Primer {
        let j = g.length() - start - len;
        let s = &g.reverse_strand().as_bytes()[j..j + len];
        Primer::new(String::from_utf8_lossy(s), StrandKind::Reverse, j)
    }

    #[test]
    fn wrap_around_pair_only_on_circular_genome() {
        let g = Genome::new("ring", &synthetic_genome(1000, 7), Topology::Circular).unwrap();
        let pairer = PrimerPairer::new(&g);
        let f = vec![fwd_at(&g, 900, 20)];
        let r = vec![rev_at(&g, 250, 20)];

        let circular = pairer.find_pairs(&f, &r, 300, 1500, Topology::Circular);
        assert_eq!(circular.len(), 1);
        let p = &circular[0];
        assert_eq!(p.amplicon_length, 370);
        assert_eq!(p.forward_start, 900);
        assert_eq!(p.reverse_start, 250);
        let bases = g.forward_strand().as_bytes();
        let mut expect = bases[900..].to_vec();
        expect.extend_from_slice(&bases[..270]);
        assert_eq!(p.amplicon.as_bytes(), &expect[..]);
        assert!(p.amplicon.starts_with(&p.forward.sequence));

        assert!(pairer.find_pairs(&f, &r, 300, 1500, Topology::Linear).is_empty());
    }

    #[test]
    fn forward_near_end_pairs_with_reverse_offset_across_origin() {
        // Reverse-strand offset 10 of length 10 covers genomic 980..990.
        let g = Genome::new("ring", &synthetic_genome(1000, 7), Topology::Circular).unwrap();
        let pairer = PrimerPairer::new(&g);
        let f = vec![fwd_at(&g, 990, 10)];
        let rev_seq = &g.reverse_strand().as_bytes()[10..20];
        let r = vec![Primer::new(String::from_utf8_lossy(rev_seq), StrandKind::Reverse, 10)];

        let got = pairer.find_pairs(&f, &r, 300, 1500, Topology::Circular);
        let coords: Vec<_> = got.iter().map(|p| (p.forward_start, p.reverse_start, p.amplicon_length)).collect();
        assert_eq!(coords, vec![(990, 980, 1000)]);
        let bases = g.forward_strand().as_bytes();
        let mut expect = bases[990..].to_vec();
        expect.extend_from_slice(&bases[..990]);
        assert_eq!(got[0].amplicon.as_bytes(), &expect[..]);

        assert!(pairer.find_pairs(&f, &r, 300, 1500, Topology::Linear).is_empty());
    }

    #[test]
    fn primer_flush_with_genome_end_pairs_across_origin() {
        let g = Genome::new("ring", &synthetic_genome(1000, 7), Topology::Circular).unwrap();
        let pairer = PrimerPairer::new(&g);
        let f = vec![fwd_at(&g, 980, 20)];
        let r = vec![rev_at(&g, 10, 20), rev_at(&g, 300, 20)];
        let got = pairer.find_pairs(&f, &r, 300, 1500, Topology::Circular);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].reverse_start, 300);
        assert_eq!(got[0].amplicon_length, 340);
        assert!(pairer.find_pairs(&f, &r, 300, 1500, Topology::Linear).is_empty());
    }

    #[test]
    fn linear_pair_and_reverse_primer_binds_amplicon_end() {
        let g = Genome::new("lin", &synthetic_genome(600, 3), Topology::Linear).unwrap();
        let pairer = PrimerPairer::new(&g);
        let f = vec![fwd_at(&g, 100, 20)];
        let r = vec![rev_at(&g, 400, 20)];
        let got = pairer.find_pairs(&f, &r, 300, 320, Topology::Linear);
        assert_eq!(got.len(), 1);
        let p = &got[0];
        assert_eq!(p.amplicon_length, 320);
        // The reverse primer anneals to the amplicon's 3' end.
        let tail = &p.amplicon.as_bytes()[p.amplicon_length - 20..];
        assert_eq!(bio::alphabets::dna::revcomp(tail), p.reverse.as_bytes());
        // Outside the window.
        assert!(pairer.find_pairs(&f, &r, 330, 400, Topology::Linear).is_empty());
        assert!(pairer.find_pairs(&f, &r, 100, 319, Topology::Linear).is_empty());
    }

    #[test]
    fn bucketed_scan_matches_exhaustive_pairing() {
        let n = 400;
        let g = Genome::new("syn", &synthetic_genome(n, 11), Topology::Circular).unwrap();
        let pairer = PrimerPairer::new(&g);
        let forward: Vec<Primer> = (0..=n - 20).step_by(7).map(|i| fwd_at(&g, i, 20)).collect();
        let reverse: Vec<Primer> = (0..=n - 20).step_by(5).map(|i| rev_at(&g, i, 20)).collect();

        for topology in [Topology::Linear, Topology::Circular] {
            for (min, max) in [(50, 120), (0, 40), (300, 1500), (390, 400)] {
                let fast = pairer.find_pairs(&forward, &reverse, min, max, topology);
                let mut slow = Vec::new();
                for fp in &forward {
                    let f = fp.genomic_start(n);
                    for rp in &reverse {
                        let r = rp.genomic_start(n);
                        let span = match topology {
                            Topology::Linear if r < f => continue,
                            Topology::Linear => r - f + 20,
                            Topology::Circular => (r + n - f) % n + 20,
                        };
                        if span <= n && span >= min && span <= max {
                            slow.push((f, r, span));
                        }
                    }
                }
                let mut got: Vec<_> = fast.iter().map(|p| (p.forward_start, p.reverse_start, p.amplicon_length)).collect();
                got.sort();
                slow.sort();
                assert_eq!(got, slow, "{topology} {min}..={max}");
                assert!(fast.iter().all(|p| p.amplicon_length >= min && p.amplicon_length <= max));
                assert!(fast.iter().all(|p| p.amplicon.len() == p.amplicon_length));
            }
        }
    }

    #[test]
    fn empty_inputs_give_no_pairs() {
        let g = Genome::new("g", &synthetic_genome(100, 1), Topology::Linear).unwrap();
        let pairer = PrimerPairer::new(&g);
        let f = vec![fwd_at(&g, 0, 20)];
        assert!(pairer.find_pairs(&f, &[], 10, 90, Topology::Linear).is_empty());
        assert!(pairer.find_pairs(&[], &[rev_at(&g, 50, 20)], 10, 90, Topology::Linear).is_empty());
        assert!(pairer.find_pairs(&f, &[rev_at(&g, 50, 20)], 90, 10, Topology::Linear).is_empty());
    }
}
