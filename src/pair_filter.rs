//! Pair-level filtering and ranking.
//!
//! [`PairFilter`] owns the pair list produced by pairing and shrinks it in
//! place. Both filters keep the surviving pairs in their original order.
//! Ranking happens only when pairs are read out with
//! [`PairFilter::get_primer_pairs`].
use std::cmp::Ordering;
use std::collections::HashSet;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::biochem::BiochemistryPredicates;
use crate::pairing::PrimerPair;
use crate::restriction::RestrictionSiteTable;

/// Order in which [`PairFilter::get_primer_pairs`] returns pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Pairing order: forward input order, then amplicon length.
    #[default]
    Discovery,
    /// Smallest melting temperature difference between the two primers first.
    TmBalance,
    /// Mean primer GC closest to the middle of the GC window first.
    GcDeviation,
}

impl std::str::FromStr for Ranking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "discovery" => Ok(Self::Discovery),
            "tm_balance" | "tm" => Ok(Self::TmBalance),
            "gc_deviation" | "gc" => Ok(Self::GcDeviation),
            other => Err(format!("unknown ranking '{other}' (discovery, tm_balance, gc_deviation)")),
        }
    }
}

/// Filters and ranks primer pairs.
pub struct PairFilter<'a> {
    pairs: Vec<PrimerPair>,
    predicates: &'a dyn BiochemistryPredicates,
    gc_min: f64,
    gc_max: f64,
    ranking: Ranking,
}

impl<'a> PairFilter<'a> {
    pub fn new(pairs: Vec<PrimerPair>, predicates: &'a dyn BiochemistryPredicates, gc_min: f64, gc_max: f64) -> Self {
        PairFilter { pairs, predicates, gc_min, gc_max, ranking: Ranking::Discovery }
    }

    pub fn with_ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn pairs(&self) -> &[PrimerPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_pairs(self) -> Vec<PrimerPair> {
        self.pairs
    }

    /// Mean GC fraction of the two primers.
    pub fn primer_gc(&self, pair: &PrimerPair) -> Option<f64> {
        let f = self.predicates.gc_fraction(pair.forward.as_bytes())?;
        let r = self.predicates.gc_fraction(pair.reverse.as_bytes())?;
        Some((f + r) / 2.0)
    }

    /// Drop pairs whose mean primer GC or amplicon GC is outside the window.
    /// Returns how many were removed.
    pub fn apply_gc_filter(&mut self) -> usize {
        let before = self.pairs.len();
        let (lo, hi) = (self.gc_min, self.gc_max);
        let in_range = |gc: Option<f64>| gc.is_some_and(|gc| gc >= lo && gc <= hi);
        let pairs = std::mem::take(&mut self.pairs);
        self.pairs = pairs
            .into_par_iter()
            .filter(|p| in_range(self.primer_gc(p)) && in_range(self.predicates.gc_fraction(p.amplicon.as_bytes())))
            .collect();
        let removed = before - self.pairs.len();
        log::info!("pair GC filter: {} -> {} pairs", before, self.pairs.len());
        removed
    }

    /// Drop pairs whose amplicon carries any site of `table`. Returns how many
    /// were removed.
    pub fn apply_restriction_filter(&mut self, table: &RestrictionSiteTable) -> usize {
        let before = self.pairs.len();
        let pairs = std::mem::take(&mut self.pairs);
        self.pairs = pairs.into_par_iter().filter(|p| !table.contains_any(p.amplicon.as_bytes())).collect();
        let removed = before - self.pairs.len();
        log::info!("restriction filter: {} -> {} pairs", before, self.pairs.len());
        removed
    }

    /// Up to `n` distinct pairs in the configured [`Ranking`].
    ///
    /// Pairs are distinct by their (forward, reverse) sequences; the first
    /// occurrence wins.
    pub fn get_primer_pairs(&self, n: usize) -> Vec<PrimerPair> {
        match self.ranking {
            Ranking::Discovery => self.get_primer_pairs_by(n, |_, _| Ordering::Equal),
            Ranking::TmBalance => self.get_primer_pairs_by(n, |a, b| self.tm_gap(a).total_cmp(&self.tm_gap(b))),
            Ranking::GcDeviation => {
                self.get_primer_pairs_by(n, |a, b| self.gc_deviation(a).total_cmp(&self.gc_deviation(b)))
            }
        }
    }

    /// Up to `n` distinct pairs ordered by `compare` (stable).
    pub fn get_primer_pairs_by<F>(&self, n: usize, mut compare: F) -> Vec<PrimerPair>
    where
        F: FnMut(&PrimerPair, &PrimerPair) -> Ordering,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<&PrimerPair> = self
            .pairs
            .iter()
            .filter(|p| seen.insert((p.forward.sequence.as_str(), p.reverse.sequence.as_str())))
            .collect();
        unique.sort_by(|a, b| compare(a, b));
        unique.into_iter().take(n).cloned().collect()
    }

    fn tm_gap(&self, pair: &PrimerPair) -> f64 {
        match (self.predicates.melting_temp(pair.forward.as_bytes()), self.predicates.melting_temp(pair.reverse.as_bytes())) {
            (Some(f), Some(r)) => (f - r).abs(),
            _ => f64::INFINITY,
        }
    }

    fn gc_deviation(&self, pair: &PrimerPair) -> f64 {
        let target = (self.gc_min + self.gc_max) / 2.0;
        self.primer_gc(pair).map_or(f64::INFINITY, |gc| (gc - target).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biochem::StandardPredicates;
    use crate::sequence::{Primer, StrandKind};

    fn pair(fwd: &str, rev: &str, amplicon: &str) -> PrimerPair {
        PrimerPair {
            forward: Primer::new(fwd, StrandKind::Forward, 0),
            reverse: Primer::new(rev, StrandKind::Reverse, 0),
            forward_start: 0,
            reverse_start: amplicon.len() - rev.len(),
            amplicon_length: amplicon.len(),
            amplicon: amplicon.to_string(),
        }
    }

    const P: StandardPredicates = StandardPredicates;

    #[test]
    fn amplicon_with_site_is_excluded() {
        let table = RestrictionSiteTable::with_enzymes(&["EcoRI"]).unwrap();
        let clean = pair("ACGTAC", "GTACGT", "ACGTACTTTTACGTAC");
        let dirty = pair("ACGTAC", "GTACGA", "ACGTGAATTCACGTAC");
        let mut f = PairFilter::new(vec![clean.clone(), dirty], &P, 0.0, 1.0);
        assert_eq!(f.apply_restriction_filter(&table), 1);
        assert_eq!(f.pairs(), &[clean]);
    }

    #[test]
    fn gc_filter_checks_primers_and_amplicon() {
        // primers 0.5 each, amplicon 0.5
        let balanced = pair("ACGT", "TGCA", "ACGTATGCGCATTGCA");
        // primers fine, amplicon all A/T apart from the primers
        let at_rich = pair("ACGT", "TGCA", "ACGTAAAAAAAATGCA");
        // amplicon fine, primers all G/C
        let gc_primers = pair("GGCC", "GCGC", "GGCCAATTAATTGCGC");
        let mut f = PairFilter::new(vec![balanced.clone(), at_rich, gc_primers], &P, 0.4, 0.6);
        assert_eq!(f.apply_gc_filter(), 2);
        assert_eq!(f.pairs(), &[balanced]);
    }

    #[test]
    fn discovery_order_dedups_and_truncates() {
        let a = pair("AAAACCCCGG", "TTTTGGGGCC", "AAAACCCCGGTTTTGGGGCC");
        let b = pair("ACACACGTGT", "TGTGCACACA", "ACACACGTGTTGTGCACACA");
        let mut a2 = a.clone();
        a2.forward.offset = 99;
        let f = PairFilter::new(vec![a.clone(), a2, b.clone()], &P, 0.0, 1.0);
        assert_eq!(f.get_primer_pairs(10), vec![a.clone(), b]);
        assert_eq!(f.get_primer_pairs(1), vec![a]);
        assert!(f.get_primer_pairs(0).is_empty());
    }

    #[test]
    fn tm_balance_prefers_matched_primers() {
        // Wallace Tm: forward 4*6+2*4 = 32; reverse A 2*10 = 20, reverse B 4*5+2*5 = 30
        let unbalanced = pair("GCGCGCATAT", "AAAAATTTTT", "GCGCGCATATAAAAATTTTT");
        let balanced = pair("GCGCGCATAT", "GCGCGATATA", "GCGCGCATATGCGCGATATA");
        let f = PairFilter::new(vec![unbalanced.clone(), balanced.clone()], &P, 0.0, 1.0)
            .with_ranking(Ranking::TmBalance);
        assert_eq!(f.get_primer_pairs(2), vec![balanced, unbalanced]);
    }

    #[test]
    fn gc_deviation_and_custom_comparators() {
        let off = pair("GGGGGGGGAA", "CCCCCCCCAA", "GGGGGGGGAACCCCCCCCAA");
        let mid = pair("GGGGGAAAAA", "CCCCCTTTTT", "GGGGGAAAAACCCCCTTTTT");
        let f = PairFilter::new(vec![off.clone(), mid.clone()], &P, 0.4, 0.6).with_ranking(Ranking::GcDeviation);
        assert_eq!(f.get_primer_pairs(2), vec![mid.clone(), off.clone()]);
        let descending = f.get_primer_pairs_by(1, |a, b| b.forward.sequence.cmp(&a.forward.sequence));
        assert_eq!(descending, vec![off]);
    }

    #[test]
    fn ranking_parses_from_names() {
        assert_eq!("tm-balance".parse::<Ranking>(), Ok(Ranking::TmBalance));
        assert_eq!("GC_DEVIATION".parse::<Ranking>(), Ok(Ranking::GcDeviation));
        assert_eq!("discovery".parse::<Ranking>(), Ok(Ranking::Discovery));
        assert!("best".parse::<Ranking>().is_err());
    }
}
