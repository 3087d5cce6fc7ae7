//! Restriction site detection.
//!
//! A [`RestrictionSiteTable`] holds the recognition sites to avoid. Sites made of
//! plain `ACGT` go into one Aho-Corasick automaton; sites with IUPAC ambiguity
//! codes are matched by a bitmask scan. A site that is not its own reverse
//! complement is also searched in the opposite orientation, so a hit on either
//! strand is reported.
//!
//! # Examples
//! ```
//! use primerscout::restriction::RestrictionSiteTable;
//! let table = RestrictionSiteTable::with_enzymes(&["EcoRI", "BsaI"]).unwrap();
//! assert!(table.contains_any(b"TTGAATTCAA"));
//! // BsaI on the bottom strand
//! assert!(table.contains_any(b"AAGAGACCAA"));
//! assert!(!table.contains_any(b"ACGTACGTAC"));
//! ```
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, AhoCorasickKind};
use serde::Serialize;

use crate::data::enzymes;
use crate::error::{PrimerError, Result};

/// A named recognition site (5'→3', IUPAC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Enzyme {
    pub name: &'static str,
    pub site: &'static str,
}

const BASE_A: u8 = 0b0001;
const BASE_C: u8 = 0b0010;
const BASE_G: u8 = 0b0100;
const BASE_T: u8 = 0b1000;

/// Bitmask of the bases an IUPAC letter stands for; 0 for anything else.
fn iupac_mask(letter: u8) -> u8 {
    match letter {
        b'A' => BASE_A,
        b'C' => BASE_C,
        b'G' => BASE_G,
        b'T' => BASE_T,
        b'W' => BASE_A | BASE_T,
        b'S' => BASE_C | BASE_G,
        b'M' => BASE_A | BASE_C,
        b'K' => BASE_G | BASE_T,
        b'R' => BASE_A | BASE_G,
        b'Y' => BASE_C | BASE_T,
        b'B' => BASE_C | BASE_G | BASE_T,
        b'D' => BASE_A | BASE_G | BASE_T,
        b'H' => BASE_A | BASE_C | BASE_T,
        b'V' => BASE_A | BASE_C | BASE_G,
        b'N' => BASE_A | BASE_C | BASE_G | BASE_T,
        _ => 0,
    }
}

/// Bitmask of a sequence base. Only `ACGT` can match a site.
fn base_mask(base: u8) -> u8 {
    match base {
        b'A' => BASE_A,
        b'C' => BASE_C,
        b'G' => BASE_G,
        b'T' => BASE_T,
        _ => 0,
    }
}

#[derive(Clone, Debug)]
struct SitePattern {
    enzyme: String,
    pattern: Vec<u8>,
    reverse: bool,
}

/// One recognition site found in a sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteHit<'t> {
    pub enzyme: &'t str,
    pub offset: usize,
    pub len: usize,
    /// Matched as the reverse complement of the listed site.
    pub reverse: bool,
}

/// Compiled set of recognition sites.
#[derive(Clone, Debug)]
pub struct RestrictionSiteTable {
    patterns: Vec<SitePattern>,
    /// Automaton pattern id -> index into `patterns`.
    exact_ids: Vec<usize>,
    exact: Option<AhoCorasick>,
    /// Indices of degenerate patterns with their per-position masks.
    degenerate: Vec<(usize, Vec<u8>)>,
}

impl RestrictionSiteTable {
    /// The full built-in panel.
    pub fn builtin() -> Result<Self> {
        Self::from_sites(enzymes::PANEL.iter().map(|e| (e.name, e.site)))
    }

    /// Built-in enzymes selected by name (case-insensitive).
    ///
    /// # Errors
    /// [`PrimerError::UnknownEnzyme`] for a name not in the panel.
    pub fn with_enzymes<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let enzyme = enzymes::by_name(name).ok_or_else(|| PrimerError::UnknownEnzyme(name.to_string()))?;
            selected.push((enzyme.name, enzyme.site));
        }
        Self::from_sites(selected)
    }

    /// Build from arbitrary `(name, site)` pairs.
    ///
    /// # Errors
    /// [`PrimerError::InvalidPattern`] when a site is empty or has a non-IUPAC letter.
    pub fn from_sites<I, N, S>(sites: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: AsRef<str>,
        S: AsRef<str>,
    {
        let mut patterns = Vec::new();
        for (name, site) in sites {
            let (name, site) = (name.as_ref(), site.as_ref());
            let forward = site.trim().to_ascii_uppercase().into_bytes();
            if forward.is_empty() || forward.iter().any(|&b| iupac_mask(b) == 0) {
                return Err(PrimerError::InvalidPattern { enzyme: name.to_string(), pattern: site.to_string() });
            }
            let reverse = bio::alphabets::dna::revcomp(&forward);
            let palindromic = reverse == forward;
            patterns.push(SitePattern { enzyme: name.to_string(), pattern: forward, reverse: false });
            if !palindromic {
                patterns.push(SitePattern { enzyme: name.to_string(), pattern: reverse, reverse: true });
            }
        }

        let mut exact_ids = Vec::new();
        let mut degenerate = Vec::new();
        for (i, p) in patterns.iter().enumerate() {
            if p.pattern.iter().all(|&b| base_mask(b) != 0) {
                exact_ids.push(i);
            } else {
                degenerate.push((i, p.pattern.iter().map(|&b| iupac_mask(b)).collect()));
            }
        }
        let exact = if exact_ids.is_empty() {
            None
        } else {
            let ac = AhoCorasickBuilder::new()
                .kind(Some(AhoCorasickKind::DFA))
                .build(exact_ids.iter().map(|&i| &patterns[i].pattern))?;
            Some(ac)
        };
        log::debug!(
            "restriction table: {} patterns ({} exact, {} degenerate)",
            patterns.len(),
            exact_ids.len(),
            degenerate.len()
        );
        Ok(RestrictionSiteTable { patterns, exact_ids, exact, degenerate })
    }

    /// Distinct enzyme names in insertion order.
    pub fn enzyme_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for p in &self.patterns {
            if !names.contains(&p.enzyme.as_str()) {
                names.push(&p.enzyme);
            }
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Every site occurrence, overlapping ones included, ordered by offset.
    pub fn find_sites(&self, seq: &[u8]) -> Vec<SiteHit<'_>> {
        let mut hits = Vec::new();
        if let Some(ac) = &self.exact {
            for m in ac.find_overlapping_iter(seq) {
                let p = &self.patterns[self.exact_ids[m.pattern().as_usize()]];
                hits.push(self.hit(p, m.start()));
            }
        }
        for (i, masks) in &self.degenerate {
            let p = &self.patterns[*i];
            for (offset, window) in seq.windows(masks.len()).enumerate() {
                if matches_masks(window, masks) {
                    hits.push(self.hit(p, offset));
                }
            }
        }
        hits.sort_by(|a, b| a.offset.cmp(&b.offset).then_with(|| a.enzyme.cmp(b.enzyme)));
        hits
    }

    /// True if any site occurs in `seq`.
    pub fn contains_any(&self, seq: &[u8]) -> bool {
        if self.exact.as_ref().is_some_and(|ac| ac.is_match(seq)) {
            return true;
        }
        self.degenerate.iter().any(|(_, masks)| seq.windows(masks.len()).any(|w| matches_masks(w, masks)))
    }

    fn hit<'t>(&self, p: &'t SitePattern, offset: usize) -> SiteHit<'t> {
        SiteHit { enzyme: &p.enzyme, offset, len: p.pattern.len(), reverse: p.reverse }
    }
}

#[inline]
fn matches_masks(window: &[u8], masks: &[u8]) -> bool {
    window.iter().zip(masks).all(|(&b, &m)| base_mask(b) & m != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_panel_compiles() {
        let t = RestrictionSiteTable::builtin().unwrap();
        assert!(!t.is_empty());
        assert_eq!(t.enzyme_names().len(), enzymes::PANEL.len());
        assert!(t.enzyme_names().contains(&"EcoRI"));
    }

    #[test]
    fn exact_sites_are_located() {
        let t = RestrictionSiteTable::with_enzymes(&["ecori", "BamHI"]).unwrap();
        let hits = t.find_sites(b"GGATCCAAGAATTC");
        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].enzyme, hits[0].offset), ("BamHI", 0));
        assert_eq!((hits[1].enzyme, hits[1].offset), ("EcoRI", 8));
        assert!(hits.iter().all(|h| !h.reverse));
    }

    #[test]
    fn degenerate_sites_use_iupac() {
        let t = RestrictionSiteTable::with_enzymes(&["SfiI", "AvaI"]).unwrap();
        assert!(t.contains_any(b"TTGGCCACGTAGGCCTT"));
        assert!(!t.contains_any(b"TTGGCCACGTAGGACTT"));
        // CYCGRG: C T C G A G
        let hits = t.find_sites(b"AACTCGAGAA");
        assert_eq!(hits, vec![SiteHit { enzyme: "AvaI", offset: 2, len: 6, reverse: false }]);
        // N in the sequence never satisfies a site
        assert!(!t.contains_any(b"AACNCGAGAA"));
    }

    #[test]
    fn asymmetric_site_found_on_both_strands() {
        let t = RestrictionSiteTable::with_enzymes(&["BsaI"]).unwrap();
        let hits = t.find_sites(b"GGTCTCAAAGAGACC");
        assert_eq!(hits.len(), 2);
        assert!(!hits[0].reverse);
        assert!(hits[1].reverse);
        assert_eq!(hits[1].offset, 9);
    }

    #[test]
    fn palindromes_are_not_double_counted() {
        let t = RestrictionSiteTable::with_enzymes(&["EcoRI", "StyI"]).unwrap();
        assert_eq!(t.find_sites(b"GAATTC").len(), 1);
        assert_eq!(t.find_sites(b"CCATGG").len(), 1);
    }

    #[test]
    fn bad_input_is_rejected() {
        assert!(matches!(
            RestrictionSiteTable::with_enzymes(&["NoSuchI"]),
            Err(PrimerError::UnknownEnzyme(name)) if name == "NoSuchI"
        ));
        assert!(matches!(
            RestrictionSiteTable::from_sites([("Odd", "GAXTC")]),
            Err(PrimerError::InvalidPattern { .. })
        ));
        assert!(RestrictionSiteTable::from_sites([("Empty", "")]).is_err());
    }

    #[test]
    fn custom_sites_are_normalised() {
        let t = RestrictionSiteTable::from_sites([("Mine", "gcnnGC")]).unwrap();
        assert!(t.contains_any(b"TTGCATGCTT"));
    }
}
