#![forbid(unsafe_code)]
//! # primerscout
//!
//! PCR primer discovery for a single genome. Every primer-length window of both
//! strands is a candidate; a chain of filters removes the ones that would make
//! poor primers, the survivors are paired into amplicons of a requested size,
//! and pairs whose amplicon is GC-skewed or carries a restriction site are
//! dropped.
//!
//! ## Pipeline
//! 1. [`index::PrimerIndex`]: trie of every window of both unmasked strands,
//!    used for occurrence counts and Hamming-distance neighbour search.
//! 2. [`mask::WindowMasker`]: blanks out windows with extreme GC content.
//! 3. [`filter::FilterPipeline`]: extraction, GC clamp and melting temperature,
//!    uniqueness, low complexity, cross-similarity.
//! 4. [`pairing::PrimerPairer`]: forward/reverse pairs within the amplicon
//!    bounds, wrapping past the origin on circular genomes.
//! 5. [`pair_filter::PairFilter`]: GC and restriction-site filtering, then
//!    ranking and truncation.
//!
//! Biochemistry is pluggable through [`biochem::BiochemistryPredicates`].
//!
//! ## Examples
//! ```rust
//! use primerscout::{config::Config, sequence::{Genome, Topology}};
//! use primerscout::biochem::StandardPredicates;
//!
//! let seq = b"ATGCGTACGTTAGCCTAGGATCGATCGGCTAAGCTTGCATGCAAGTCCGATCGTAGCTAGCTACGATCG";
//! let genome = Genome::new("demo", seq, Topology::Linear).unwrap();
//! let config = Config { primer_length: 12, min_amplicon: 20, max_amplicon: 60, ..Config::default() };
//! let report = primerscout::design_primers(&genome, &config, &StandardPredicates).unwrap();
//! assert_eq!(report.stages.len(), 5);
//! assert!(report.pairs.len() <= config.top_n_pairs);
//! ```

pub mod biochem;
pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod mask;
pub mod pair_filter;
pub mod pairing;
pub mod report;
pub mod restriction;
pub mod seqio;
pub mod sequence;
pub mod data { pub mod enzymes; }

use std::time::Instant;

use serde::Serialize;

use biochem::BiochemistryPredicates;
use config::Config;
use error::Result;
use filter::{Candidates, FilterPipeline, StageReport};
use index::PrimerIndex;
use pair_filter::PairFilter;
use pairing::{PrimerPair, PrimerPairer};
use restriction::RestrictionSiteTable;
use sequence::{SequenceProvider, Topology};

/// Everything a design run produced.
#[derive(Clone, Debug, Serialize)]
pub struct DesignReport {
    pub genome_length: usize,
    pub topology: Topology,
    /// Distinct words in the primer index.
    pub index_words: usize,
    pub stages: Vec<StageReport>,
    #[serde(skip)]
    pub candidates: Candidates,
    pub pairs_found: usize,
    pub pairs_after_gc: usize,
    pub pairs_after_restriction: usize,
    /// Ranked, deduplicated and truncated to `top_n_pairs`.
    pub pairs: Vec<PrimerPair>,
}

/// Restriction table named by `config.enzymes`, or the built-in panel.
pub fn restriction_table(config: &Config) -> Result<RestrictionSiteTable> {
    match &config.enzymes {
        Some(names) => RestrictionSiteTable::with_enzymes(names),
        None => RestrictionSiteTable::builtin(),
    }
}

/// Topology used for pairing: the genome's own, unless the config asks for a
/// circular run on a linear genome.
pub fn pairing_topology<P: SequenceProvider + ?Sized>(genome: &P, config: &Config) -> Topology {
    if config.is_circular && !genome.is_circular() {
        log::warn!("genome is linear but is_circular is set, pairing as circular");
        return Topology::Circular;
    }
    genome.topology()
}

/// Surviving candidate primers only, without pairing.
pub fn find_candidates<P: SequenceProvider + ?Sized>(
    genome: &P,
    config: &Config,
    predicates: &dyn BiochemistryPredicates,
) -> Result<(Candidates, Vec<StageReport>)> {
    config.validate()?;
    let index = PrimerIndex::from_genome(genome, config.primer_length);
    let out = FilterPipeline::new(config, predicates, &index).run(genome);
    Ok((out.candidates, out.reports))
}

/// Run the whole design: index, mask, filter, pair, filter pairs, rank.
///
/// # Errors
/// Configuration range errors and unknown enzyme names, before any work is done.
/// An empty candidate or pair set is not an error.
pub fn design_primers<P: SequenceProvider + ?Sized>(
    genome: &P,
    config: &Config,
    predicates: &dyn BiochemistryPredicates,
) -> Result<DesignReport> {
    config.validate()?;
    let sites = restriction_table(config)?;
    let start = Instant::now();

    let index = PrimerIndex::from_genome(genome, config.primer_length);
    log::debug!(
        "primer index built in {:.2?}: {} words of length {}, {} nodes",
        start.elapsed(),
        index.len(),
        index.word_len(),
        index.node_count()
    );

    let out = FilterPipeline::new(config, predicates, &index).run(genome);
    log::debug!("filters done in {:.2?}", start.elapsed());
    if out.candidates.forward.is_empty() || out.candidates.reverse.is_empty() {
        log::info!("no candidates left on at least one strand, no pairs possible");
    }

    let topology = pairing_topology(genome, config);
    let pairs = PrimerPairer::new(genome).find_pairs(
        &out.candidates.forward,
        &out.candidates.reverse,
        config.min_amplicon,
        config.max_amplicon,
        topology,
    );
    let pairs_found = pairs.len();
    log::info!("pairing: {} pairs within {}..={} bp", pairs_found, config.min_amplicon, config.max_amplicon);

    let mut pair_filter = PairFilter::new(pairs, predicates, config.gc_min, config.gc_max).with_ranking(config.ranking);
    pair_filter.apply_gc_filter();
    let pairs_after_gc = pair_filter.len();
    pair_filter.apply_restriction_filter(&sites);
    let pairs_after_restriction = pair_filter.len();
    let top = pair_filter.get_primer_pairs(config.top_n_pairs);

    log::info!(
        "design finished in {:.2?}: {} + {} candidates, {} pairs kept, {} reported",
        start.elapsed(),
        out.candidates.forward.len(),
        out.candidates.reverse.len(),
        pairs_after_restriction,
        top.len()
    );

    Ok(DesignReport {
        genome_length: genome.length(),
        topology,
        index_words: index.len(),
        stages: out.reports,
        candidates: out.candidates,
        pairs_found,
        pairs_after_gc,
        pairs_after_restriction,
        pairs: top,
    })
}

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
pub(crate) mod testutil {
    /// Deterministic pseudo-random genome (64-bit LCG, high bits pick the base).
    pub fn synthetic_genome(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                b"ACGT"[((state >> 33) % 4) as usize]
            })
            .collect()
    }
}
