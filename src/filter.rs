//! Candidate primer filtering.
//!
//! The pipeline narrows "every length-L window of both strands" down to primers
//! that are biochemically and genomically admissible:
//!
//! 1. GC masking of both strands ([`WindowMasker`]).
//! 2. Extraction of every window, dropping those touching a masked or unknown base.
//! 3. GC clamp and melting temperature ([`ThermoFilter`]).
//! 4. Genome uniqueness via the index count ([`UniquenessFilter`]).
//! 5. Low complexity ([`ComplexityFilter`]).
//! 6. Mutual similarity via bounded Hamming search ([`SimilarityFilter`]).
//!
//! Stages 3 to 6 are [`Stage`] objects. Each one sees the forward and reverse
//! lists independently and returns a subsequence of its input, so stages can be
//! reordered or tested in isolation. Stage predicates run on the rayon pool; the
//! index is only read while they do.
use rayon::prelude::*;
use serde::Serialize;

use crate::biochem::BiochemistryPredicates;
use crate::config::Config;
use crate::index::PrimerIndex;
use crate::mask::{MaskedStrand, WindowMasker};
use crate::sequence::{is_primer_base, Primer, SequenceProvider, Strand};

/// Forward and reverse candidates, kept apart through every stage.
#[derive(Clone, Debug, Default)]
pub struct Candidates {
    pub forward: Vec<Primer>,
    pub reverse: Vec<Primer>,
}

impl Candidates {
    pub fn len(&self) -> usize {
        self.forward.len() + self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse.is_empty()
    }

    /// Forward then reverse candidates.
    pub fn iter(&self) -> impl Iterator<Item = &Primer> {
        self.forward.iter().chain(self.reverse.iter())
    }
}

/// Survivor counts of one stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    pub forward_in: usize,
    pub forward_out: usize,
    pub reverse_in: usize,
    pub reverse_out: usize,
}

impl StageReport {
    fn log(&self) {
        log::info!(
            "{}: forward {} -> {}, reverse {} -> {}",
            self.stage,
            self.forward_in,
            self.forward_out,
            self.reverse_in,
            self.reverse_out
        );
        if self.forward_out + self.reverse_out == 0 {
            log::info!("{}: no candidates left", self.stage);
        }
    }
}

/// One filtering step over a candidate list.
pub trait Stage: Sync {
    fn name(&self) -> &'static str;

    /// `true` to keep the primer. Anything that cannot be evaluated is dropped.
    fn keep(&self, primer: &Primer) -> bool;

    /// Order-preserving filter of `primers`.
    fn apply(&self, primers: Vec<Primer>) -> Vec<Primer> {
        primers.into_par_iter().filter(|p| self.keep(p)).collect()
    }

    /// Apply to both strands' lists and report the counts.
    fn run(&self, input: Candidates) -> (Candidates, StageReport) {
        let (forward_in, reverse_in) = (input.forward.len(), input.reverse.len());
        let out = Candidates { forward: self.apply(input.forward), reverse: self.apply(input.reverse) };
        let report = StageReport {
            stage: self.name(),
            forward_in,
            forward_out: out.forward.len(),
            reverse_in,
            reverse_out: out.reverse.len(),
        };
        (out, report)
    }
}

/// Stage 3: GC clamp and melting temperature window.
pub struct ThermoFilter<'a> {
    pub predicates: &'a dyn BiochemistryPredicates,
    pub t_min: f64,
    pub t_max: f64,
}

impl Stage for ThermoFilter<'_> {
    fn name(&self) -> &'static str {
        "gc clamp / melting temperature"
    }

    fn keep(&self, primer: &Primer) -> bool {
        let p = primer.as_bytes();
        self.predicates.gc_clamp_ok(p) && self.predicates.melting_temp_in_range(p, self.t_min, self.t_max)
    }
}

/// Stage 4: drop primers occurring more than once across both strands.
pub struct UniquenessFilter<'a> {
    pub index: &'a PrimerIndex,
}

impl Stage for UniquenessFilter<'_> {
    fn name(&self) -> &'static str {
        "uniqueness"
    }

    fn keep(&self, primer: &Primer) -> bool {
        self.index.count(primer.as_bytes()) <= 1
    }
}

/// Stage 5: drop homopolymers and short tandem repeats.
pub struct ComplexityFilter<'a> {
    pub predicates: &'a dyn BiochemistryPredicates,
}

impl Stage for ComplexityFilter<'_> {
    fn name(&self) -> &'static str {
        "low complexity"
    }

    fn keep(&self, primer: &Primer) -> bool {
        !self.predicates.is_low_complexity(primer.as_bytes())
    }
}

/// Stage 6: drop primers with another indexed word within `max_mismatches`.
pub struct SimilarityFilter<'a> {
    pub index: &'a PrimerIndex,
    pub max_mismatches: usize,
}

impl Stage for SimilarityFilter<'_> {
    fn name(&self) -> &'static str {
        "similarity"
    }

    fn keep(&self, primer: &Primer) -> bool {
        matches!(self.index.has_similar(primer.as_bytes(), self.max_mismatches), Ok(false))
    }
}

/// Stage 2: every window of `len` on a (masked) strand made only of `ACGT`.
pub fn extract_candidates(strand: &Strand, len: usize) -> Vec<Primer> {
    strand
        .windows(len)
        .filter(|(_, w)| w.iter().all(|&b| is_primer_base(b)))
        .map(|(i, w)| Primer::new(String::from_utf8_lossy(w).into_owned(), strand.kind(), i))
        .collect()
}

/// Output of a pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub candidates: Candidates,
    pub reports: Vec<StageReport>,
    pub masked_forward: MaskedStrand,
    pub masked_reverse: MaskedStrand,
}

/// Chains masking, extraction and the filter stages.
pub struct FilterPipeline<'a> {
    config: &'a Config,
    predicates: &'a dyn BiochemistryPredicates,
    index: &'a PrimerIndex,
}

impl<'a> FilterPipeline<'a> {
    /// `index` must already hold every window of the unmasked strands.
    pub fn new(config: &'a Config, predicates: &'a dyn BiochemistryPredicates, index: &'a PrimerIndex) -> Self {
        FilterPipeline { config, predicates, index }
    }

    pub fn masker(&self) -> WindowMasker {
        WindowMasker::new(self.config.effective_gc_window(), self.config.gc_min, self.config.gc_max)
    }

    /// Stages 3 to 6 in run order.
    pub fn stages(&self) -> Vec<Box<dyn Stage + 'a>> {
        vec![
            Box::new(ThermoFilter { predicates: self.predicates, t_min: self.config.t_min, t_max: self.config.t_max }),
            Box::new(UniquenessFilter { index: self.index }),
            Box::new(ComplexityFilter { predicates: self.predicates }),
            Box::new(SimilarityFilter { index: self.index, max_mismatches: self.config.max_mismatches }),
        ]
    }

    pub fn run<P: SequenceProvider + ?Sized>(&self, genome: &P) -> PipelineOutput {
        let len = self.config.primer_length;
        let masker = self.masker();
        let masked_forward = masker.mask(genome.forward_strand(), self.predicates);
        let masked_reverse = masker.mask(genome.reverse_strand(), self.predicates);
        log::debug!(
            "masking: {} forward and {} reverse windows of {} masked",
            masked_forward.masked_windows.len(),
            masked_reverse.masked_windows.len(),
            masker.window
        );

        let offsets = |s: &Strand| (s.len() + 1).saturating_sub(len);
        let mut candidates = Candidates {
            forward: extract_candidates(&masked_forward.strand, len),
            reverse: extract_candidates(&masked_reverse.strand, len),
        };
        let extraction = StageReport {
            stage: "extraction",
            forward_in: offsets(genome.forward_strand()),
            forward_out: candidates.forward.len(),
            reverse_in: offsets(genome.reverse_strand()),
            reverse_out: candidates.reverse.len(),
        };
        extraction.log();
        let mut reports = vec![extraction];

        for stage in self.stages() {
            let (next, report) = stage.run(candidates);
            report.log();
            reports.push(report);
            candidates = next;
        }

        PipelineOutput { candidates, reports, masked_forward, masked_reverse }
    }
}
