//! Genome loading for **FASTA / FASTQ**, plain or gzip-compressed.
//!
//! ### Design
//! - Records are parsed with `needletail`, which sniffs the format and the
//!   compression from the file contents.
//! - A genome is one record. When a file holds several, the first is used and
//!   the rest are reported with a warning.
//!
//! ### Example
//! ```no_run
//! use primerscout::{seqio, sequence::Topology};
//! let genome = seqio::load_genome("sars_cov_2.fasta", Topology::Circular).unwrap();
//! println!("{} bp", primerscout::sequence::SequenceProvider::length(&genome));
//! ```
use std::path::Path;

use needletail::parse_fastx_file;

use crate::error::{PrimerError, Result};
use crate::sequence::{Genome, Topology};

/// Input format guessed from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Fasta,
    Fastq,
}

impl InputFormat {
    /// Guess from the extension, looking through a trailing `.gz`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let name = path.as_ref().to_string_lossy().to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".fq") || name.ends_with(".fastq") {
            InputFormat::Fastq
        } else {
            InputFormat::Fasta
        }
    }
}

/// One parsed record.
#[derive(Debug, Clone)]
pub struct SeqRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// Every record in `path`, in file order.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<SeqRecord>> {
    let mut reader = parse_fastx_file(path.as_ref())?;
    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let rec = record?;
        let id = String::from_utf8_lossy(rec.id()).to_string();
        records.push(SeqRecord { id, seq: rec.seq().to_vec() });
    }
    Ok(records)
}

/// Load the first record of `path` as a genome.
///
/// # Errors
/// IO and parse failures, or [`PrimerError::EmptySequence`] when the file
/// has no records or the first one has no bases.
pub fn load_genome<P: AsRef<Path>>(path: P, topology: Topology) -> Result<Genome> {
    let path = path.as_ref();
    let mut records = read_records(path)?;
    if records.is_empty() {
        return Err(PrimerError::EmptySequence);
    }
    if records.len() > 1 {
        log::warn!(
            "{}: {} records found, using the first ({})",
            path.display(),
            records.len(),
            records[0].id
        );
    }
    let first = records.swap_remove(0);
    log::info!(
        "loaded {} ({:?}, {} bp, {})",
        first.id,
        InputFormat::from_path(path),
        first.seq.len(),
        topology
    );
    Genome::new(first.id, &first.seq, topology)
}
