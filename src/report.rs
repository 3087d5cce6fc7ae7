//! Rendering of candidates, pairs and stage summaries.
//!
//! Rows are plain serde structs. The same rows feed a polars `DataFrame` for
//! terminal display, a CSV writer and JSON output.
use std::io::Write;

use polars::prelude::*;
use serde::Serialize;

use crate::biochem::BiochemistryPredicates;
use crate::error::Result;
use crate::filter::{Candidates, StageReport};
use crate::pairing::PrimerPair;
use crate::restriction::Enzyme;

/// One reported primer pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PairRow {
    pub rank: u64,
    pub forward: String,
    pub forward_start: u64,
    pub forward_tm: Option<f64>,
    pub reverse: String,
    pub reverse_start: u64,
    pub reverse_tm: Option<f64>,
    pub amplicon_length: u64,
    pub amplicon_gc: Option<f64>,
}

/// One surviving candidate primer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateRow {
    pub strand: String,
    pub offset: u64,
    pub genomic_start: u64,
    pub sequence: String,
    pub tm: Option<f64>,
    pub gc: Option<f64>,
}

pub fn pair_rows(pairs: &[PrimerPair], predicates: &dyn BiochemistryPredicates) -> Vec<PairRow> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, p)| PairRow {
            rank: i as u64 + 1,
            forward: p.forward.sequence.clone(),
            forward_start: p.forward_start as u64,
            forward_tm: predicates.melting_temp(p.forward.as_bytes()),
            reverse: p.reverse.sequence.clone(),
            reverse_start: p.reverse_start as u64,
            reverse_tm: predicates.melting_temp(p.reverse.as_bytes()),
            amplicon_length: p.amplicon_length as u64,
            amplicon_gc: predicates.gc_fraction(p.amplicon.as_bytes()),
        })
        .collect()
}

pub fn candidate_rows(
    candidates: &Candidates,
    genome_len: usize,
    predicates: &dyn BiochemistryPredicates,
) -> Vec<CandidateRow> {
    candidates
        .iter()
        .map(|p| CandidateRow {
            strand: p.strand.to_string(),
            offset: p.offset as u64,
            genomic_start: p.genomic_start(genome_len) as u64,
            sequence: p.sequence.clone(),
            tm: predicates.melting_temp(p.as_bytes()),
            gc: predicates.gc_fraction(p.as_bytes()),
        })
        .collect()
}

pub fn pairs_frame(rows: &[PairRow]) -> Result<DataFrame> {
    let df = df!(
        "rank" => rows.iter().map(|r| r.rank).collect::<Vec<_>>(),
        "forward" => rows.iter().map(|r| r.forward.clone()).collect::<Vec<_>>(),
        "fwd_start" => rows.iter().map(|r| r.forward_start).collect::<Vec<_>>(),
        "fwd_tm" => rows.iter().map(|r| r.forward_tm).collect::<Vec<_>>(),
        "reverse" => rows.iter().map(|r| r.reverse.clone()).collect::<Vec<_>>(),
        "rev_start" => rows.iter().map(|r| r.reverse_start).collect::<Vec<_>>(),
        "rev_tm" => rows.iter().map(|r| r.reverse_tm).collect::<Vec<_>>(),
        "amplicon" => rows.iter().map(|r| r.amplicon_length).collect::<Vec<_>>(),
        "amplicon_gc" => rows.iter().map(|r| r.amplicon_gc).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn candidates_frame(rows: &[CandidateRow]) -> Result<DataFrame> {
    let df = df!(
        "strand" => rows.iter().map(|r| r.strand.clone()).collect::<Vec<_>>(),
        "offset" => rows.iter().map(|r| r.offset).collect::<Vec<_>>(),
        "genomic_start" => rows.iter().map(|r| r.genomic_start).collect::<Vec<_>>(),
        "sequence" => rows.iter().map(|r| r.sequence.clone()).collect::<Vec<_>>(),
        "tm" => rows.iter().map(|r| r.tm).collect::<Vec<_>>(),
        "gc" => rows.iter().map(|r| r.gc).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn stages_frame(reports: &[StageReport]) -> Result<DataFrame> {
    let df = df!(
        "stage" => reports.iter().map(|r| r.stage.to_string()).collect::<Vec<_>>(),
        "forward_in" => reports.iter().map(|r| r.forward_in as u64).collect::<Vec<_>>(),
        "forward_out" => reports.iter().map(|r| r.forward_out as u64).collect::<Vec<_>>(),
        "reverse_in" => reports.iter().map(|r| r.reverse_in as u64).collect::<Vec<_>>(),
        "reverse_out" => reports.iter().map(|r| r.reverse_out as u64).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

pub fn enzymes_frame(enzymes: &[Enzyme]) -> Result<DataFrame> {
    let df = df!(
        "enzyme" => enzymes.iter().map(|e| e.name.to_string()).collect::<Vec<_>>(),
        "site" => enzymes.iter().map(|e| e.site.to_string()).collect::<Vec<_>>(),
        "length" => enzymes.iter().map(|e| e.site.len() as u64).collect::<Vec<_>>(),
    )?;
    Ok(df)
}

/// Let polars print every row and column untruncated.
pub fn configure_table_display() {
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_MAX_COLS", "100000");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
    std::env::set_var("POLARS_FMT_STR_LEN", "100000");
    std::env::set_var("POLARS_TABLE_WIDTH", "65535");
}

/// Write `rows` as CSV with a header line.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    for row in rows {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biochem::StandardPredicates;
    use crate::sequence::{Primer, StrandKind};

    fn pairs() -> Vec<PrimerPair> {
        vec![PrimerPair {
            forward: Primer::new("ACGTACGTACGTACGTACGT", StrandKind::Forward, 5),
            reverse: Primer::new("TTGCATGCATGCATGCATGC", StrandKind::Reverse, 40),
            forward_start: 5,
            reverse_start: 90,
            amplicon_length: 105,
            amplicon: "ACGT".repeat(26) + "A",
        }]
    }

    #[test]
    fn pair_rows_carry_biochemistry() {
        let rows = pair_rows(&pairs(), &StandardPredicates);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].reverse_start, 90);
        assert!(rows[0].forward_tm.is_some());
        let df = pairs_frame(&rows).unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 9);
        assert!(df.column("amplicon").is_ok());
    }

    #[test]
    fn csv_has_header_and_row() {
        let rows = pair_rows(&pairs(), &StandardPredicates);
        let mut out = Vec::new();
        write_csv(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("rank,forward,forward_start"));
        assert!(lines.next().unwrap().starts_with("1,ACGTACGTACGTACGTACGT,5,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn json_is_parseable() {
        let rows = pair_rows(&pairs(), &StandardPredicates);
        let mut out = Vec::new();
        write_json(&mut out, &rows).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v[0]["amplicon_length"], 105);
        assert_eq!(v[0]["reverse"], "TTGCATGCATGCATGCATGC");
    }

    #[test]
    fn enzyme_table_lists_panel() {
        let df = enzymes_frame(crate::data::enzymes::PANEL).unwrap();
        assert_eq!(df.height(), crate::data::enzymes::PANEL.len());
    }
}
