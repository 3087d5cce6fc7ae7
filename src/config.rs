//! Run configuration.
//!
//! Settings are plain serde structs read from JSON. Two layouts are accepted:
//! a flat object of settings, or the driver layout
//!
//! ```json
//! { "settings": { "length": 20, "GC_min": 0.4, "GC_max": 0.6, "T_min": 50, "T_max": 65,
//!                 "GC_window": 20 },
//!   "files":    { "SARS": "data/sars_cov_2.fasta" } }
//! ```
//!
//! Every field has a default; unknown keys are ignored. [`Config::validate`] must
//! pass before any pipeline stage runs.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrimerError, Result};
use crate::pair_filter::Ranking;
use crate::sequence::Topology;

/// All recognised options of a primer design run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Primer (and indexed word) length.
    #[serde(alias = "length")]
    pub primer_length: usize,
    /// Lower GC fraction bound for masking windows and pairs.
    #[serde(alias = "GC_min")]
    pub gc_min: f64,
    #[serde(alias = "GC_max")]
    pub gc_max: f64,
    /// Melting temperature window in °C.
    #[serde(alias = "T_min")]
    pub t_min: f64,
    #[serde(alias = "T_max")]
    pub t_max: f64,
    /// Masking window; `primer_length` when unset.
    #[serde(alias = "GC_window")]
    pub gc_window: Option<usize>,
    /// Hamming radius of the similarity filter.
    pub max_mismatches: usize,
    pub min_amplicon: usize,
    pub max_amplicon: usize,
    /// Pair as circular even when the genome itself is linear.
    pub is_circular: bool,
    /// Pairs returned at the end of a run.
    pub top_n_pairs: usize,
    pub ranking: Ranking,
    /// Restriction enzymes to avoid; the whole built-in panel when unset.
    pub enzymes: Option<Vec<String>>,
    /// Worker threads; all logical cores when unset.
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            primer_length: 20,
            gc_min: 0.4,
            gc_max: 0.6,
            t_min: 50.0,
            t_max: 65.0,
            gc_window: None,
            max_mismatches: 2,
            min_amplicon: 300,
            max_amplicon: 1500,
            is_circular: false,
            top_n_pairs: 3,
            ranking: Ranking::Discovery,
            enzymes: None,
            threads: None,
        }
    }
}

/// Settings plus named input files, as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub settings: Config,
    #[serde(default)]
    pub files: BTreeMap<String, PathBuf>,
}

impl ConfigFile {
    /// Parse either the flat or the `settings`/`files` layout.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if value.get("settings").is_some() || value.get("files").is_some() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(ConfigFile { settings: serde_json::from_value(value)?, files: BTreeMap::new() })
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl Config {
    pub fn topology(&self) -> Topology {
        Topology::from_circular(self.is_circular)
    }

    pub fn effective_gc_window(&self) -> usize {
        self.gc_window.unwrap_or(self.primer_length)
    }

    /// Check ranges before any stage runs.
    ///
    /// # Errors
    /// [`PrimerError::ConfigurationRange`] naming the stage and parameter at fault.
    pub fn validate(&self) -> Result<()> {
        if self.primer_length == 0 {
            return Err(PrimerError::range("extraction", "primer_length", "must be at least 1"));
        }
        if self.gc_window == Some(0) {
            return Err(PrimerError::range("masking", "gc_window", "must be at least 1"));
        }
        for (name, v) in [("gc_min", self.gc_min), ("gc_max", self.gc_max)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(PrimerError::range("masking", name, format!("({v}) must lie within [0, 1]")));
            }
        }
        if self.gc_min > self.gc_max {
            return Err(PrimerError::range(
                "masking",
                "gc_min",
                format!("({}) exceeds gc_max ({})", self.gc_min, self.gc_max),
            ));
        }
        for (name, v) in [("t_min", self.t_min), ("t_max", self.t_max)] {
            if !v.is_finite() {
                return Err(PrimerError::range("thermodynamic filter", name, format!("({v}) must be finite")));
            }
        }
        if self.t_min > self.t_max {
            return Err(PrimerError::range(
                "thermodynamic filter",
                "t_min",
                format!("({}) exceeds t_max ({})", self.t_min, self.t_max),
            ));
        }
        if self.min_amplicon > self.max_amplicon {
            return Err(PrimerError::range(
                "pairing",
                "min_amplicon",
                format!("({}) exceeds max_amplicon ({})", self.min_amplicon, self.max_amplicon),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = Config::default();
        c.validate().unwrap();
        assert_eq!(c.effective_gc_window(), 20);
        assert_eq!(c.topology(), Topology::Linear);
    }

    #[test]
    fn inverted_gc_range_names_parameter() {
        let c = Config { gc_min: 0.7, gc_max: 0.3, ..Config::default() };
        match c.validate() {
            Err(PrimerError::ConfigurationRange { stage, parameter, .. }) => {
                assert_eq!(stage, "masking");
                assert_eq!(parameter, "gc_min");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn inverted_amplicon_range_fails() {
        let c = Config { min_amplicon: 2000, max_amplicon: 100, ..Config::default() };
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("pairing") && err.contains("min_amplicon"), "{err}");
    }

    #[test]
    fn other_ranges_fail_fast() {
        assert!(Config { t_min: 70.0, t_max: 60.0, ..Config::default() }.validate().is_err());
        assert!(Config { gc_max: 1.5, ..Config::default() }.validate().is_err());
        assert!(Config { gc_min: f64::NAN, ..Config::default() }.validate().is_err());
        assert!(Config { primer_length: 0, ..Config::default() }.validate().is_err());
        assert!(Config { gc_window: Some(0), ..Config::default() }.validate().is_err());
    }

    #[test]
    fn driver_layout_parses() {
        let text = r#"{
            "settings": {"length": 18, "GC_min": 0.35, "GC_max": 0.65,
                         "T_min": 48, "T_max": 62, "deltaT": 5, "GC_window": 30},
            "files": {"SARS": "data/sars.fasta"}
        }"#;
        let f = ConfigFile::from_json_str(text).unwrap();
        assert_eq!(f.settings.primer_length, 18);
        assert_eq!(f.settings.gc_min, 0.35);
        assert_eq!(f.settings.t_max, 62.0);
        assert_eq!(f.settings.effective_gc_window(), 30);
        // untouched fields keep defaults
        assert_eq!(f.settings.max_mismatches, 2);
        assert_eq!(f.files["SARS"], PathBuf::from("data/sars.fasta"));
    }

    #[test]
    fn flat_layout_parses() {
        let text = r#"{"primer_length": 22, "is_circular": true, "ranking": "tm_balance",
                       "enzymes": ["EcoRI", "BamHI"], "top_n_pairs": 5}"#;
        let f = ConfigFile::from_json_str(text).unwrap();
        assert_eq!(f.settings.primer_length, 22);
        assert!(f.settings.is_circular);
        assert_eq!(f.settings.ranking, Ranking::TmBalance);
        assert_eq!(f.settings.enzymes.as_deref(), Some(&["EcoRI".to_string(), "BamHI".to_string()][..]));
        assert!(f.files.is_empty());
    }
}
