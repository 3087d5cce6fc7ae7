//! Error type shared by the library.
//!
//! Configuration problems are reported before any pipeline stage runs and name
//! the stage and parameter at fault. Per-call failures such as a mismatch search
//! with a query of the wrong length are fatal to that call only.

/// Errors produced by primerscout.
#[derive(thiserror::Error, Debug)]
pub enum PrimerError {
    /// A word handed to the index does not have the index's fixed length.
    #[error("{operation}: query length {actual} does not match indexed word length {expected}")]
    InvalidQueryLength { operation: &'static str, expected: usize, actual: usize },

    /// A configured value is out of range or inconsistent with another one.
    #[error("invalid configuration for {stage}: {parameter} {message}")]
    ConfigurationRange { stage: &'static str, parameter: &'static str, message: String },

    /// The genome input carried no bases.
    #[error("sequence is empty")]
    EmptySequence,

    /// An enzyme name not present in the restriction table.
    #[error("unknown restriction enzyme: {0}")]
    UnknownEnzyme(String),

    /// A recognition pattern with symbols outside the IUPAC nucleotide codes.
    #[error("invalid recognition pattern for {enzyme}: {pattern}")]
    InvalidPattern { enzyme: String, pattern: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Fastx(#[from] needletail::errors::ParseError),

    #[error(transparent)]
    Automaton(#[from] aho_corasick::BuildError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Table(#[from] polars::prelude::PolarsError),
}

impl PrimerError {
    pub(crate) fn range(stage: &'static str, parameter: &'static str, message: impl Into<String>) -> Self {
        PrimerError::ConfigurationRange { stage, parameter, message: message.into() }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PrimerError>;
