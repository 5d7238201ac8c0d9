//src/error.rs

use thiserror::Error;

/// Errors raised while loading the taxonomy or summarising reads.
#[derive(Error, Debug)]
pub enum TaxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Taxon {0} appears more than once in the node table")]
    DuplicateTaxon(String),

    #[error("Taxon {0} has more than one scientific name")]
    DuplicateName(String),

    #[error("Taxon {0} is not present in the taxonomy")]
    UnknownTaxon(String),

    #[error("Cycle detected in taxonomy while resolving {start} (gave up after {steps} steps)")]
    CyclicTaxonomy { start: String, steps: usize },

    #[error("No scientific name for taxon {0}")]
    MissingName(String),

    #[error("Could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, TaxError>;

impl TaxError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        TaxError::Parse {
            line,
            message: message.into(),
        }
    }
}
