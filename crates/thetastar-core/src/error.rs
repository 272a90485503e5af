//! Error types for theta-star.

use std::path::PathBuf;

use thiserror::Error;

/// theta-star error type
#[derive(Error, Debug)]
pub enum Error {
    /// Requested ansatz is not registered.
    #[error("Unknown ansatz '{name}'. Known: {known}")]
    UnknownAnsatz { name: String, known: String },

    /// Mass-ordering token is neither NO nor IO.
    #[error("Unknown PMNS ordering '{0}' (expected NO or IO)")]
    InvalidOrdering(String),

    /// Sweep finished without a best sample.
    #[error("Sweep produced no samples (n_samples = {n_samples})")]
    EmptySweep { n_samples: usize },

    /// Results table lacks a column the caller needs.
    #[error("Column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// Sampling bound with low > high or a non-finite endpoint.
    #[error("Invalid bound for '{param}': [{low}, {high}]")]
    InvalidBounds { param: String, low: f64, high: f64 },

    /// Two sampling bounds share a parameter name.
    #[error("Duplicate parameter '{0}'")]
    DuplicateParam(String),

    /// Target catalog violates its invariants.
    #[error("Invalid target catalog: {0}")]
    InvalidCatalog(String),

    /// A chi2 cut removed every sample of a run.
    #[error("No samples with chi2_total <= {cut} in run '{run_id}' (chi2_min = {chi2_min:.3})")]
    NoSamplesSelected {
        run_id: String,
        cut: f64,
        chi2_min: f64,
    },

    /// Malformed results table.
    #[error("{}:{line}: {message}", path.display())]
    Table {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Statistics routine rejected its input.
    #[error("Statistics error: {0}")]
    Stats(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
