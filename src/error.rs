//! Errors raised while parsing and normalizing complaint data.

use thiserror::Error;

/// Failures that make a loaded dataset unusable.
///
/// Every variant is fatal for the current load attempt: the dashboard is
/// never built from a partially-understood file.
#[derive(Debug, Error)]
pub enum DataError {
    /// The CSV header row lacks one or more required columns.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A timestamp cell could not be parsed.
    #[error("record {unique_key}: cannot parse {column} value {value:?}")]
    InvalidTimestamp {
        unique_key: String,
        column: &'static str,
        value: String,
    },

    /// A required cell was empty.
    #[error("record {unique_key}: {column} is empty")]
    EmptyField {
        unique_key: String,
        column: &'static str,
    },

    /// A pre-computed derived column carried a value outside its domain.
    #[error("record {unique_key}: invalid {column} value {value:?}")]
    InvalidDerived {
        unique_key: String,
        column: &'static str,
        value: String,
    },

    /// A selector string could not be understood.
    #[error("invalid {selector} selector {value:?}")]
    InvalidSelector {
        selector: &'static str,
        value: String,
    },

    /// The CSV itself was malformed.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Reading or decompressing the input failed.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}
