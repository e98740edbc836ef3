//! Error types for hdclassify.
//!
//! Errors fall into two families:
//! - **configuration** errors (bad model parameters, mismatched shapes) are
//!   raised before any computation starts;
//! - **data** errors (a label or level outside its range) carry the offending
//!   row so the caller can locate it.

use std::path::PathBuf;
use thiserror::Error;

/// hdclassify error types.
#[derive(Error, Debug)]
pub enum HdcError {
    /// Invalid construction parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Hypervector or row width does not match the model
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Encoded matrix and label slice disagree on the number of samples
    #[error("Shape mismatch: {samples} samples but {labels} labels")]
    ShapeMismatch { samples: usize, labels: usize },

    /// Class label outside `[0, n_class)`
    #[error("Label {label} at row {row} is outside [0, {n_class})")]
    LabelOutOfRange {
        row: usize,
        label: usize,
        n_class: usize,
    },

    /// Feature level outside `[0, n_lv)`
    #[error("Level {level} at row {row}, column {column} is outside [0, {n_lv})")]
    LevelOutOfRange {
        row: usize,
        column: usize,
        level: u32,
        n_lv: usize,
    },

    /// NaN or infinite raw feature value
    #[error("Non-finite value at row {row}, column {column}")]
    NonFiniteValue { row: usize, column: usize },

    /// Empty input where non-empty was required
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Malformed dump file
    #[error("Parse error in {}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HdcError {
    /// True for errors describing an invalid model or call shape.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HdcError::InvalidConfig(_)
                | HdcError::DimensionMismatch { .. }
                | HdcError::ShapeMismatch { .. }
        )
    }

    /// True for errors pointing at a specific bad input row or line.
    pub fn is_data(&self) -> bool {
        matches!(
            self,
            HdcError::LabelOutOfRange { .. }
                | HdcError::LevelOutOfRange { .. }
                | HdcError::NonFiniteValue { .. }
                | HdcError::Parse { .. }
        )
    }
}

/// Result type alias for hdclassify operations.
pub type Result<T> = std::result::Result<T, HdcError>;
