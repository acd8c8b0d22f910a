//! Error types for result ingestion and chart building.
//!
//! Faults are isolated to the smallest unit they affect: a [`RowError`] drops one
//! row, an [`InsufficientData`] skips one chart family, and only
//! [`AnalysisError::MissingInput`] stops the pipeline.

use crate::chart::ChartFamily;
use thiserror::Error;

/// Why a single result row was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing mandatory field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' has non-numeric value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("field '{field}' must be non-negative, got {value}")]
    Negative { field: &'static str, value: String },

    #[error("field '{field}' must be positive, got {value}")]
    NotPositive { field: &'static str, value: String },

    #[error("unrecognized allocation mode '{0}'")]
    UnknownMode(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}

/// A dropped row together with where it came from.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{file}:{line}: {cause}")]
pub struct MalformedRow {
    pub file: String,
    pub line: u64,
    pub cause: RowError,
}

/// A chart family had nothing to draw.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("not enough data for {family} chart: {reason}")]
pub struct InsufficientData {
    pub family: ChartFamily,
    pub reason: String,
}

impl InsufficientData {
    pub fn new(family: ChartFamily, reason: impl Into<String>) -> Self {
        Self {
            family,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No usable input: {0}")]
    MissingInput(String),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
