//! Error types.
//!
//! Two layers:
//! - [`Error`]: run-level failures. The input cannot be obtained at all,
//!   the configuration or the built models are unusable, or the engine
//!   broke its own capacity invariant.
//! - [`ParseError`]: per-record failures. These never abort a run; the
//!   offending record is skipped and reported as a [`SkippedRecord`].

use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationError;

/// Run-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that stop an allocation run.
#[derive(Error, Debug)]
pub enum Error {
    /// The record source could not be read or decoded.
    #[error("source '{source_name}' is unreadable: {reason}")]
    SourceUnreadable { source_name: String, reason: String },
    /// A source produced no usable records.
    #[error("no usable {0} records")]
    EmptyInput(&'static str),
    /// A commit targeted a full group. Indicates an engine bug.
    #[error("session '{session_id}' is already at capacity {capacity}")]
    CapacityExceeded { session_id: String, capacity: u32 },
    /// Run parameters were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Built models failed structural validation.
    #[error("input failed validation: {}", join_messages(.0))]
    InvalidInput(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a single input record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("week specification yields no weeks")]
    EmptyWeeks,
    #[error("unrecognised week specification '{0}'")]
    InvalidWeeks(String),
    #[error("unrecognised weekday '{0}'")]
    InvalidWeekday(String),
    #[error("unrecognised period specification '{0}'")]
    InvalidPeriod(String),
    #[error("period range {start}-{end} is inverted")]
    InvertedPeriod { start: u32, end: u32 },
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("field '{0}' must be positive")]
    NonPositive(&'static str),
    #[error("duplicate id '{0}'")]
    DuplicateId(String),
}

/// A record dropped during ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// 1-based row number within its source.
    pub row: usize,
    /// Rejection cause.
    pub reason: ParseError,
}

impl SkippedRecord {
    pub fn new(row: usize, reason: ParseError) -> Self {
        Self { row, reason }
    }
}
