use std::fmt;
use thiserror::Error;

use crate::models::Record;

/// Positional columns of an interval row that are type checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Time,
    Duration,
    Activity,
    Category,
    Productivity,
}

impl RowField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowField::Time => "time",
            RowField::Duration => "duration",
            RowField::Activity => "activity",
            RowField::Category => "category",
            RowField::Productivity => "productivity",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            RowField::Time => 0,
            RowField::Duration => 1,
            RowField::Activity => 3,
            RowField::Category => 4,
            RowField::Productivity => 5,
        }
    }
}

impl fmt::Display for RowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("client error: {0}")]
    Client(String),

    #[error("bad request, HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("row {row}: record length wrong, expected 6 fields, found {found}")]
    RowLength { row: usize, found: usize },

    #[error("row {row}: parsing {field} wrong: found {found}")]
    Field {
        row: usize,
        field: RowField,
        found: String,
    },

    #[error("row {row}: parsing time wrong: {value:?}: {source}")]
    Time {
        row: usize,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl FetchError {
    /// Row index the failure refers to, if it came from row conversion.
    pub fn row(&self) -> Option<usize> {
        match self {
            FetchError::RowLength { row, .. }
            | FetchError::Field { row, .. }
            | FetchError::Time { row, .. } => Some(*row),
            _ => None,
        }
    }
}

/// A failed retrieval together with the records converted before it.
///
/// A non-empty `partial` does not mean the day is complete; it only holds
/// the rows that preceded the failing one.
#[derive(Debug)]
pub struct RetrieveError {
    pub error: FetchError,
    pub partial: Vec<Record>,
}

impl fmt::Display for RetrieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

// Reports the inner error's cause, not the inner error, so a chain printer
// does not show the same message twice.
impl std::error::Error for RetrieveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl RetrieveError {
    pub fn new(error: FetchError, partial: Vec<Record>) -> Self {
        Self { error, partial }
    }

    pub fn into_parts(self) -> (FetchError, Vec<Record>) {
        (self.error, self.partial)
    }
}

impl From<FetchError> for RetrieveError {
    fn from(error: FetchError) -> Self {
        Self::new(error, Vec::new())
    }
}

impl From<reqwest::Error> for RetrieveError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::from(e).into()
    }
}

impl From<serde_json::Error> for RetrieveError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::from(e).into()
    }
}
