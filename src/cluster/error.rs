use thiserror::Error;

/// Errors returned while loading points or clustering them
#[derive(Debug, Error)]
pub enum Error {
    /// A point has a NaN or infinite coordinate
    #[error("invalid coordinate at index {index}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// Epsilon is negative or not finite
    #[error("invalid epsilon {0}: must be a finite, non-negative number")]
    InvalidEpsilon(f64),

    /// An input row could not be turned into a point
    #[error("invalid record on line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_record(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }
}

/// Result type used by this crate
pub type Result<T> = std::result::Result<T, Error>;
