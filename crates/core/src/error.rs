use std::io;
use thiserror::Error;

/// Failures the core reports to its callers.
///
/// Normalization never fails and refresh failures are never reported, so
/// neither has a variant here.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The backing file is missing, unreadable or holds no records.
    #[error("Trending data not available: {0}")]
    DataUnavailable(String),

    /// A required request parameter is missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    /// An external collaborator (scraper or ingestor) failed.
    #[error("{0}")]
    Collaborator(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
