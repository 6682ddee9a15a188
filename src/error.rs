//! Error types
//!
//! Every failure a poll cycle can hit collapses into [`CycleError`], which the
//! poller logs and drops.

use thiserror::Error;

/// Errors raised while fetching a reading batch
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never produced a response (connection refused, DNS, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status
    #[error("Endpoint returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not a JSON array of readings
    #[error("Decode error: {0}")]
    Decode(String),

    /// The source could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Errors raised while writing to the page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    /// A required element is absent from the page
    #[error("Missing element: #{0}")]
    MissingElement(String),

    /// The host refused the write
    #[error("Page write failed: {0}")]
    Write(String),
}

/// Errors raised by the renderer and its surface
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Chart is not initialized")]
    NotInitialized,

    #[error("Chart is already initialized")]
    AlreadyInitialized,

    /// The drawing surface could not be bound or drawn on
    #[error("Surface error: {0}")]
    Surface(String),
}

/// A failed fetch-transform-render cycle
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Fetch failed: {0}")]
    Source(#[from] SourceError),

    #[error("Page update failed: {0}")]
    Page(#[from] PageError),

    #[error("Chart update failed: {0}")]
    Chart(#[from] ChartError),
}

/// Result type alias for cycle operations
pub type CycleResult<T> = Result<T, CycleError>;
