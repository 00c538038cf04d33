//! Error types for the ray caster.

use thiserror::Error;

/// Errors raised while building a scene or rendering it.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed vector, color or scene input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Normalization of a zero-length vector.
    #[error("cannot normalize a zero-length vector")]
    DegenerateVector,

    /// A worker failed while computing its block of rows.
    #[error("render task for rows {first_row}..={last_row} failed: {source}")]
    RenderTask {
        first_row: usize,
        last_row: usize,
        #[source]
        source: Box<Error>,
    },

    /// A worker thread panicked before reporting a result.
    #[error("render worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Result type for ray caster operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shorthand for building a `Validation` error.
pub(crate) fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::Validation(message.into()))
}
