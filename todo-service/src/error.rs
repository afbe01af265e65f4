//! Service-level error type

use thiserror::Error;

use crate::repository::RepositoryError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Service-level error
///
/// Covers start-up and plumbing failures (configuration, binding, I/O).
/// Resource operations report [`RepositoryError`]s, which handlers turn into
/// `ApiError`s.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Storage error surfaced outside a resource operation
    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(Box<axum::http::Error>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Configuration error from a plain message
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(Box::new(figment::Error::from(message.into())))
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<axum::http::Error> for Error {
    fn from(err: axum::http::Error) -> Self {
        Error::Http(Box::new(err))
    }
}
