//! Client setup errors.

use thiserror::Error;

/// Errors raised while building a [`PostgrestBackend`](crate::PostgrestBackend).
///
/// Failures of individual calls are reported as
/// [`BackendError`](lendbook_store::BackendError) instead.
#[derive(Error, Debug)]
pub enum PostgrestError {
    /// The connection settings are incomplete or malformed.
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    /// A credential could not be used as a header value.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
