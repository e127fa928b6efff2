//! Error types for the request adapter
//!
//! Failures of the abstractions ([`CoreError`]) are sorted into the adapter's
//! taxonomy; server-signalled failures surface as [`Error::Api`].

use portico_core::{ApiError, CoreError};
use thiserror::Error;

/// Main error type for adapter operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required dependency is missing while building the adapter
    #[error("Failed to construct request adapter: {message}")]
    Construction { message: String },

    /// The request information cannot be turned into a request
    #[error("Invalid request: {message}")]
    Argument {
        message: String,
        #[source]
        source: Option<CoreError>,
    },

    /// Unsupported or missing content type, or a malformed body
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<CoreError>,
    },

    /// Network failure reported by the HTTP client
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Non-success response
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The authentication provider failed
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<CoreError>,
    },

    /// Invalid client configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Any other failure of the abstractions
    #[error(transparent)]
    Core(CoreError),
}

/// Convenience type alias for adapter results
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// The server error, if this is one
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Parse { ref message, .. } => Error::Parse {
                message: message.clone(),
                source: Some(err),
            },
            CoreError::InvalidArgument { ref param, ref message } => Error::Argument {
                message: format!("{}: {}", param, message),
                source: Some(err),
            },
            CoreError::Authentication { ref message, .. } => Error::Authentication {
                message: message.clone(),
                source: Some(err),
            },
            other => Error::Core(other),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Core(CoreError::from(err))
    }
}
