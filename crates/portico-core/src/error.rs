//! Error types for the Portico abstractions
//!
//! Collaborators (authentication providers, parse nodes, serialization
//! writers) report failures through [`CoreError`]. The request adapter maps
//! these onto its own error taxonomy.

use thiserror::Error;

/// Error raised by the protocol-agnostic abstractions
#[derive(Error, Debug)]
pub enum CoreError {
    /// A body could not be parsed, or no parser handles its content type
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A value could not be written to an outgoing body
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A caller supplied an unusable value
    #[error("Invalid argument: {param} - {message}")]
    InvalidArgument { param: String, message: String },

    /// The authentication material could not be obtained or attached
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Unsupported feature or operation
    #[error("Unsupported operation: {message}")]
    Unsupported {
        message: String,
        feature: Option<String>,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for results of the abstractions
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn parse(message: impl Into<String>) -> Self {
        CoreError::Parse {
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_argument(param: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Short name of the failure kind, used when an error has to be reported
    /// in place of a value of another type.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Parse { .. } => "ParseError",
            CoreError::Serialization { .. } => "SerializationError",
            CoreError::InvalidArgument { .. } => "InvalidArgumentError",
            CoreError::Authentication { .. } => "AuthenticationError",
            CoreError::Unsupported { .. } => "UnsupportedError",
            CoreError::Internal { .. } => "InternalError",
        }
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<url::ParseError> for CoreError {
    fn from(err: url::ParseError) -> Self {
        CoreError::InvalidArgument {
            param: "url".to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::parse("unexpected token");
        assert_eq!(err.to_string(), "Parse error: unexpected token");

        let err = CoreError::invalid_argument("url_template", "cannot be empty");
        assert_eq!(err.to_string(), "Invalid argument: url_template - cannot be empty");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(CoreError::parse("x").kind(), "ParseError");
        assert_eq!(
            CoreError::Unsupported {
                message: "x".to_string(),
                feature: None
            }
            .kind(),
            "UnsupportedError"
        );
    }

    #[test]
    fn test_from_anyhow() {
        let err: CoreError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, CoreError::Internal { .. }));
        assert!(err.to_string().contains("boom"));
    }
}
