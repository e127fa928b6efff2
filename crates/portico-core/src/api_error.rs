//! Server-signalled failures

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use crate::headers::ResponseHeaders;

/// A typed error produced from an error response body
pub trait DomainError: StdError + Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static);
}

impl<T: StdError + Send + Sync + 'static> DomainError for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }
}

impl dyn DomainError {
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// A non-success response, always carrying the status code and headers
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub response_status_code: u16,
    pub response_headers: ResponseHeaders,
    detail: Option<Box<dyn DomainError>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, response_status_code: u16) -> Self {
        Self {
            message: message.into(),
            response_status_code,
            response_headers: ResponseHeaders::default(),
            detail: None,
        }
    }

    /// Wrap a domain error; its display text becomes the message
    pub fn from_detail(detail: Box<dyn DomainError>, response_status_code: u16) -> Self {
        Self {
            message: detail.to_string(),
            response_status_code,
            response_headers: ResponseHeaders::default(),
            detail: Some(detail),
        }
    }

    pub fn with_headers(mut self, headers: ResponseHeaders) -> Self {
        self.response_headers = headers;
        self
    }

    pub fn with_detail(mut self, detail: Box<dyn DomainError>) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn detail(&self) -> Option<&dyn DomainError> {
        self.detail.as_deref()
    }

    /// The domain error, if it is a `T`
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.detail.as_deref().and_then(|detail| detail.downcast_ref::<T>())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.detail
            .as_deref()
            .map(|detail| detail.as_error() as &(dyn StdError + 'static))
    }
}
