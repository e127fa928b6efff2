//! Status code to error factory table
//!
//! Generated code registers one factory per documented error status. Lookup
//! tries the exact status code, then the status class (`4XX`, `5XX`), then
//! the catch-all `XXX`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::api_error::DomainError;
use crate::serialization::{Parsable, ParseNode, ParseNodeExt};
use crate::{CoreError, Result};

/// Key of an [`ErrorMap`] entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKey {
    Status(u16),
    /// `4XX`
    ClientErrors,
    /// `5XX`
    ServerErrors,
    /// `XXX`
    Any,
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Status(code) => write!(f, "{}", code),
            ErrorKey::ClientErrors => write!(f, "4XX"),
            ErrorKey::ServerErrors => write!(f, "5XX"),
            ErrorKey::Any => write!(f, "XXX"),
        }
    }
}

impl FromStr for ErrorKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "4XX" => Ok(ErrorKey::ClientErrors),
            "5XX" => Ok(ErrorKey::ServerErrors),
            "XXX" => Ok(ErrorKey::Any),
            code => code
                .parse::<u16>()
                .ok()
                .filter(|code| (100..=599).contains(code))
                .map(ErrorKey::Status)
                .ok_or_else(|| {
                    CoreError::invalid_argument("error_key", format!("Invalid error map key: {}", s))
                }),
        }
    }
}

impl From<u16> for ErrorKey {
    fn from(code: u16) -> Self {
        ErrorKey::Status(code)
    }
}

/// What an error factory produced from a body
#[derive(Debug)]
pub enum ErrorValue {
    /// A domain error, raised as is
    Api(Box<dyn DomainError>),
    /// Something that is not an error type
    Unexpected { type_name: String },
}

/// Builds an error value from the root parse node of an error response
pub type ErrorFactory = Arc<dyn Fn(&dyn ParseNode) -> Result<ErrorValue> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ErrorMap {
    entries: HashMap<ErrorKey, ErrorFactory>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ErrorKey>, factory: ErrorFactory) {
        self.entries.insert(key.into(), factory);
    }

    pub fn with_factory(mut self, key: impl Into<ErrorKey>, factory: ErrorFactory) -> Self {
        self.insert(key, factory);
        self
    }

    /// Register the domain error type `T` for `key`
    pub fn with_error<T>(self, key: impl Into<ErrorKey>) -> Self
    where
        T: Parsable + std::error::Error + 'static,
    {
        let factory: ErrorFactory = Arc::new(|node: &dyn ParseNode| {
            Ok(match node.get_object_value::<T>()? {
                Some(error) => ErrorValue::Api(Box::new(error)),
                None => ErrorValue::Unexpected {
                    type_name: "null".to_string(),
                },
            })
        });
        self.with_factory(key, factory)
    }

    pub fn get(&self, key: &ErrorKey) -> Option<&ErrorFactory> {
        self.entries.get(key)
    }

    /// The factory responsible for `status`, most specific entry first
    pub fn resolve(&self, status: u16) -> Option<&ErrorFactory> {
        let class = match status {
            400..=499 => Some(ErrorKey::ClientErrors),
            500..=599 => Some(ErrorKey::ServerErrors),
            _ => None,
        };
        self.entries
            .get(&ErrorKey::Status(status))
            .or_else(|| class.and_then(|class| self.entries.get(&class)))
            .or_else(|| self.entries.get(&ErrorKey::Any))
    }

    pub fn contains_key(&self, key: &ErrorKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.entries.keys().map(|k| k.to_string()).collect();
        keys.sort();
        f.debug_struct("ErrorMap").field("keys", &keys).finish()
    }
}
