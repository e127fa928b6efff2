//! Client and observability configuration

use std::any::Any;
use std::time::Duration;

use portico_core::RequestOption;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration of the default reqwest transport.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            validate_tls: true,
            user_agent: format!("portico/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_connect_timeout_secs(mut self, connect_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self
    }

    pub fn with_validate_tls(mut self, validate_tls: bool) -> Self {
        self.validate_tls = validate_tls;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::Configuration {
                message: "Request timeout cannot be zero".to_string(),
            });
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::Configuration {
                message: "Connect timeout cannot be zero".to_string(),
            });
        }
        if self.timeout_secs < self.connect_timeout_secs {
            return Err(Error::Configuration {
                message: "Request timeout should be >= connect timeout".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::Configuration {
                message: "User agent cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Tracing settings of the adapter; attach to a request to override them
/// for that request only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityOptions {
    /// Recorded as `otel.scope.name` on every operation span
    pub tracer_name: String,
    /// Record the full URL, which may contain end-user identifiable information
    pub include_euii_attributes: bool,
}

impl Default for ObservabilityOptions {
    fn default() -> Self {
        Self {
            tracer_name: "portico-http".to_string(),
            include_euii_attributes: false,
        }
    }
}

impl ObservabilityOptions {
    pub const KEY: &'static str = "ObservabilityOptions";

    pub fn with_euii_attributes(mut self, include: bool) -> Self {
        self.include_euii_attributes = include;
        self
    }
}

impl RequestOption for ObservabilityOptions {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
