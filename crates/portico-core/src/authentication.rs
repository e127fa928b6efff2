//! Authentication providers
//!
//! A provider attaches auth material to a [`RequestInformation`] before it is
//! sent. Supported schemes:
//! - Anonymous (nothing attached)
//! - Bearer tokens obtained from an [`AccessTokenProvider`], with claims
//!   challenge support
//! - API keys in a header or query parameter

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use url::Url;

use crate::request_information::RequestInformation;
use crate::{CoreError, Result};

/// Context key carrying the claims of a claims challenge
pub const CLAIMS_KEY: &str = "claims";

const AUTHORIZATION_HEADER: &str = "Authorization";

/// Attaches authentication material to outgoing requests
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    async fn authenticate_request(
        &self,
        request: &mut RequestInformation,
        additional_context: &HashMap<String, String>,
    ) -> Result<()>;
}

/// Sends requests without credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousAuthenticationProvider;

#[async_trait]
impl AuthenticationProvider for AnonymousAuthenticationProvider {
    async fn authenticate_request(
        &self,
        _request: &mut RequestInformation,
        _additional_context: &HashMap<String, String>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Restricts the hosts a credential may be sent to.
/// An empty validator accepts every host.
#[derive(Debug, Default, Clone)]
pub struct AllowedHostsValidator {
    allowed_hosts: HashSet<String>,
}

impl AllowedHostsValidator {
    pub fn new<I, S>(hosts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed_hosts = HashSet::new();
        for host in hosts {
            let host = host.into().trim().to_ascii_lowercase();
            if host.starts_with("http://") || host.starts_with("https://") {
                return Err(CoreError::invalid_argument(
                    "allowed_hosts",
                    format!("host {} should not contain a scheme", host),
                ));
            }
            if !host.is_empty() {
                allowed_hosts.insert(host);
            }
        }
        Ok(Self { allowed_hosts })
    }

    pub fn allowed_hosts(&self) -> impl Iterator<Item = &str> {
        self.allowed_hosts.iter().map(|h| h.as_str())
    }

    pub fn is_url_host_valid(&self, url: &Url) -> bool {
        if self.allowed_hosts.is_empty() {
            return true;
        }
        url.host_str()
            .map(|host| self.allowed_hosts.contains(&host.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

fn is_localhost(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

/// Supplies access tokens for bearer authentication
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn get_authorization_token(
        &self,
        url: &Url,
        additional_context: &HashMap<String, String>,
    ) -> Result<String>;

    fn allowed_hosts_validator(&self) -> &AllowedHostsValidator;
}

/// Bearer token authentication (`Authorization: Bearer <token>`)
///
/// With a `claims` context the previously attached header is dropped so that
/// a fresh token satisfying the claims is requested.
#[derive(Debug, Clone)]
pub struct BaseBearerTokenAuthenticationProvider<P> {
    access_token_provider: P,
}

impl<P: AccessTokenProvider> BaseBearerTokenAuthenticationProvider<P> {
    pub fn new(access_token_provider: P) -> Self {
        Self {
            access_token_provider,
        }
    }

    pub fn access_token_provider(&self) -> &P {
        &self.access_token_provider
    }
}

#[async_trait]
impl<P: AccessTokenProvider> AuthenticationProvider for BaseBearerTokenAuthenticationProvider<P> {
    async fn authenticate_request(
        &self,
        request: &mut RequestInformation,
        additional_context: &HashMap<String, String>,
    ) -> Result<()> {
        if additional_context.contains_key(CLAIMS_KEY) {
            request.headers.remove(AUTHORIZATION_HEADER);
        }
        if request.headers.contains(AUTHORIZATION_HEADER) {
            return Ok(());
        }

        let url = request.url()?;
        if !self
            .access_token_provider
            .allowed_hosts_validator()
            .is_url_host_valid(&url)
        {
            tracing::debug!("Skipping bearer token for host {:?}", url.host_str());
            return Ok(());
        }
        if url.scheme() != "https" && !is_localhost(&url) {
            return Err(CoreError::Authentication {
                message: format!("Only https is supported, got {}", url.scheme()),
                source: None,
            });
        }

        let token = self
            .access_token_provider
            .get_authorization_token(&url, additional_context)
            .await?;
        if !token.is_empty() {
            request
                .headers
                .add(AUTHORIZATION_HEADER, format!("Bearer {}", token));
        }
        Ok(())
    }
}

/// Where an API key is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLocation {
    Header,
    QueryParameter,
}

/// API key authentication, e.g. `x-api-key: <key>` or `?code=<key>`
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticationProvider {
    api_key: String,
    parameter_name: String,
    location: KeyLocation,
    validator: AllowedHostsValidator,
}

impl ApiKeyAuthenticationProvider {
    pub fn new(
        api_key: impl Into<String>,
        parameter_name: impl Into<String>,
        location: KeyLocation,
        validator: AllowedHostsValidator,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let parameter_name = parameter_name.into();
        if api_key.trim().is_empty() {
            return Err(CoreError::invalid_argument("api_key", "cannot be empty"));
        }
        if parameter_name.trim().is_empty() {
            return Err(CoreError::invalid_argument("parameter_name", "cannot be empty"));
        }
        Ok(Self {
            api_key,
            parameter_name,
            location,
            validator,
        })
    }

    /// Read the key from an environment variable
    pub fn from_env(
        var: &str,
        parameter_name: impl Into<String>,
        location: KeyLocation,
    ) -> Result<Self> {
        let api_key = std::env::var(var).map_err(|_| CoreError::Authentication {
            message: format!("Environment variable {} not found", var),
            source: None,
        })?;
        Self::new(api_key, parameter_name, location, AllowedHostsValidator::default())
    }
}

#[async_trait]
impl AuthenticationProvider for ApiKeyAuthenticationProvider {
    async fn authenticate_request(
        &self,
        request: &mut RequestInformation,
        _additional_context: &HashMap<String, String>,
    ) -> Result<()> {
        let url = request.url()?;
        if !self.validator.is_url_host_valid(&url) {
            return Ok(());
        }
        if url.scheme() != "https" && !is_localhost(&url) {
            return Err(CoreError::Authentication {
                message: format!("Only https is supported, got {}", url.scheme()),
                source: None,
            });
        }

        match self.location {
            KeyLocation::Header => {
                request.headers.set(&self.parameter_name, self.api_key.clone());
            }
            KeyLocation::QueryParameter => {
                if url.query_pairs().any(|(name, _)| name == self.parameter_name.as_str()) {
                    return Ok(());
                }
                let mut url = url;
                url.query_pairs_mut()
                    .append_pair(&self.parameter_name, &self.api_key);
                request.set_url(url.as_str());
            }
        }
        Ok(())
    }
}
