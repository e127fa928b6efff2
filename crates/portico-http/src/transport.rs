//! The transport seam: one attempt, one buffered response

use async_trait::async_trait;
use portico_core::{NativeResponse, ResponseHeaders};
use reqwest::header::HeaderMap;
use reqwest::Client as ReqwestClient;

use crate::config::HttpClientConfig;
use crate::error::{Error, Result};

/// Sends a native request and buffers the response
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<NativeResponse>;
}

/// [`HttpTransport`] over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!config.validate_tls)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Reuse an existing client, e.g. one shared with other components
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }
}

/// Every received value is kept, repeats included; non-UTF-8 bytes are
/// replaced rather than dropped
fn response_headers(native: &HeaderMap) -> ResponseHeaders {
    let mut headers = ResponseHeaders::new();
    for (name, value) in native {
        headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    headers
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: reqwest::Request) -> Result<NativeResponse> {
        let response = self.client.execute(request).await?;
        let status_code = response.status().as_u16();
        let headers = response_headers(response.headers());
        let body = response.bytes().await?.to_vec();
        Ok(NativeResponse::new(status_code, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = HttpClientConfig::default().with_timeout_secs(0);
        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_response_headers_are_kept_verbatim() {
        use reqwest::header::HeaderValue;

        let mut native = HeaderMap::new();
        native.append("set-cookie", HeaderValue::from_static("a=1"));
        native.append("set-cookie", HeaderValue::from_static("a=1"));
        native.append("x-name", HeaderValue::from_bytes(b"caf\xc3\xa9").unwrap());

        let headers = response_headers(&native);
        assert_eq!(headers.get("set-cookie").unwrap().len(), 2);
        assert_eq!(headers.get_first("x-name"), Some("café"));
    }

    #[test]
    fn test_default_transport() {
        assert!(ReqwestTransport::new(&HttpClientConfig::default()).is_ok());
    }
}
