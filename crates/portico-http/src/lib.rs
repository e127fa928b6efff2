//! reqwest-backed request adapter for Portico generated API clients
//!
//! [`HttpRequestAdapter`] turns a [`portico_core::RequestInformation`] into
//! an HTTP call and the response back into typed values:
//! - base URL injection and authentication
//! - one re-authenticated retry on a claims challenge
//! - error mapping of non-success responses through an [`portico_core::ErrorMap`]
//! - content-type driven deserialization of objects, collections and primitives
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use portico_core::{AnonymousAuthenticationProvider, Method, RequestInformation};
//! use portico_http::HttpRequestAdapter;
//!
//! # async fn run() -> portico_http::Result<()> {
//! let mut adapter = HttpRequestAdapter::new(Arc::new(AnonymousAuthenticationProvider))?;
//! adapter.set_base_url("https://api.example.com");
//!
//! let mut request = RequestInformation::new(Method::Get, "{+baseurl}/status", HashMap::new());
//! let status: Option<String> = adapter.send_primitive_async(&mut request, None).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod classifier;
pub mod config;
pub mod error;
pub mod invoker;
pub mod request_builder;
pub mod telemetry;
pub mod transport;

pub use adapter::{HttpRequestAdapter, HttpRequestAdapterBuilder};
pub use config::{HttpClientConfig, ObservabilityOptions};
pub use error::{Error, Result};
pub use telemetry::{start_tracing_span, Operation, SpanExt};
pub use transport::{HttpTransport, ReqwestTransport};
