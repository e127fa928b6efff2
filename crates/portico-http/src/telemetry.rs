//! Operation spans and span helpers
//!
//! Every adapter entry point opens one span named after itself. Attributes
//! follow the OpenTelemetry HTTP conventions and are recorded as they become
//! known.

use std::fmt;

use portico_core::{NativeResponse, RequestInformation};
use tracing::{field::Empty, Span};

use crate::config::ObservabilityOptions;

/// Adapter entry points that open an operation span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SendAsync,
    SendCollectionAsync,
    SendCollectionOfPrimitiveAsync,
    SendPrimitiveAsync,
    SendNoResponseContentAsync,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SendAsync => "send_async",
            Operation::SendCollectionAsync => "send_collection_async",
            Operation::SendCollectionOfPrimitiveAsync => "send_collection_of_primitive_async",
            Operation::SendPrimitiveAsync => "send_primitive_async",
            Operation::SendNoResponseContentAsync => "send_no_response_content_async",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Span names must be literals, so each operation expands its own `info_span!`
macro_rules! operation_span {
    ($name:literal) => {
        tracing::info_span!(
            $name,
            otel.scope.name = Empty,
            http.request.method = Empty,
            url.full = Empty,
            url.scheme = Empty,
            server.address = Empty,
            server.port = Empty,
            http.response.status_code = Empty,
            http.response.body.size = Empty,
            http.response.header.content_type = Empty,
            error.message = Empty,
        )
    };
}

/// Open the span of `operation` for `request` and record the request attributes
pub fn start_tracing_span(
    request: &RequestInformation,
    operation: Operation,
    options: &ObservabilityOptions,
) -> Span {
    let span = match operation {
        Operation::SendAsync => operation_span!("send_async"),
        Operation::SendCollectionAsync => operation_span!("send_collection_async"),
        Operation::SendCollectionOfPrimitiveAsync => {
            operation_span!("send_collection_of_primitive_async")
        }
        Operation::SendPrimitiveAsync => operation_span!("send_primitive_async"),
        Operation::SendNoResponseContentAsync => operation_span!("send_no_response_content_async"),
    };

    span.record("otel.scope.name", options.tracer_name.as_str());
    span.record("http.request.method", request.http_method.as_str());
    // The base URL may not be injected yet; attributes are best effort
    if let Ok(url) = request.url() {
        span.record("url.scheme", url.scheme());
        if let Some(host) = url.host_str() {
            span.record("server.address", host);
        }
        if let Some(port) = url.port_or_known_default() {
            span.record("server.port", port);
        }
        if options.include_euii_attributes {
            span.record("url.full", url.as_str());
        }
    }
    span
}

/// Extension trait for recording outcomes into spans
pub trait SpanExt {
    /// Record `error.message` when the operation failed
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: fmt::Display;

    /// Record the response status, body size and content type
    fn record_response(&self, response: &NativeResponse);
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: fmt::Display,
    {
        if let Err(e) = result {
            self.record("error.message", e.to_string().as_str());
        }
    }

    fn record_response(&self, response: &NativeResponse) {
        self.record("http.response.status_code", response.status_code);
        self.record("http.response.body.size", response.body.len() as u64);
        if let Some(content_type) = response.content_type() {
            self.record("http.response.header.content_type", content_type);
        }
    }
}
