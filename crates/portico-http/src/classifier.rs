//! Response classification and error mapping

use portico_core::{ApiError, ErrorMap, ErrorValue, NativeResponse, ParseNode};
use tracing::{debug, error, info_span, Span};

use crate::adapter::HttpRequestAdapter;
use crate::error::{Error, Result};
use crate::telemetry::SpanExt;

impl HttpRequestAdapter {
    /// The response media type without parameters such as `charset`
    pub fn get_response_content_type(&self, response: &NativeResponse) -> Option<String> {
        response.media_type()
    }

    /// Parse the body with the factory registered for its content type.
    ///
    /// `None` when the response has no content. A body without a content
    /// type cannot be dispatched and is a parse error.
    pub fn get_root_parse_node(
        &self,
        response: &NativeResponse,
        parent_span: &Span,
        attribute_span: &Span,
    ) -> Result<Option<Box<dyn ParseNode>>> {
        let span = info_span!(parent: parent_span, "get_root_parse_node");
        span.in_scope(|| -> Result<Option<Box<dyn ParseNode>>> {
            if response.has_no_content() {
                return Ok(None);
            }
            let Some(content_type) = self.get_response_content_type(response) else {
                return Err(Error::parse("No response content type found for deserialization"));
            };
            attribute_span.record("http.response.header.content_type", content_type.as_str());
            let root = self
                .parse_node_factory
                .get_root_parse_node(&content_type, &response.body)?;
            Ok(Some(root))
        })
    }

    /// Turn a non-success response into an error.
    ///
    /// The factory is looked up by exact status code, then status class
    /// (`4XX`, `5XX`), then `XXX`.
    pub fn throw_failed_responses(
        &self,
        response: &NativeResponse,
        error_map: Option<&ErrorMap>,
        parent_span: &Span,
        attribute_span: &Span,
    ) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        let status = response.status_code;
        let span = info_span!(
            parent: parent_span,
            "throw_failed_responses",
            http.response.status_code = status,
            error.message = tracing::field::Empty
        );
        let result = span.in_scope(|| -> Result<()> {
            attribute_span.record("http.response.status_code", status);

            let Some(factory) = error_map.and_then(|map| map.resolve(status)) else {
                debug!("No error factory registered for status {}", status);
                return Err(Error::Api(
                    ApiError::new(
                        format!(
                            "The server returned an unexpected status code and no error class is registered for this code {}",
                            status
                        ),
                        status,
                    )
                    .with_headers(response.headers.clone()),
                ));
            };

            debug!("Materializing mapped error for status {}", status);
            let root = self
                .get_root_parse_node(response, &span, attribute_span)?
                .ok_or_else(|| {
                    Error::parse(format!(
                        "The response for status {} has no body or content type to build the mapped error from",
                        status
                    ))
                })?;

            let api_error = match factory(root.as_ref()) {
                Ok(ErrorValue::Api(detail)) => ApiError::from_detail(detail, status),
                Ok(ErrorValue::Unexpected { type_name }) => {
                    ApiError::new(format!("Unexpected error type: {}", type_name), status)
                }
                Err(e) => {
                    error!("Error factory failed for status {}: {}", status, e);
                    ApiError::new(format!("Unexpected error type: {}", e.kind()), status)
                }
            };
            Err(Error::Api(api_error.with_headers(response.headers.clone())))
        });
        span.record_result(&result);
        attribute_span.record_result(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{AnonymousAuthenticationProvider, ResponseHeaders};
    use std::sync::Arc;

    fn adapter() -> HttpRequestAdapter {
        HttpRequestAdapter::new(Arc::new(AnonymousAuthenticationProvider)).unwrap()
    }

    fn json_response(status: u16, body: &str) -> NativeResponse {
        let mut headers = ResponseHeaders::new();
        headers.add("Content-Type", "application/json; charset=utf-8");
        NativeResponse::new(status, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn test_response_content_type() {
        let response = json_response(200, r#"{"message": "Success!"}"#);
        assert_eq!(
            adapter().get_response_content_type(&response).as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn test_root_parse_node_without_factory_fails() {
        let response = json_response(200, r#"{"message": "Success!"}"#);
        let err = adapter()
            .get_root_parse_node(&response, &Span::none(), &Span::none())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_root_parse_node_without_content() {
        let response = json_response(204, "");
        assert!(adapter()
            .get_root_parse_node(&response, &Span::none(), &Span::none())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_root_parse_node_without_content_type_fails() {
        let response = NativeResponse::new(200, ResponseHeaders::new(), b"{}".to_vec());
        let err = adapter()
            .get_root_parse_node(&response, &Span::none(), &Span::none())
            .err()
            .unwrap();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_success_is_not_thrown() {
        let response = json_response(200, r#"{"message": "Success!"}"#);
        assert!(adapter()
            .throw_failed_responses(&response, None, &Span::none(), &Span::none())
            .is_ok());
    }

    #[test]
    fn test_unmapped_status_message() {
        let response = json_response(404, r#"{"error": "not found"}"#);
        let err = adapter()
            .throw_failed_responses(&response, None, &Span::none(), &Span::none())
            .unwrap_err();
        let api_error = err.as_api_error().unwrap();
        assert_eq!(
            api_error.message,
            "The server returned an unexpected status code and no error class is registered for this code 404"
        );
        assert_eq!(api_error.response_status_code, 404);
        assert_eq!(
            api_error.response_headers.get_first("content-type"),
            Some("application/json; charset=utf-8")
        );
    }
}
