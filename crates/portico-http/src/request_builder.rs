//! Request information to native request conversion

use std::collections::HashMap;
use std::sync::Arc;

use portico_core::{Method, RequestInformation, ResponseHandler, ResponseHandlerOption, BASE_URL_KEY};
use reqwest::header::{HeaderName, HeaderValue};
use tracing::{info_span, Instrument, Span};

use crate::adapter::HttpRequestAdapter;
use crate::error::{Error, Result};
use crate::telemetry::SpanExt;

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Connect => reqwest::Method::CONNECT,
        Method::Put => reqwest::Method::PUT,
        Method::Trace => reqwest::Method::TRACE,
        Method::Head => reqwest::Method::HEAD,
    }
}

impl HttpRequestAdapter {
    /// Inject the adapter's base URL as the `baseurl` path parameter
    pub fn set_base_url_for_request_information(&self, request_info: &mut RequestInformation) {
        if !self.base_url.is_empty() {
            request_info
                .path_parameters
                .insert(BASE_URL_KEY.to_string(), self.base_url.clone());
        }
    }

    /// The handler of an attached [`ResponseHandlerOption`]
    pub fn get_response_handler(
        &self,
        request_info: &RequestInformation,
    ) -> Option<Arc<dyn ResponseHandler>> {
        request_info
            .get_request_option::<ResponseHandlerOption>()
            .map(|option| option.handler())
    }

    /// Build the native request; nothing is sent
    pub fn get_request_from_request_information(
        &self,
        request_info: &RequestInformation,
        parent_span: &Span,
    ) -> Result<reqwest::Request> {
        let span = info_span!(parent: parent_span, "get_request_from_request_information");
        span.in_scope(|| -> Result<reqwest::Request> {
            let url = request_info.url()?;
            let mut request = reqwest::Request::new(to_reqwest_method(request_info.http_method), url);

            for (name, values) in request_info.headers.iter() {
                let header_name =
                    HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::Argument {
                        message: format!("Invalid header name {}: {}", name, e),
                        source: None,
                    })?;
                for value in values {
                    let header_value = HeaderValue::from_str(value).map_err(|e| Error::Argument {
                        message: format!("Invalid value for header {}: {}", name, e),
                        source: None,
                    })?;
                    request.headers_mut().append(header_name.clone(), header_value);
                }
            }

            if let Some(content) = &request_info.content {
                *request.body_mut() = Some(reqwest::Body::from(content.clone()));
            }
            Ok(request)
        })
    }

    /// Run base URL injection and authentication, then build the native
    /// request without sending it
    pub async fn convert_to_native_async(
        &self,
        request_info: &mut RequestInformation,
    ) -> Result<reqwest::Request> {
        let span = info_span!("convert_to_native_async", error.message = tracing::field::Empty);
        let result: Result<reqwest::Request> = async {
            self.set_base_url_for_request_information(request_info);
            self.authenticate(request_info, &HashMap::new(), &span).await?;
            self.get_request_from_request_information(request_info, &span)
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }

    pub(crate) async fn authenticate(
        &self,
        request_info: &mut RequestInformation,
        additional_context: &HashMap<String, String>,
        parent_span: &Span,
    ) -> Result<()> {
        let span = info_span!(
            parent: parent_span,
            "authenticate_request",
            error.message = tracing::field::Empty
        );
        let result = self
            .authentication_provider
            .authenticate_request(request_info, additional_context)
            .instrument(span.clone())
            .await;
        span.record_result(&result);
        result.map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{AnonymousAuthenticationProvider, NativeResponseHandler, RequestOption};

    fn adapter() -> HttpRequestAdapter {
        HttpRequestAdapter::new(Arc::new(AnonymousAuthenticationProvider)).unwrap()
    }

    fn request_info() -> RequestInformation {
        RequestInformation::new(Method::Get, "{+baseurl}/users/me", HashMap::new())
    }

    #[test]
    fn test_base_url_is_injected() {
        let mut adapter = adapter();
        adapter.set_base_url("https://graph.microsoft.com");
        let mut info = request_info();
        adapter.set_base_url_for_request_information(&mut info);
        assert_eq!(
            info.path_parameters.get(BASE_URL_KEY).map(String::as_str),
            Some("https://graph.microsoft.com")
        );
    }

    #[test]
    fn test_empty_base_url_is_not_injected() {
        let mut info = request_info();
        adapter().set_base_url_for_request_information(&mut info);
        assert!(!info.path_parameters.contains_key(BASE_URL_KEY));
    }

    #[test]
    fn test_native_request_carries_method_headers_and_body() {
        let mut info = RequestInformation::new(Method::Post, "", HashMap::new());
        info.set_url("https://graph.microsoft.com/v1.0/users");
        info.headers.add("Accept", "application/json");
        info.headers.add("x-tag", "a");
        info.headers.add("x-tag", "b");
        info.content = Some(b"hello world".to_vec());

        let request = adapter()
            .get_request_from_request_information(&info, &Span::none())
            .unwrap();

        assert_eq!(request.method(), &reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://graph.microsoft.com/v1.0/users");
        assert_eq!(request.headers()["accept"], "application/json");
        assert_eq!(request.headers().get_all("x-tag").iter().count(), 2);
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(&b"hello world"[..])
        );
    }

    #[test]
    fn test_missing_url_is_an_argument_error() {
        let info = RequestInformation::default();
        let err = adapter()
            .get_request_from_request_information(&info, &Span::none())
            .unwrap_err();
        assert!(matches!(err, Error::Argument { .. }));
    }

    #[test]
    fn test_response_handler_lookup() {
        let mut info = request_info();
        assert!(adapter().get_response_handler(&info).is_none());

        let option = ResponseHandlerOption::new(Arc::new(NativeResponseHandler::new()));
        info.add_request_options([Arc::new(option) as Arc<dyn RequestOption>]);
        assert!(adapter().get_response_handler(&info).is_some());
    }

    #[tokio::test]
    async fn test_convert_to_native_async() {
        let mut adapter = adapter();
        adapter.set_base_url("https://graph.microsoft.com/");
        let mut info = request_info();
        let request = adapter.convert_to_native_async(&mut info).await.unwrap();
        assert_eq!(request.url().as_str(), "https://graph.microsoft.com/users/me");
    }
}
