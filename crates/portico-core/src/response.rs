//! Transport-independent response data

use std::borrow::Cow;

use crate::headers::ResponseHeaders;

/// A received HTTP response, fully buffered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeResponse {
    pub status_code: u16,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

impl NativeResponse {
    pub fn new(status_code: u16, headers: ResponseHeaders, body: Vec<u8>) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The raw `Content-Type` header value
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_first("content-type")
    }

    /// The media type with parameters such as `charset` stripped
    pub fn media_type(&self) -> Option<String> {
        self.content_type()
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
    }

    /// 204 or an empty body
    pub fn has_no_content(&self) -> bool {
        self.status_code == 204 || self.body.is_empty()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> NativeResponse {
        let mut headers = ResponseHeaders::new();
        if let Some(ct) = content_type {
            headers.add("Content-Type", ct);
        }
        NativeResponse::new(status, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn test_success_range() {
        assert!(response(200, None, "").is_success());
        assert!(response(299, None, "").is_success());
        assert!(!response(199, None, "").is_success());
        assert!(!response(300, None, "").is_success());
        assert!(!response(404, None, "").is_success());
    }

    #[test]
    fn test_media_type_strips_parameters() {
        let resp = response(200, Some("Application/JSON; charset=utf-8"), "{}");
        assert_eq!(resp.content_type(), Some("Application/JSON; charset=utf-8"));
        assert_eq!(resp.media_type().as_deref(), Some("application/json"));
        assert_eq!(response(200, None, "{}").media_type(), None);
    }

    #[test]
    fn test_no_content() {
        assert!(response(204, Some("application/json"), "").has_no_content());
        assert!(response(200, Some("application/json"), "").has_no_content());
        assert!(!response(200, Some("application/json"), "{}").has_no_content());
    }
}
