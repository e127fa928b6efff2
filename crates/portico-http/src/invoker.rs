//! Sending with the claims challenge protocol
//!
//! A `401` whose `WWW-Authenticate` header is a Bearer challenge carrying
//! `claims="..."` asks for a token satisfying those claims. The request is
//! re-authenticated with the claims and sent again, at most once.

use std::collections::HashMap;
use std::sync::OnceLock;

use portico_core::{NativeResponse, RequestInformation, CLAIMS_KEY};
use regex::Regex;
use tracing::{debug, info_span, warn, Instrument, Span};

use crate::adapter::HttpRequestAdapter;
use crate::error::Result;
use crate::telemetry::SpanExt;

const WWW_AUTHENTICATE_HEADER: &str = "WWW-Authenticate";
const BEARER_SCHEME: &str = "bearer";

/// Progress of the claims retry; there is no way back from `Retried`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClaimsRetry {
    Initial,
    Retried,
}

fn claims_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"claims="([^"]+)""#).expect("Valid regex pattern"))
}

/// The quoted claims of a Bearer claims challenge, passed on unmodified
pub(crate) fn claims_challenge(response: &NativeResponse) -> Option<String> {
    if response.status_code != 401 {
        return None;
    }
    response
        .headers
        .get(WWW_AUTHENTICATE_HEADER)?
        .iter()
        .filter(|value| {
            value
                .trim_start()
                .get(..BEARER_SCHEME.len())
                .map(|scheme| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
                .unwrap_or(false)
        })
        .find_map(|value| {
            claims_pattern()
                .captures(value)
                .map(|caps| caps[1].to_string())
        })
}

impl HttpRequestAdapter {
    /// Authenticate, build and send `request_info`, answering one claims
    /// challenge. A repeated challenge is returned as the raw `401`.
    pub async fn get_http_response_message(
        &self,
        request_info: &mut RequestInformation,
        parent_span: &Span,
    ) -> Result<NativeResponse> {
        let span = info_span!(
            parent: parent_span,
            "get_http_response_message",
            http.response.status_code = tracing::field::Empty,
            error.message = tracing::field::Empty
        );
        let result: Result<NativeResponse> = async {
            self.set_base_url_for_request_information(request_info);
            self.authenticate(request_info, &HashMap::new(), &span).await?;

            let mut state = ClaimsRetry::Initial;
            loop {
                let request = self.get_request_from_request_information(request_info, &span)?;
                let response = self.transport.send(request).await?;
                span.record("http.response.status_code", response.status_code);
                debug!("Received response with status {}", response.status_code);

                let claims = match state {
                    ClaimsRetry::Initial => claims_challenge(&response),
                    ClaimsRetry::Retried => None,
                };
                let Some(claims) = claims else {
                    return Ok(response);
                };

                warn!("Received a claims challenge, retrying once with the requested claims");
                state = ClaimsRetry::Retried;
                let retry_span = info_span!(parent: &span, "retry_cae_response_if_required");
                let context = HashMap::from([(CLAIMS_KEY.to_string(), claims)]);
                self.authenticate(request_info, &context, &retry_span)
                    .instrument(retry_span.clone())
                    .await?;
            }
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }
}
