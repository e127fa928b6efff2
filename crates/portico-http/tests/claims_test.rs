//! Claims challenge handling of the transport invoker

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::*;
use portico_core::{NativeResponse, ResponseHeaders, CLAIMS_KEY};
use tracing::Span;

const CLAIMS: &str = "eyJhY2Nlc3NfdG9rZW4iOnsibmJmIjp7ImVzc2VudGlhbCI6dHJ1ZSwgInZhbHVlIjoiMTYwNDEwNjY1MSJ9fX0";

fn cae_failure() -> NativeResponse {
    let mut headers = ResponseHeaders::new();
    headers.add(
        "WWW-Authenticate",
        format!(
            r#"Bearer authorization_uri="https://login.windows.net/common/oauth2/authorize", client_id="00000003-0000-0000-c000-000000000000", error="insufficient_claims", claims="{}""#,
            CLAIMS
        ),
    );
    headers.add("Content-Type", "application/json");
    NativeResponse::new(401, headers, br#"{"error": "insufficient claims"}"#.to_vec())
}

fn claims_context() -> HashMap<String, String> {
    HashMap::from([(CLAIMS_KEY.to_string(), CLAIMS.to_string())])
}

#[tokio::test]
async fn challenge_reauthenticates_and_resends_once() {
    let transport = ScriptedTransport::new(vec![cae_failure(), json(200, USER_JSON)]);
    let auth = Arc::new(RecordingAuthProvider::default());
    let adapter = adapter_with(transport.clone(), auth.clone());
    let mut info = request_info("{+baseurl}/me");

    let user = adapter.send_async::<User>(&mut info, None).await.unwrap();

    assert_eq!(user.unwrap().display_name.as_deref(), Some("Jane Doe"));
    assert_eq!(auth.calls(), vec![HashMap::new(), claims_context()]);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn repeated_challenge_is_returned_as_raw_response() {
    let transport = ScriptedTransport::new(vec![cae_failure()]);
    let auth = Arc::new(RecordingAuthProvider::default());
    let adapter = adapter_with(transport.clone(), auth.clone());
    let mut info = request_info("{+baseurl}/me");

    let response = adapter
        .get_http_response_message(&mut info, &Span::none())
        .await
        .unwrap();

    assert_eq!(response.status_code, 401);
    assert_eq!(auth.calls(), vec![HashMap::new(), claims_context()]);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn repeated_challenge_is_classified_like_any_401() {
    let transport = ScriptedTransport::new(vec![cae_failure()]);
    let adapter = adapter_with(transport.clone(), Arc::new(RecordingAuthProvider::default()));
    let mut info = request_info("{+baseurl}/me");

    let err = adapter
        .send_async::<User>(&mut info, None)
        .await
        .unwrap_err();

    assert_eq!(err.as_api_error().unwrap().response_status_code, 401);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn plain_401_is_not_retried() {
    let mut headers = ResponseHeaders::new();
    headers.add("WWW-Authenticate", r#"Bearer error="invalid_token""#);
    let transport = ScriptedTransport::new(vec![NativeResponse::new(401, headers, Vec::new())]);
    let auth = Arc::new(RecordingAuthProvider::default());
    let adapter = adapter_with(transport.clone(), auth.clone());
    let mut info = request_info("{+baseurl}/me");

    let response = adapter
        .get_http_response_message(&mut info, &Span::none())
        .await
        .unwrap();

    assert_eq!(response.status_code, 401);
    assert_eq!(auth.calls().len(), 1);
    assert_eq!(transport.requests().len(), 1);
}
