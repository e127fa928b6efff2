//! Connection failures surface from the reqwest transport unchanged

mod common;

use std::sync::Arc;

use common::*;
use portico_http::{Error, HttpClientConfig, HttpRequestAdapter};
use tracing::Span;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn refused_connection_is_a_transport_error_without_retry() {
    let auth = Arc::new(RecordingAuthProvider::default());
    let adapter = HttpRequestAdapter::builder()
        .authentication_provider(auth.clone())
        .parse_node_factory(json_registry())
        .client_config(
            HttpClientConfig::default()
                .with_timeout_secs(5)
                .with_connect_timeout_secs(2),
        )
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let mut info = request_info("{+baseurl}/users/me");

    let err = adapter
        .send_async::<User>(&mut info, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(auth.calls().len(), 1);
    // The operation span is closed once the call returns
    assert_ne!(
        Span::current().metadata().map(|metadata| metadata.name()),
        Some("send_async")
    );
    assert!(!logs_contain("claims challenge"));
}
