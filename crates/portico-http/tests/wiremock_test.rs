//! End-to-end pipeline over a real HTTP server

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::*;
use portico_core::{
    AccessTokenProvider, AllowedHostsValidator, AnonymousAuthenticationProvider,
    BaseBearerTokenAuthenticationProvider, ErrorMap, Method, RequestInformation,
    SerializationWriterFactoryRegistry, CLAIMS_KEY,
};
use portico_http::{HttpClientConfig, HttpRequestAdapter};
use portico_json::JsonSerializationWriterFactory;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default)]
struct CountingTokenProvider {
    validator: AllowedHostsValidator,
    issued: AtomicUsize,
}

#[async_trait]
impl AccessTokenProvider for CountingTokenProvider {
    async fn get_authorization_token(
        &self,
        _url: &reqwest::Url,
        additional_context: &HashMap<String, String>,
    ) -> portico_core::Result<String> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(match additional_context.get(CLAIMS_KEY) {
            Some(claims) => format!("token-for-{}", claims),
            None => "token".to_string(),
        })
    }

    fn allowed_hosts_validator(&self) -> &AllowedHostsValidator {
        &self.validator
    }
}

fn adapter(
    server: &MockServer,
    auth: Arc<dyn portico_core::AuthenticationProvider>,
) -> HttpRequestAdapter {
    HttpRequestAdapter::builder()
        .authentication_provider(auth)
        .parse_node_factory(json_registry())
        .serialization_writer_factory(Arc::new(
            SerializationWriterFactoryRegistry::new()
                .with_factory(Arc::new(JsonSerializationWriterFactory))
                .unwrap(),
        ))
        .client_config(
            HttpClientConfig::default()
                .with_timeout_secs(10)
                .with_connect_timeout_secs(5),
        )
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn get_user_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(USER_JSON, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter(&server, Arc::new(AnonymousAuthenticationProvider));
    let mut info = request_info("{+baseurl}/users/me");
    let user = adapter.send_async::<User>(&mut info, None).await.unwrap().unwrap();

    assert_eq!(user.id.as_deref(), Some("8f841f30-e6e3-439a-a812-ebd369559c36"));
}

#[tokio::test]
async fn post_parsable_body_and_map_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"displayName": "Jane Doe"})))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(r#"{"error": "not found"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    struct NewUser;
    impl portico_core::Serializable for NewUser {
        fn serialize(
            &self,
            writer: &mut dyn portico_core::SerializationWriter,
        ) -> portico_core::Result<()> {
            writer.write_string_value(Some("displayName"), Some("Jane Doe"))
        }
    }

    let adapter = adapter(&server, Arc::new(AnonymousAuthenticationProvider));
    let mut info = RequestInformation::new(Method::Post, "{+baseurl}/users", HashMap::new());
    info.set_content_from_parsable(
        adapter.get_serialization_writer_factory().as_ref(),
        "application/json",
        &NewUser,
    )
    .unwrap();

    let error_map = ErrorMap::new().with_error::<NotFoundError>(404_u16);
    let err = adapter
        .send_no_response_content_async(&mut info, Some(&error_map))
        .await
        .unwrap_err();

    let api_error = err.as_api_error().unwrap();
    assert_eq!(api_error.response_status_code, 404);
    assert_eq!(api_error.downcast_ref::<NotFoundError>().unwrap().error, "not found");
}

#[tokio::test]
async fn claims_challenge_over_http() {
    let claims = "eyJhY2Nlc3NfdG9rZW4iOnt9fQ";
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(401).insert_header(
            "WWW-Authenticate",
            format!(r#"Bearer error="insufficient_claims", claims="{}""#, claims).as_str(),
        ))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer token-for-{}", claims).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(USER_JSON, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let auth = Arc::new(BaseBearerTokenAuthenticationProvider::new(
        CountingTokenProvider::default(),
    ));
    let adapter = adapter(&server, auth.clone());
    let mut info = request_info("{+baseurl}/me");
    let user = adapter.send_async::<User>(&mut info, None).await.unwrap();

    assert_eq!(user.unwrap().display_name.as_deref(), Some("Jane Doe"));
    assert_eq!(auth.access_token_provider().issued.load(Ordering::SeqCst), 2);
}
