//! Shared doubles and models for the adapter integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use portico_core::{
    AuthenticationProvider, NativeResponse, Parsable, ParseNode, ParseNodeExt,
    ParseNodeFactoryRegistry, RequestInformation, ResponseHeaders,
};
use portico_http::{HttpRequestAdapter, HttpTransport};
use portico_json::JsonParseNodeFactory;

pub const BASE_URL: &str = "https://graph.microsoft.com";

/// What the transport saw of one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
}

/// Answers with queued responses; the last one repeats once the queue is drained
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<NativeResponse>>,
    last: Mutex<Option<NativeResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<NativeResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: reqwest::Request) -> portico_http::Result<NativeResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            authorization: request
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });

        let next = self.responses.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(response) = next {
            *last = Some(response);
        }
        Ok(last.clone().expect("scripted transport has no response"))
    }
}

/// Records every authentication call with its context
#[derive(Debug, Default)]
pub struct RecordingAuthProvider {
    calls: Mutex<Vec<HashMap<String, String>>>,
}

impl RecordingAuthProvider {
    pub fn calls(&self) -> Vec<HashMap<String, String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthenticationProvider for RecordingAuthProvider {
    async fn authenticate_request(
        &self,
        _request: &mut RequestInformation,
        additional_context: &HashMap<String, String>,
    ) -> portico_core::Result<()> {
        self.calls.lock().unwrap().push(additional_context.clone());
        Ok(())
    }
}

pub fn response(status: u16, content_type: Option<&str>, body: &[u8]) -> NativeResponse {
    let mut headers = ResponseHeaders::new();
    if let Some(content_type) = content_type {
        headers.add("Content-Type", content_type);
    }
    NativeResponse::new(status, headers, body.to_vec())
}

pub fn json(status: u16, body: &str) -> NativeResponse {
    response(status, Some("application/json"), body.as_bytes())
}

pub fn json_registry() -> Arc<ParseNodeFactoryRegistry> {
    Arc::new(
        ParseNodeFactoryRegistry::new()
            .with_factory(Arc::new(JsonParseNodeFactory))
            .unwrap(),
    )
}

/// Adapter over a scripted transport with JSON parsing
pub fn adapter_with(
    transport: Arc<ScriptedTransport>,
    auth: Arc<dyn AuthenticationProvider>,
) -> HttpRequestAdapter {
    HttpRequestAdapter::builder()
        .authentication_provider(auth)
        .parse_node_factory(json_registry())
        .transport(transport)
        .base_url(BASE_URL)
        .build()
        .unwrap()
}

pub fn request_info(template: &str) -> RequestInformation {
    RequestInformation::new(portico_core::Method::Get, template, HashMap::new())
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub office_location: Option<String>,
    pub business_phones: Option<Vec<String>>,
    pub age: Option<i64>,
    pub gpa: Option<f64>,
    pub is_active: Option<bool>,
    pub mobile_phone: Option<String>,
}

impl Parsable for User {
    fn create_from_parse_node(node: &dyn ParseNode) -> portico_core::Result<Self> {
        Ok(Self {
            id: node.get_child_value("id")?,
            display_name: node.get_child_value("displayName")?,
            office_location: node.get_child_value("officeLocation")?,
            business_phones: node.get_child_collection_of_primitive_values("businessPhones")?,
            age: node.get_child_value("age")?,
            gpa: node.get_child_value("gpa")?,
            is_active: node.get_child_value("isActive")?,
            mobile_phone: node.get_child_value("mobilePhone")?,
        })
    }
}

pub const USER_JSON: &str = r#"{
    "id": "8f841f30-e6e3-439a-a812-ebd369559c36",
    "displayName": "Jane Doe",
    "officeLocation": "dunhill",
    "businessPhones": ["+1 234 567 891"],
    "age": 21,
    "gpa": 3.2,
    "isActive": true,
    "mobilePhone": null
}"#;

/// Domain error of the test API: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{error}")]
pub struct NotFoundError {
    pub error: String,
}

impl Parsable for NotFoundError {
    fn create_from_parse_node(node: &dyn ParseNode) -> portico_core::Result<Self> {
        Ok(Self {
            error: node.get_child_value("error")?.unwrap_or_default(),
        })
    }
}
