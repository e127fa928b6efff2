//! Per-request options and response handler overrides

use std::any::Any;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error_map::ErrorMap;
use crate::response::NativeResponse;
use crate::Result;

/// An option attached to a [`crate::RequestInformation`]; at most one option
/// per key is kept.
pub trait RequestOption: Any + Debug + Send + Sync {
    fn key(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// Takes over a response instead of the adapter's own materialization
#[async_trait]
pub trait ResponseHandler: Debug + Send + Sync {
    async fn handle_response_async(
        &self,
        response: NativeResponse,
        error_map: Option<&ErrorMap>,
    ) -> Result<()>;
}

/// Keeps the raw response for the caller to inspect
#[derive(Debug, Default)]
pub struct NativeResponseHandler {
    value: Mutex<Option<NativeResponse>>,
}

impl NativeResponseHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<NativeResponse> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn take_value(&self) -> Option<NativeResponse> {
        self.value.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

#[async_trait]
impl ResponseHandler for NativeResponseHandler {
    async fn handle_response_async(
        &self,
        response: NativeResponse,
        _error_map: Option<&ErrorMap>,
    ) -> Result<()> {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(response);
        Ok(())
    }
}

/// Routes the response of a request to a custom [`ResponseHandler`]
#[derive(Debug, Clone)]
pub struct ResponseHandlerOption {
    handler: Arc<dyn ResponseHandler>,
}

impl ResponseHandlerOption {
    pub const KEY: &'static str = "ResponseHandlerOption";

    pub fn new(handler: Arc<dyn ResponseHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> Arc<dyn ResponseHandler> {
        self.handler.clone()
    }
}

impl RequestOption for ResponseHandlerOption {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
