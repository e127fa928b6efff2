//! The request adapter and its builder

use std::fmt;
use std::sync::Arc;

use portico_core::{
    AuthenticationProvider, BackingStoreFactory, BackingStoreParseNodeFactory,
    BackingStoreSerializationWriterProxyFactory, ErrorMap, InMemoryBackingStoreFactory,
    NativeResponse, Parsable, ParseNodeExt, ParseNodeFactory, ParseNodeFactoryRegistry, Primitive,
    PrimitiveKind, RequestInformation, SerializationWriterFactory,
    SerializationWriterFactoryRegistry,
};
use tracing::{Instrument, Span};

use crate::config::{HttpClientConfig, ObservabilityOptions};
use crate::error::{Error, Result};
use crate::telemetry::{start_tracing_span, Operation, SpanExt};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Executes [`RequestInformation`] over HTTP and materializes the results.
///
/// All collaborators are shared, so one adapter can serve concurrent calls.
pub struct HttpRequestAdapter {
    pub(crate) authentication_provider: Arc<dyn AuthenticationProvider>,
    pub(crate) parse_node_factory: Arc<dyn ParseNodeFactory>,
    pub(crate) serialization_writer_factory: Arc<dyn SerializationWriterFactory>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) base_url: String,
    observability_options: ObservabilityOptions,
    backing_store_factory: Option<Arc<dyn BackingStoreFactory>>,
}

impl fmt::Debug for HttpRequestAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequestAdapter")
            .field("base_url", &self.base_url)
            .field("observability_options", &self.observability_options)
            .field("backing_store_enabled", &self.backing_store_factory.is_some())
            .finish_non_exhaustive()
    }
}

/// Collects the collaborators of an [`HttpRequestAdapter`]
#[derive(Default)]
pub struct HttpRequestAdapterBuilder {
    authentication_provider: Option<Arc<dyn AuthenticationProvider>>,
    parse_node_factory: Option<Arc<dyn ParseNodeFactory>>,
    serialization_writer_factory: Option<Arc<dyn SerializationWriterFactory>>,
    transport: Option<Arc<dyn HttpTransport>>,
    client_config: HttpClientConfig,
    base_url: Option<String>,
    observability_options: ObservabilityOptions,
}

impl HttpRequestAdapterBuilder {
    pub fn authentication_provider(mut self, provider: Arc<dyn AuthenticationProvider>) -> Self {
        self.authentication_provider = Some(provider);
        self
    }

    pub fn parse_node_factory(mut self, factory: Arc<dyn ParseNodeFactory>) -> Self {
        self.parse_node_factory = Some(factory);
        self
    }

    pub fn serialization_writer_factory(
        mut self,
        factory: Arc<dyn SerializationWriterFactory>,
    ) -> Self {
        self.serialization_writer_factory = Some(factory);
        self
    }

    /// Replaces the default reqwest transport; `client_config` is then unused
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn client_config(mut self, config: HttpClientConfig) -> Self {
        self.client_config = config;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn observability_options(mut self, options: ObservabilityOptions) -> Self {
        self.observability_options = options;
        self
    }

    pub fn build(self) -> Result<HttpRequestAdapter> {
        let authentication_provider = self.authentication_provider.ok_or_else(|| {
            Error::Construction {
                message: "An authentication provider is required".to_string(),
            }
        })?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.client_config)?),
        };

        let mut adapter = HttpRequestAdapter {
            authentication_provider,
            parse_node_factory: self
                .parse_node_factory
                .unwrap_or_else(|| Arc::new(ParseNodeFactoryRegistry::new())),
            serialization_writer_factory: self
                .serialization_writer_factory
                .unwrap_or_else(|| Arc::new(SerializationWriterFactoryRegistry::new())),
            transport,
            base_url: String::new(),
            observability_options: self.observability_options,
            backing_store_factory: None,
        };
        if let Some(base_url) = self.base_url {
            adapter.set_base_url(&base_url);
        }
        Ok(adapter)
    }
}

impl HttpRequestAdapter {
    /// Adapter with empty factory registries and the default reqwest transport
    pub fn new(authentication_provider: Arc<dyn AuthenticationProvider>) -> Result<Self> {
        Self::builder()
            .authentication_provider(authentication_provider)
            .build()
    }

    pub fn builder() -> HttpRequestAdapterBuilder {
        HttpRequestAdapterBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Trailing slashes are dropped so templates can append paths
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    pub fn get_parse_node_factory(&self) -> Arc<dyn ParseNodeFactory> {
        self.parse_node_factory.clone()
    }

    pub fn get_serialization_writer_factory(&self) -> Arc<dyn SerializationWriterFactory> {
        self.serialization_writer_factory.clone()
    }

    pub fn observability_options(&self) -> &ObservabilityOptions {
        &self.observability_options
    }

    /// Wrap the factories so backed models track changes, and keep the
    /// backing store factory for generated models to use.
    ///
    /// The factories are wrapped once; later calls only swap the store factory.
    pub fn enable_backing_store(&mut self, factory: Option<Arc<dyn BackingStoreFactory>>) {
        if self.backing_store_factory.is_none() {
            self.parse_node_factory = Arc::new(BackingStoreParseNodeFactory::new(
                self.parse_node_factory.clone(),
            ));
            self.serialization_writer_factory =
                Arc::new(BackingStoreSerializationWriterProxyFactory::new(
                    self.serialization_writer_factory.clone(),
                ));
        }
        self.backing_store_factory =
            Some(factory.unwrap_or_else(|| Arc::new(InMemoryBackingStoreFactory)));
    }

    pub fn backing_store_factory(&self) -> Option<Arc<dyn BackingStoreFactory>> {
        self.backing_store_factory.clone()
    }

    /// Injects the base URL first so the span can record the target server
    fn start_span(&self, request_info: &mut RequestInformation, operation: Operation) -> Span {
        self.set_base_url_for_request_information(request_info);
        let options = request_info
            .get_request_option::<ObservabilityOptions>()
            .unwrap_or(&self.observability_options);
        start_tracing_span(request_info, operation, options)
    }

    /// Send and classify. `None` when a response handler took the response.
    async fn send_and_classify(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
        span: &Span,
    ) -> Result<Option<NativeResponse>> {
        let response = self.get_http_response_message(request_info, span).await?;
        span.record_response(&response);
        if let Some(handler) = self.get_response_handler(request_info) {
            handler.handle_response_async(response, error_map).await?;
            return Ok(None);
        }
        self.throw_failed_responses(&response, error_map, span, span)?;
        if response.has_no_content() {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Send the request and parse the body as a single `T`
    pub async fn send_async<T: Parsable>(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
    ) -> Result<Option<T>> {
        let span = self.start_span(request_info, Operation::SendAsync);
        let result: Result<Option<T>> = async {
            let Some(response) = self.send_and_classify(request_info, error_map, &span).await? else {
                return Ok(None);
            };
            let Some(root) = self.get_root_parse_node(&response, &span, &span)? else {
                return Ok(None);
            };
            Ok(root.get_object_value::<T>()?)
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }

    /// Send the request and parse the body as a collection of `T`, in
    /// source order
    pub async fn send_collection_async<T: Parsable>(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
    ) -> Result<Option<Vec<T>>> {
        let span = self.start_span(request_info, Operation::SendCollectionAsync);
        let result: Result<Option<Vec<T>>> = async {
            let Some(response) = self.send_and_classify(request_info, error_map, &span).await? else {
                return Ok(None);
            };
            let Some(root) = self.get_root_parse_node(&response, &span, &span)? else {
                return Ok(None);
            };
            Ok(root.get_collection_of_object_values::<T>()?)
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }

    /// Send the request and parse the body as a collection of primitives
    pub async fn send_collection_of_primitive_async<P: Primitive>(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
    ) -> Result<Option<Vec<P>>> {
        let span = self.start_span(request_info, Operation::SendCollectionOfPrimitiveAsync);
        let result: Result<Option<Vec<P>>> = async {
            let Some(response) = self.send_and_classify(request_info, error_map, &span).await? else {
                return Ok(None);
            };
            let Some(root) = self.get_root_parse_node(&response, &span, &span)? else {
                return Ok(None);
            };
            Ok(root.get_collection_of_primitive_values::<P>()?)
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }

    /// Send the request and extract one primitive.
    ///
    /// Byte payloads (`Vec<u8>`) are the raw body, whatever the content type.
    pub async fn send_primitive_async<P: Primitive>(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
    ) -> Result<Option<P>> {
        let span = self.start_span(request_info, Operation::SendPrimitiveAsync);
        let result: Result<Option<P>> = async {
            let Some(response) = self.send_and_classify(request_info, error_map, &span).await? else {
                return Ok(None);
            };
            if P::KIND == PrimitiveKind::Bytes {
                return Ok(P::from_raw_body(response.body));
            }
            let Some(root) = self.get_root_parse_node(&response, &span, &span)? else {
                return Ok(None);
            };
            Ok(root.get_primitive_value::<P>()?)
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }

    /// Send the request and only check the status
    pub async fn send_no_response_content_async(
        &self,
        request_info: &mut RequestInformation,
        error_map: Option<&ErrorMap>,
    ) -> Result<()> {
        let span = self.start_span(request_info, Operation::SendNoResponseContentAsync);
        let result: Result<()> = async {
            self.send_and_classify(request_info, error_map, &span).await?;
            Ok(())
        }
        .instrument(span.clone())
        .await;
        span.record_result(&result);
        result
    }
}
