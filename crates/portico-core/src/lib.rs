//! Portico core abstractions
//!
//! Protocol-agnostic building blocks shared by generated API clients and
//! request adapters: request descriptions, authentication providers,
//! serialization traits, error mapping and backing stores.

pub mod api_error;
pub mod authentication;
pub mod error;
pub mod error_map;
pub mod headers;
pub mod options;
pub mod request_information;
pub mod response;
pub mod serialization;
pub mod store;

pub use api_error::{ApiError, DomainError};
pub use authentication::{
    AccessTokenProvider, AllowedHostsValidator, AnonymousAuthenticationProvider,
    ApiKeyAuthenticationProvider, AuthenticationProvider, BaseBearerTokenAuthenticationProvider,
    KeyLocation, CLAIMS_KEY,
};
pub use error::{CoreError, Result};
pub use error_map::{ErrorFactory, ErrorKey, ErrorMap, ErrorValue};
pub use headers::{HeadersCollection, RequestHeaders, ResponseHeaders};
pub use options::{NativeResponseHandler, RequestOption, ResponseHandler, ResponseHandlerOption};
pub use request_information::{Method, RequestInformation, BASE_URL_KEY, RAW_URL_KEY};
pub use response::NativeResponse;
pub use serialization::{
    Parsable, ParsableHook, ParseNode, ParseNodeExt, ParseNodeFactory, ParseNodeFactoryRegistry,
    Primitive, PrimitiveKind, Serializable, SerializableHook, SerializationWriter,
    SerializationWriterFactory, SerializationWriterFactoryRegistry,
};
pub use store::{
    BackedModel, BackingStore, BackingStoreFactory, BackingStoreParseNodeFactory,
    BackingStoreSerializationWriterProxyFactory, InMemoryBackingStore, InMemoryBackingStoreFactory,
};
