//! Backing store support for change-tracking models

pub mod backing_store;
pub mod proxies;

pub use backing_store::{
    BackedModel, BackingStore, BackingStoreFactory, InMemoryBackingStore,
    InMemoryBackingStoreFactory, StoreValue,
};
pub use proxies::{BackingStoreParseNodeFactory, BackingStoreSerializationWriterProxyFactory};
