//! Factory wrappers that keep backing stores in sync with (de)serialization
//!
//! After a backed model has been parsed its store is marked as initialized, so
//! only later assignments count as changes. Around serialization the store is
//! switched to return only changed values, then marked initialized again.

use std::sync::Arc;

use crate::serialization::{
    Parsable, ParsableHook, ParseNode, ParseNodeFactory, Serializable, SerializableHook,
    SerializationWriter, SerializationWriterFactory,
};
use crate::Result;

/// Wraps a parse node factory so that parsed backed models finish initialization
pub struct BackingStoreParseNodeFactory {
    inner: Arc<dyn ParseNodeFactory>,
}

impl BackingStoreParseNodeFactory {
    pub fn new(inner: Arc<dyn ParseNodeFactory>) -> Self {
        Self { inner }
    }
}

impl ParseNodeFactory for BackingStoreParseNodeFactory {
    fn valid_content_type(&self) -> Result<String> {
        self.inner.valid_content_type()
    }

    fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        let mut node = self.inner.get_root_parse_node(content_type, content)?;
        let previous = node.on_after_assign_field_values();
        let hook: ParsableHook = Arc::new(move |value: &dyn Parsable| {
            if let Some(previous) = &previous {
                previous(value);
            }
            if let Some(model) = value.backed_model() {
                model.backing_store().set_initialization_completed(true);
            }
        });
        node.set_on_after_assign_field_values(Some(hook));
        Ok(node)
    }
}

/// Wraps a serialization writer factory so backed models only emit changes
pub struct BackingStoreSerializationWriterProxyFactory {
    inner: Arc<dyn SerializationWriterFactory>,
}

impl BackingStoreSerializationWriterProxyFactory {
    pub fn new(inner: Arc<dyn SerializationWriterFactory>) -> Self {
        Self { inner }
    }
}

impl SerializationWriterFactory for BackingStoreSerializationWriterProxyFactory {
    fn valid_content_type(&self) -> Result<String> {
        self.inner.valid_content_type()
    }

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        let mut writer = self.inner.get_serialization_writer(content_type)?;
        let before: SerializableHook = Arc::new(|value: &dyn Serializable| {
            if let Some(model) = value.backed_model() {
                model.backing_store().set_return_only_changed_values(true);
            }
        });
        let after: SerializableHook = Arc::new(|value: &dyn Serializable| {
            if let Some(model) = value.backed_model() {
                let store = model.backing_store();
                store.set_return_only_changed_values(false);
                store.set_initialization_completed(true);
            }
        });
        writer.set_on_before_object_serialization(Some(before));
        writer.set_on_after_object_serialization(Some(after));
        Ok(writer)
    }
}
