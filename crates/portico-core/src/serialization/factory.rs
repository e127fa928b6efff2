//! Content-type keyed factories for parse nodes and serialization writers
//!
//! Registries are plain values handed to the adapter; nothing here is global.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::serialization::parse_node::ParseNode;
use crate::serialization::writer::SerializationWriter;
use crate::{CoreError, Result};

/// Builds root parse nodes for one content type
pub trait ParseNodeFactory: Send + Sync {
    fn valid_content_type(&self) -> Result<String>;

    fn get_root_parse_node(&self, content_type: &str, content: &[u8])
        -> Result<Box<dyn ParseNode>>;
}

/// Builds serialization writers for one content type
pub trait SerializationWriterFactory: Send + Sync {
    fn valid_content_type(&self) -> Result<String>;

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>>;
}

fn vendor_prefix() -> &'static Regex {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    PREFIX.get_or_init(|| Regex::new(r"[^/]+\+").expect("Valid regex pattern"))
}

/// Candidate registry keys for a content type: the media type without
/// parameters, then its structured-syntax form (`application/vnd.x+json`
/// becomes `application/json`).
fn lookup_keys(content_type: &str) -> Result<(String, String)> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if media_type.is_empty() {
        return Err(CoreError::invalid_argument("content_type", "cannot be empty"));
    }
    let cleaned = vendor_prefix().replace(&media_type, "").into_owned();
    Ok((media_type, cleaned))
}

/// Dispatches to the parse node factory registered for a content type
#[derive(Clone, Default)]
pub struct ParseNodeFactoryRegistry {
    factories: HashMap<String, Arc<dyn ParseNodeFactory>>,
}

impl ParseNodeFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under its own content type
    pub fn register(&mut self, factory: Arc<dyn ParseNodeFactory>) -> Result<()> {
        let content_type = factory.valid_content_type()?.to_ascii_lowercase();
        self.factories.insert(content_type, factory);
        Ok(())
    }

    pub fn with_factory(mut self, factory: Arc<dyn ParseNodeFactory>) -> Result<Self> {
        self.register(factory)?;
        Ok(self)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for ParseNodeFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseNodeFactoryRegistry")
            .field("content_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ParseNodeFactory for ParseNodeFactoryRegistry {
    fn valid_content_type(&self) -> Result<String> {
        Err(CoreError::Unsupported {
            message: "The registry supports multiple content types. Get the registered factory instead"
                .to_string(),
            feature: Some("valid_content_type".to_string()),
        })
    }

    fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        let (media_type, cleaned) = lookup_keys(content_type)?;
        if let Some(factory) = self.factories.get(&media_type) {
            return factory.get_root_parse_node(&media_type, content);
        }
        if let Some(factory) = self.factories.get(&cleaned) {
            return factory.get_root_parse_node(&cleaned, content);
        }
        Err(CoreError::parse(format!(
            "Content type {} does not have a factory registered to be parsed",
            media_type
        )))
    }
}

/// Dispatches to the serialization writer factory registered for a content type
#[derive(Clone, Default)]
pub struct SerializationWriterFactoryRegistry {
    factories: HashMap<String, Arc<dyn SerializationWriterFactory>>,
}

impl SerializationWriterFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Arc<dyn SerializationWriterFactory>) -> Result<()> {
        let content_type = factory.valid_content_type()?.to_ascii_lowercase();
        self.factories.insert(content_type, factory);
        Ok(())
    }

    pub fn with_factory(mut self, factory: Arc<dyn SerializationWriterFactory>) -> Result<Self> {
        self.register(factory)?;
        Ok(self)
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for SerializationWriterFactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationWriterFactoryRegistry")
            .field("content_types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SerializationWriterFactory for SerializationWriterFactoryRegistry {
    fn valid_content_type(&self) -> Result<String> {
        Err(CoreError::Unsupported {
            message: "The registry supports multiple content types. Get the registered factory instead"
                .to_string(),
            feature: Some("valid_content_type".to_string()),
        })
    }

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        let (media_type, cleaned) = lookup_keys(content_type)?;
        if let Some(factory) = self.factories.get(&media_type) {
            return factory.get_serialization_writer(&media_type);
        }
        if let Some(factory) = self.factories.get(&cleaned) {
            return factory.get_serialization_writer(&cleaned);
        }
        Err(CoreError::Serialization {
            message: format!(
                "Content type {} does not have a factory registered to be serialized",
                media_type
            ),
            source: None,
        })
    }
}
