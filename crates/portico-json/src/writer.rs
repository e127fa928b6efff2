//! JSON serialization writer

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use portico_core::{
    CoreError, Result, Serializable, SerializableHook, SerializationWriter,
    SerializationWriterFactory,
};
use serde_json::{Map, Value};

use crate::parse_node::JSON_CONTENT_TYPE;

/// Builds a JSON document value by value.
///
/// Objects and collections being written sit on a stack; a finished value is
/// put into its parent, or becomes the root.
#[derive(Default)]
pub struct JsonSerializationWriter {
    stack: Vec<Value>,
    root: Option<Value>,
    on_before_object_serialization: Option<SerializableHook>,
    on_after_object_serialization: Option<SerializableHook>,
}

impl JsonSerializationWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, key: Option<&str>, value: Value) -> Result<()> {
        match (self.stack.last_mut(), key) {
            (Some(Value::Object(map)), Some(key)) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
            (Some(Value::Object(_)), None) => Err(CoreError::Serialization {
                message: "Values inside an object need a key".to_string(),
                source: None,
            }),
            (Some(Value::Array(items)), _) => {
                items.push(value);
                Ok(())
            }
            (Some(_), _) => Err(CoreError::Serialization {
                message: "Cannot nest a value inside a scalar".to_string(),
                source: None,
            }),
            (None, _) => {
                self.root = Some(value);
                Ok(())
            }
        }
    }

    fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or_else(|| CoreError::Serialization {
            message: "Unbalanced object serialization".to_string(),
            source: None,
        })
    }
}

impl SerializationWriter for JsonSerializationWriter {
    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.put(key, Value::String(value.to_string())),
            None => Ok(()),
        }
    }

    fn write_bool_value(&mut self, key: Option<&str>, value: Option<bool>) -> Result<()> {
        match value {
            Some(value) => self.put(key, Value::Bool(value)),
            None => Ok(()),
        }
    }

    fn write_i64_value(&mut self, key: Option<&str>, value: Option<i64>) -> Result<()> {
        match value {
            Some(value) => self.put(key, Value::from(value)),
            None => Ok(()),
        }
    }

    fn write_f64_value(&mut self, key: Option<&str>, value: Option<f64>) -> Result<()> {
        match value {
            // Non-finite floats have no JSON form
            Some(value) => self.put(key, Value::from(value)),
            None => Ok(()),
        }
    }

    fn write_bytes_value(&mut self, key: Option<&str>, value: Option<&[u8]>) -> Result<()> {
        match value {
            Some(value) => self.put(key, Value::String(STANDARD.encode(value))),
            None => Ok(()),
        }
    }

    fn write_null_value(&mut self, key: Option<&str>) -> Result<()> {
        self.put(key, Value::Null)
    }

    fn write_object_value(
        &mut self,
        key: Option<&str>,
        value: Option<&dyn Serializable>,
    ) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        if let Some(hook) = &self.on_before_object_serialization {
            hook(value);
        }
        self.stack.push(Value::Object(Map::new()));
        value.serialize(self)?;
        let object = self.pop()?;
        if let Some(hook) = &self.on_after_object_serialization {
            hook(value);
        }
        self.put(key, object)
    }

    fn write_collection_of_object_values(
        &mut self,
        key: Option<&str>,
        values: Option<&[&dyn Serializable]>,
    ) -> Result<()> {
        let Some(values) = values else {
            return Ok(());
        };
        self.stack.push(Value::Array(Vec::with_capacity(values.len())));
        for value in values {
            self.write_object_value(None, Some(*value))?;
        }
        let items = self.pop()?;
        self.put(key, items)
    }

    fn write_collection_of_string_values(
        &mut self,
        key: Option<&str>,
        values: Option<&[String]>,
    ) -> Result<()> {
        match values {
            Some(values) => self.put(
                key,
                Value::Array(values.iter().cloned().map(Value::String).collect()),
            ),
            None => Ok(()),
        }
    }

    fn get_serialized_content(&mut self) -> Result<Vec<u8>> {
        let root = self.root.take().unwrap_or(Value::Null);
        serde_json::to_vec(&root).map_err(|e| CoreError::Serialization {
            message: format!("Failed to encode JSON: {}", e),
            source: Some(e.into()),
        })
    }

    fn set_on_before_object_serialization(&mut self, hook: Option<SerializableHook>) {
        self.on_before_object_serialization = hook;
    }

    fn set_on_after_object_serialization(&mut self, hook: Option<SerializableHook>) {
        self.on_after_object_serialization = hook;
    }
}

/// Creates writers for `application/json`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializationWriterFactory;

impl JsonSerializationWriterFactory {
    pub fn new() -> Self {
        Self
    }
}

impl SerializationWriterFactory for JsonSerializationWriterFactory {
    fn valid_content_type(&self) -> Result<String> {
        Ok(JSON_CONTENT_TYPE.to_string())
    }

    fn get_serialization_writer(&self, content_type: &str) -> Result<Box<dyn SerializationWriter>> {
        if !content_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
            return Err(CoreError::Serialization {
                message: format!(
                    "Expected {} as content type, got {}",
                    JSON_CONTENT_TYPE, content_type
                ),
                source: None,
            });
        }
        Ok(Box::new(JsonSerializationWriter::new()))
    }
}
