//! JSON parse nodes backed by `serde_json::Value`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use portico_core::{CoreError, ParsableHook, ParseNode, ParseNodeFactory, Result};
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, found: &Value) -> CoreError {
    CoreError::parse(format!("Expected {} but found {}", expected, kind_of(found)))
}

/// A node over one JSON value. Children inherit the after-assignment hook.
pub struct JsonParseNode {
    value: Value,
    on_after_assign_field_values: Option<ParsableHook>,
}

impl JsonParseNode {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            on_after_assign_field_values: None,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    fn child(&self, value: Value) -> Box<dyn ParseNode> {
        Box::new(JsonParseNode {
            value,
            on_after_assign_field_values: self.on_after_assign_field_values.clone(),
        })
    }
}

impl ParseNode for JsonParseNode {
    fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn get_string_value(&self) -> Result<Option<String>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            other => Err(mismatch("a string", other)),
        }
    }

    fn get_bool_value(&self) -> Result<Option<bool>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            other => Err(mismatch("a boolean", other)),
        }
    }

    fn get_i64_value(&self) -> Result<Option<i64>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| CoreError::parse(format!("{} is not a 64-bit integer", n))),
            other => Err(mismatch("an integer", other)),
        }
    }

    fn get_f64_value(&self) -> Result<Option<f64>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| CoreError::parse(format!("{} is not a float", n))),
            other => Err(mismatch("a number", other)),
        }
    }

    fn get_bytes_value(&self) -> Result<Option<Vec<u8>>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::String(s) => STANDARD.decode(s).map(Some).map_err(|e| CoreError::Parse {
                message: "Invalid base64 content".to_string(),
                source: Some(e.into()),
            }),
            other => Err(mismatch("a base64 string", other)),
        }
    }

    fn get_child_node(&self, identifier: &str) -> Result<Option<Box<dyn ParseNode>>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(map.get(identifier).map(|v| self.child(v.clone()))),
            other => Err(mismatch("an object", other)),
        }
    }

    fn get_collection_of_nodes(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>> {
        match &self.value {
            Value::Null => Ok(None),
            Value::Array(items) => Ok(Some(items.iter().map(|v| self.child(v.clone())).collect())),
            other => Err(mismatch("an array", other)),
        }
    }

    fn on_after_assign_field_values(&self) -> Option<ParsableHook> {
        self.on_after_assign_field_values.clone()
    }

    fn set_on_after_assign_field_values(&mut self, hook: Option<ParsableHook>) {
        self.on_after_assign_field_values = hook;
    }
}

/// Parses `application/json` bodies
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParseNodeFactory;

impl JsonParseNodeFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ParseNodeFactory for JsonParseNodeFactory {
    fn valid_content_type(&self) -> Result<String> {
        Ok(JSON_CONTENT_TYPE.to_string())
    }

    fn get_root_parse_node(
        &self,
        content_type: &str,
        content: &[u8],
    ) -> Result<Box<dyn ParseNode>> {
        if !content_type.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
            return Err(CoreError::parse(format!(
                "Expected {} as content type, got {}",
                JSON_CONTENT_TYPE, content_type
            )));
        }
        if content.is_empty() {
            return Err(CoreError::parse("Cannot parse an empty body"));
        }
        let value: Value = serde_json::from_slice(content).map_err(|e| CoreError::Parse {
            message: format!("Invalid JSON: {}", e),
            source: Some(e.into()),
        })?;
        Ok(Box::new(JsonParseNode::new(value)))
    }
}
