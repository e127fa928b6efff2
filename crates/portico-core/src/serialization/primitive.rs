//! Scalar values the materializer can extract without a model type

use std::fmt;

use crate::serialization::parse_node::ParseNode;
use crate::{CoreError, Result};

/// The fixed set of scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Integer,
    Float,
    String,
    Bytes,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::Boolean => write!(f, "boolean"),
            PrimitiveKind::Integer => write!(f, "integer"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Bytes => write!(f, "bytes"),
        }
    }
}

/// A Rust type standing for one [`PrimitiveKind`]
pub trait Primitive: Sized + Send + 'static {
    const KIND: PrimitiveKind;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>>;

    /// Only byte payloads can be taken from an unparsed body
    fn from_raw_body(_body: Vec<u8>) -> Option<Self> {
        None
    }
}

impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Boolean;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_bool_value()
    }
}

impl Primitive for i64 {
    const KIND: PrimitiveKind = PrimitiveKind::Integer;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_i64_value()
    }
}

impl Primitive for i32 {
    const KIND: PrimitiveKind = PrimitiveKind::Integer;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_i64_value()?
            .map(|value| {
                i32::try_from(value)
                    .map_err(|_| CoreError::parse(format!("{} does not fit in a 32-bit integer", value)))
            })
            .transpose()
    }
}

impl Primitive for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::Float;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_f64_value()
    }
}

impl Primitive for f32 {
    const KIND: PrimitiveKind = PrimitiveKind::Float;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        Ok(node.get_f64_value()?.map(|value| value as f32))
    }
}

impl Primitive for String {
    const KIND: PrimitiveKind = PrimitiveKind::String;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_string_value()
    }
}

impl Primitive for Vec<u8> {
    const KIND: PrimitiveKind = PrimitiveKind::Bytes;

    fn from_parse_node(node: &dyn ParseNode) -> Result<Option<Self>> {
        node.get_bytes_value()
    }

    fn from_raw_body(body: Vec<u8>) -> Option<Self> {
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(<bool as Primitive>::KIND, PrimitiveKind::Boolean);
        assert_eq!(<i32 as Primitive>::KIND, PrimitiveKind::Integer);
        assert_eq!(<f64 as Primitive>::KIND, PrimitiveKind::Float);
        assert_eq!(<String as Primitive>::KIND, PrimitiveKind::String);
        assert_eq!(<Vec<u8> as Primitive>::KIND, PrimitiveKind::Bytes);
        assert_eq!(PrimitiveKind::Float.to_string(), "float");
    }

    #[test]
    fn test_only_bytes_take_raw_body() {
        assert_eq!(Vec::<u8>::from_raw_body(b"abc".to_vec()), Some(b"abc".to_vec()));
        assert_eq!(String::from_raw_body(b"abc".to_vec()), None);
        assert_eq!(f64::from_raw_body(b"1.0".to_vec()), None);
    }
}
