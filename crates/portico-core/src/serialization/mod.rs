//! Serialization abstractions
//!
//! Wire formats plug in through [`ParseNodeFactory`] and
//! [`SerializationWriterFactory`]; models implement [`Parsable`] and
//! [`Serializable`] against the format-neutral node and writer traits.

pub mod factory;
pub mod parse_node;
pub mod primitive;
pub mod writer;

pub use factory::{
    ParseNodeFactory, ParseNodeFactoryRegistry, SerializationWriterFactory,
    SerializationWriterFactoryRegistry,
};
pub use parse_node::{Parsable, ParsableHook, ParseNode, ParseNodeExt};
pub use primitive::{Primitive, PrimitiveKind};
pub use writer::{Serializable, SerializableHook, SerializationWriter};
