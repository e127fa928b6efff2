//! JSON support for Portico
//!
//! `application/json` parse nodes and serialization writers, registered with
//! a request adapter through its factory registries.

pub mod parse_node;
pub mod writer;

pub use parse_node::{JsonParseNode, JsonParseNodeFactory, JSON_CONTENT_TYPE};
pub use writer::{JsonSerializationWriter, JsonSerializationWriterFactory};
