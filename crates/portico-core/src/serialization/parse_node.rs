//! Parsed response bodies and typed extraction

use std::sync::Arc;

use crate::serialization::primitive::Primitive;
use crate::store::BackedModel;
use crate::Result;

/// Invoked with every object materialized from a parse node
pub type ParsableHook = Arc<dyn Fn(&dyn Parsable) + Send + Sync>;

/// A model that can be built from a parse node
pub trait Parsable: Send + Sync {
    fn create_from_parse_node(node: &dyn ParseNode) -> Result<Self>
    where
        Self: Sized;

    /// Models tracking changes expose their backing store here
    fn backed_model(&self) -> Option<&dyn BackedModel> {
        None
    }
}

/// A handle over a parsed body (or a part of it)
///
/// Scalar getters return `Ok(None)` for an explicit null and an error when the
/// value has another shape.
pub trait ParseNode: Send + Sync {
    fn is_null(&self) -> bool;

    fn get_string_value(&self) -> Result<Option<String>>;

    fn get_bool_value(&self) -> Result<Option<bool>>;

    fn get_i64_value(&self) -> Result<Option<i64>>;

    fn get_f64_value(&self) -> Result<Option<f64>>;

    fn get_bytes_value(&self) -> Result<Option<Vec<u8>>>;

    /// Child node of an object; `None` when the field is absent
    fn get_child_node(&self, identifier: &str) -> Result<Option<Box<dyn ParseNode>>>;

    /// Elements of a collection, in source order
    fn get_collection_of_nodes(&self) -> Result<Option<Vec<Box<dyn ParseNode>>>>;

    fn on_after_assign_field_values(&self) -> Option<ParsableHook>;

    /// Child nodes inherit the hook
    fn set_on_after_assign_field_values(&mut self, hook: Option<ParsableHook>);
}

/// Typed extraction on top of [`ParseNode`]
pub trait ParseNodeExt {
    fn get_object_value<T: Parsable>(&self) -> Result<Option<T>>;

    fn get_collection_of_object_values<T: Parsable>(&self) -> Result<Option<Vec<T>>>;

    fn get_primitive_value<P: Primitive>(&self) -> Result<Option<P>>;

    fn get_collection_of_primitive_values<P: Primitive>(&self) -> Result<Option<Vec<P>>>;

    fn get_child_value<P: Primitive>(&self, identifier: &str) -> Result<Option<P>>;

    fn get_child_object<T: Parsable>(&self, identifier: &str) -> Result<Option<T>>;

    fn get_child_collection_of_primitive_values<P: Primitive>(
        &self,
        identifier: &str,
    ) -> Result<Option<Vec<P>>>;
}

impl ParseNodeExt for dyn ParseNode + '_ {
    fn get_object_value<T: Parsable>(&self) -> Result<Option<T>> {
        if self.is_null() {
            return Ok(None);
        }
        let value = T::create_from_parse_node(self)?;
        if let Some(hook) = self.on_after_assign_field_values() {
            hook(&value);
        }
        Ok(Some(value))
    }

    fn get_collection_of_object_values<T: Parsable>(&self) -> Result<Option<Vec<T>>> {
        let Some(nodes) = self.get_collection_of_nodes()? else {
            return Ok(None);
        };
        nodes
            .iter()
            .filter_map(|node| node.get_object_value::<T>().transpose())
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn get_primitive_value<P: Primitive>(&self) -> Result<Option<P>> {
        P::from_parse_node(self)
    }

    fn get_collection_of_primitive_values<P: Primitive>(&self) -> Result<Option<Vec<P>>> {
        let Some(nodes) = self.get_collection_of_nodes()? else {
            return Ok(None);
        };
        nodes
            .iter()
            .filter_map(|node| P::from_parse_node(node.as_ref()).transpose())
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn get_child_value<P: Primitive>(&self, identifier: &str) -> Result<Option<P>> {
        match self.get_child_node(identifier)? {
            Some(node) => P::from_parse_node(node.as_ref()),
            None => Ok(None),
        }
    }

    fn get_child_object<T: Parsable>(&self, identifier: &str) -> Result<Option<T>> {
        match self.get_child_node(identifier)? {
            Some(node) => node.get_object_value::<T>(),
            None => Ok(None),
        }
    }

    fn get_child_collection_of_primitive_values<P: Primitive>(
        &self,
        identifier: &str,
    ) -> Result<Option<Vec<P>>> {
        match self.get_child_node(identifier)? {
            Some(node) => node.get_collection_of_primitive_values::<P>(),
            None => Ok(None),
        }
    }
}
