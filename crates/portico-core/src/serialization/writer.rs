//! Outgoing body serialization

use std::sync::Arc;

use crate::store::BackedModel;
use crate::Result;

/// Invoked around the serialization of every object
pub type SerializableHook = Arc<dyn Fn(&dyn Serializable) + Send + Sync>;

/// A model that can write itself to a [`SerializationWriter`]
pub trait Serializable: Send + Sync {
    fn serialize(&self, writer: &mut dyn SerializationWriter) -> Result<()>;

    fn backed_model(&self) -> Option<&dyn BackedModel> {
        None
    }
}

/// Writes values to a body of one content type
///
/// A `None` key writes the value at the current position (root or collection
/// element); `None` values are skipped.
pub trait SerializationWriter: Send {
    fn write_string_value(&mut self, key: Option<&str>, value: Option<&str>) -> Result<()>;

    fn write_bool_value(&mut self, key: Option<&str>, value: Option<bool>) -> Result<()>;

    fn write_i64_value(&mut self, key: Option<&str>, value: Option<i64>) -> Result<()>;

    fn write_f64_value(&mut self, key: Option<&str>, value: Option<f64>) -> Result<()>;

    fn write_bytes_value(&mut self, key: Option<&str>, value: Option<&[u8]>) -> Result<()>;

    fn write_null_value(&mut self, key: Option<&str>) -> Result<()>;

    fn write_object_value(
        &mut self,
        key: Option<&str>,
        value: Option<&dyn Serializable>,
    ) -> Result<()>;

    fn write_collection_of_object_values(
        &mut self,
        key: Option<&str>,
        values: Option<&[&dyn Serializable]>,
    ) -> Result<()>;

    fn write_collection_of_string_values(
        &mut self,
        key: Option<&str>,
        values: Option<&[String]>,
    ) -> Result<()>;

    fn get_serialized_content(&mut self) -> Result<Vec<u8>>;

    fn set_on_before_object_serialization(&mut self, hook: Option<SerializableHook>);

    fn set_on_after_object_serialization(&mut self, hook: Option<SerializableHook>);
}
