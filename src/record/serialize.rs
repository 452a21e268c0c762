//! Wire-document massaging and response decoding.
//!
//! Serialization does not dump the attribute store as-is: declared
//! belongs-to objects collapse into their `_id` field, every `*_ids` field
//! is dropped (the plural object field carries that information), and
//! skip-listed fields are dropped regardless. Prefix options are route
//! parameters, never document content.

use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::errors::Error;
use crate::format::unwrap_root;
use crate::inflect::id_field;
use crate::transport::Response;
use crate::value::Value;

use super::Record;

impl Record {
    /// Encodes the massaged attribute tree under this resource's element
    /// name.
    pub fn to_wire(&self) -> Result<Vec<u8>, Error> {
        let tree = self.wire_tree();
        Ok(self
            .client
            .format()
            .encode(self.schema.element_name(), &tree)?)
    }

    /// The massaged document tree, nested records included.
    pub(crate) fn wire_tree(&self) -> Json {
        let mut out = JsonMap::new();
        let mut derived_ids = JsonMap::new();
        for (key, value) in self.attributes.iter() {
            if self.schema.skips_serialization(key) {
                continue;
            }
            if self.schema.is_belongs_to(key) {
                // The child object never serializes inline; a null child
                // contributes nothing.
                if let Value::Record(child) = value {
                    derived_ids.insert(
                        id_field(key),
                        child.id().map(Json::from).unwrap_or(Json::Null),
                    );
                }
                continue;
            }
            if key.ends_with("_ids") {
                continue;
            }
            out.insert(key.to_string(), value_to_json(value));
        }
        // The resolved object is authoritative for its id field.
        for (key, id) in derived_ids {
            out.insert(key, id);
        }
        Json::Object(out)
    }

    /// Merges a response document over the local attributes. Empty bodies
    /// are a no-op; the update path often answers with nothing.
    pub(crate) fn load_from_response(&mut self, response: &Response) -> Result<(), Error> {
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let tree = self.client.format().decode(&response.body)?;
        let root = unwrap_root(&tree).clone();
        if root.is_object() {
            self.load(root)?;
        }
        Ok(())
    }

    /// The server-assigned id out of a create response document.
    pub(crate) fn id_from_response(&self, response: &Response) -> Result<Option<i64>, Error> {
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let tree = self.client.format().decode(&response.body)?;
        let id = unwrap_root(&tree).get("id").and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        });
        Ok(id)
    }
}

fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
        Value::Record(r) => r.wire_tree(),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
    }
}
