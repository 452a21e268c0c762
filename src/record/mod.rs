//! The record: a remote resource held locally.
//!
//! A [`Record`] is a schema-less attribute map bound to a class-level
//! [`Schema`](crate::schema::Schema) and a [`Client`](crate::client::Client).
//! This module owns construction, the coercing load path, and raw attribute
//! access; the rest of the behavior lives in the submodules:
//!
//! - [`associations`]: the five association accessor behaviors
//! - [`lifecycle`]: validation, save, create/update, destroy, reload
//! - [`nested`]: cascading child saves and merge-back
//! - [`serialize`]: wire-document massaging and response decoding

use std::fmt;
use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as Json};

use crate::attributes::AttributeStore;
use crate::client::Client;
use crate::errors::{Error, ValidationErrors};
use crate::inflect::{id_field, singularize};
use crate::schema::{Accessor, Schema};
use crate::value::Value;

mod associations;
mod lifecycle;
mod nested;
mod serialize;

pub use nested::NestedOutcome;

/// One remote resource instance: attributes, route parameters, validation
/// errors, and the schema/client pair everything resolves through.
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    client: Client,
    attributes: AttributeStore,
    prefix_options: AttributeStore,
    errors: ValidationErrors,
    nested_outcomes: Vec<NestedOutcome>,
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("resource", &self.schema.name())
            .field("attributes", &self.attributes)
            .field("prefix_options", &self.prefix_options)
            .finish_non_exhaustive()
    }
}

impl Record {
    pub(crate) fn new(schema: Arc<Schema>, client: Client) -> Self {
        Self {
            schema,
            client,
            attributes: AttributeStore::new(),
            prefix_options: AttributeStore::new(),
            errors: ValidationErrors::new(),
            nested_outcomes: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Singular resource name this record belongs to.
    pub fn resource_name(&self) -> &str {
        self.schema.name()
    }

    /// The persisted id, when the record has one.
    pub fn id(&self) -> Option<i64> {
        self.attributes.get("id").and_then(Value::as_int)
    }

    pub fn set_id(&mut self, id: i64) {
        self.attributes.set("id", Value::Int(id));
    }

    /// A record with no id has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ValidationErrors {
        &mut self.errors
    }

    /// Raw attribute lookup; no association dispatch, no remote traffic.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> &AttributeStore {
        &self.attributes
    }

    pub fn prefix_options(&self) -> &AttributeStore {
        &self.prefix_options
    }

    pub fn set_prefix_option(&mut self, name: impl Into<String>, value: Value) {
        self.prefix_options.set(name, value);
    }

    /// Association-aware, coercing setter.
    ///
    /// Driven by the schema's accessor table:
    /// - a belongs-to object also writes `<name>_id` (null object, null id);
    /// - a scalar assigned to a belongs-to id field is coerced to integer;
    /// - a list assigned to a has-many ids field is joined to a comma string
    ///   for wire compatibility with the persisted representation.
    ///
    /// Everything else is stored as given.
    pub fn set(&mut self, name: &str, value: Value) {
        match self.schema.accessor(name) {
            Some(Accessor::BelongsTo { .. }) => {
                let derived = match &value {
                    Value::Record(r) => Some(Value::from(r.id())),
                    Value::Null => Some(Value::Null),
                    _ => None,
                };
                self.attributes.set(name, value);
                if let Some(id) = derived {
                    self.attributes.set(id_field(name), id);
                }
            }
            Some(Accessor::BelongsToId { .. }) => {
                self.attributes.set(name, coerce_id(value));
            }
            Some(Accessor::HasManyIds { .. }) => {
                self.attributes.set(name, coerce_id_list(value));
            }
            _ => self.attributes.set(name, value),
        }
    }

    /// Bulk update: merges into the existing attribute set rather than
    /// replacing it. Values are converted structurally but not coerced —
    /// [`Record::load`] is the coercing path.
    pub fn set_attributes(&mut self, attrs: Json) -> Result<(), Error> {
        let map = as_object(attrs)?;
        let mut incoming = AttributeStore::new();
        for (key, json) in map {
            let value = self.convert_json(&key, json);
            incoming.set(key, value);
        }
        self.attributes.merge(incoming);
        Ok(())
    }

    /// The coercing load path, used by construction and response refresh.
    ///
    /// Splits route parameters named by the schema's prefix template into
    /// `prefix_options`, converts the rest to [`Value`]s (maps become child
    /// records, lists of maps become record lists) and stores them through
    /// the coercing setter.
    pub(crate) fn load(&mut self, attrs: Json) -> Result<(), Error> {
        let map = as_object(attrs)?;
        for (key, json) in map {
            if self.schema.prefix_params().iter().any(|p| *p == key) {
                self.prefix_options.set(key, scalar_from_json(&json));
                continue;
            }
            let value = self.convert_json(&key, json);
            self.set(&key, value);
        }
        Ok(())
    }

    /// Structural JSON-to-value conversion. Objects become child records of
    /// the class registered under the key (or an anonymous one); lists of
    /// objects use the singularized key.
    fn convert_json(&self, key: &str, json: Json) -> Value {
        match json {
            Json::Object(map) => self.child_record(key, map),
            Json::Array(items) => {
                let element_key = singularize(key);
                Value::List(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Json::Object(map) => self.child_record(&element_key, map),
                            other => scalar_from_json(&other),
                        })
                        .collect(),
                )
            }
            other => scalar_from_json(&other),
        }
    }

    fn child_record(&self, key: &str, map: JsonMap<String, Json>) -> Value {
        let schema = self.client.schema_or_default(key);
        let mut child = Record::new(schema, self.client.clone());
        // The map is already parsed; loading it again cannot fail.
        let _ = child.load(Json::Object(map));
        Value::Record(Box::new(child))
    }
}

/// Records compare by resource identity and content; errors and save-time
/// bookkeeping are excluded.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.attributes == other.attributes
            && self.prefix_options == other.prefix_options
    }
}

fn coerce_id(value: Value) -> Value {
    match value {
        Value::Str(s) if !s.is_empty() => match s.trim().parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Str(s),
        },
        other => other,
    }
}

fn coerce_id_list(value: Value) -> Value {
    match value {
        Value::List(items) => Value::Str(
            items
                .iter()
                .map(Value::scalar_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => other,
    }
}

fn scalar_from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or(Value::Null),
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(_) | Json::Object(_) => Value::Null,
    }
}

fn as_object(attrs: Json) -> Result<JsonMap<String, Json>, Error> {
    match attrs {
        Json::Object(map) => Ok(map),
        other => Err(Error::InvalidAttributes(other.to_string())),
    }
}
