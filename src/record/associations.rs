//! Association resolution.
//!
//! [`Record::read`] is the single dispatch point for attribute access: a
//! literal attribute hit wins, then the schema's accessor table picks one of
//! the five association behaviors, and anything else is an unknown
//! attribute. Resolved values are cached by writing them back into the
//! attribute store, so a second read is a plain attribute hit — and later
//! mutation of the underlying ids is deliberately not reflected.

use async_recursion::async_recursion;
use tracing::debug;

use crate::errors::Error;
use crate::inflect::{id_field, ids_field, singularize};
use crate::schema::Accessor;
use crate::value::Value;

use super::Record;

impl Record {
    /// Reads a field, resolving declared associations on demand.
    ///
    /// Resolution order: stored attribute, then the accessor the schema
    /// derived for the name, then [`Error::UnknownAttribute`]. Belongs-to
    /// and has-many resolution may fetch from the remote service; the
    /// result (including a column's first-read null) is cached in the
    /// attribute store for the record's lifetime.
    #[async_recursion]
    pub async fn read(&mut self, name: &str) -> Result<Value, Error> {
        if let Some(value) = self.attributes.get(name) {
            return Ok(value.clone());
        }
        let Some(accessor) = self.schema.accessor(name).cloned() else {
            return Err(Error::UnknownAttribute(name.to_string()));
        };

        match accessor {
            Accessor::Column => {
                self.set(name, Value::Null);
                Ok(Value::Null)
            }
            Accessor::BelongsTo { target } => self.read_belongs_to(name, &target).await,
            Accessor::BelongsToId { association } => Ok(self.derive_belongs_to_id(name, &association)),
            Accessor::HasMany { target } => self.read_has_many(name, &target).await,
            Accessor::HasManyIds { association } => Ok(self.derive_has_many_ids(name, &association)),
            Accessor::HasOne { target } => self.read_has_one(name, &target).await,
        }
    }

    /// Belongs-to: nothing without an id; otherwise one remote find, cached.
    async fn read_belongs_to(&mut self, name: &str, target: &str) -> Result<Value, Error> {
        let id_value = self.read(&id_field(target)).await?;
        if id_value.is_blank() || id_value.as_int() == Some(0) {
            return Ok(Value::Null);
        }
        let Some(id) = id_value.as_int() else {
            return Ok(Value::Null);
        };

        debug!(resource = %self.schema.name(), association = target, id, "resolving belongs_to");
        let resource = self.client.resource_for(target)?;
        let found = resource.find(id).await?;
        let value = Value::Record(Box::new(found));
        self.set(name, value.clone());
        Ok(value)
    }

    /// Belongs-to id: derived from the cached object when one is present,
    /// a column-style null otherwise.
    fn derive_belongs_to_id(&mut self, name: &str, association: &str) -> Value {
        let derived = match self.attributes.get(association) {
            Some(Value::Record(r)) => Value::from(r.id()),
            _ => Value::Null,
        };
        self.set(name, derived.clone());
        derived
    }

    /// Has-many: empty ids mean an empty list; otherwise one remote find
    /// per id, in list order, cached as a stable list.
    async fn read_has_many(&mut self, name: &str, target: &str) -> Result<Value, Error> {
        let ids_value = self.read(&ids_field(target)).await?;
        let ids = id_list(&ids_value);
        if ids.is_empty() {
            let value = Value::List(Vec::new());
            self.set(name, value.clone());
            return Ok(value);
        }

        debug!(resource = %self.schema.name(), association = target, count = ids.len(), "resolving has_many");
        let resource = self.client.resource_for(&singularize(target))?;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            resolved.push(Value::Record(Box::new(resource.find(id).await?)));
        }
        let value = Value::List(resolved);
        self.set(name, value.clone());
        Ok(value)
    }

    /// Has-many ids: projected from the resolved object list when present,
    /// an empty list otherwise. The projection is an internal derivation, so
    /// it is stored directly — the comma-join coercion applies only to
    /// assigned id lists.
    fn derive_has_many_ids(&mut self, name: &str, association: &str) -> Value {
        let ids = match self.attributes.get(association) {
            Some(Value::List(objects)) => objects
                .iter()
                .map(|o| match o {
                    Value::Record(r) => Value::from(r.id()),
                    _ => Value::Null,
                })
                .collect(),
            _ => Vec::new(),
        };
        let value = Value::List(ids);
        self.attributes.set(name, value.clone());
        value
    }

    /// Has-one: a record that was never persisted cannot be queried for;
    /// otherwise a first-match find on this record's foreign key, cached.
    async fn read_has_one(&mut self, name: &str, target: &str) -> Result<Value, Error> {
        let Some(id) = self.id() else {
            return Ok(Value::Null);
        };

        debug!(resource = %self.schema.name(), association = target, "resolving has_one");
        let resource = self.client.resource_for(target)?;
        let found = resource
            .find_first(&[(self.schema.foreign_key(), id.into())])
            .await?;
        let value = found
            .map(|r| Value::Record(Box::new(r)))
            .unwrap_or(Value::Null);
        self.set(name, value.clone());
        Ok(value)
    }
}

/// Integer ids out of whatever shape the ids field holds: a joined string,
/// a list, a single integer, or nothing.
fn id_list(value: &Value) -> Vec<i64> {
    match value {
        Value::Str(s) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.parse().ok())
            .collect(),
        Value::List(items) => items.iter().filter_map(Value::as_int).collect(),
        Value::Int(i) => vec![*i],
        _ => Vec::new(),
    }
}
