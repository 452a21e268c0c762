//! Per-resource declaration registries.
//!
//! A [`Schema`] is the class-level metadata for one remote resource:
//! association declarations, serialization skip-list, nested resources, the
//! route prefix, and the hook set. It is built once by [`SchemaBuilder`] at
//! registration time and immutable afterwards; records share it by `Arc`.
//!
//! From the declarations the builder derives the accessor table — field
//! name to [`Accessor`] — so attribute dispatch is a single map lookup, with
//! no name-pattern matching at read time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::hooks::{Hooks, NoHooks};
use crate::inflect::{id_field, ids_field, pluralize};

/// How an undeclared-attribute read on a field name is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// A plain column: first read yields null.
    Column,
    /// The belongs-to object field, e.g. `gender`.
    BelongsTo { target: String },
    /// The belongs-to id field, e.g. `gender_id`.
    BelongsToId { association: String },
    /// The has-many object field, e.g. `races`.
    HasMany { target: String },
    /// The has-many ids field, e.g. `race_ids`.
    HasManyIds { association: String },
    /// The has-one object field, e.g. `dog`.
    HasOne { target: String },
}

/// A nested resource cascaded through the parent's save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedResource {
    /// Singular name, e.g. `enrollment`; the cascaded attribute is its
    /// plural.
    pub name: String,
    /// Foreign-key field set on each child; defaults to
    /// `<parent resource>_id`.
    pub foreign_key: Option<String>,
}

/// Immutable class-level metadata for one remote resource.
pub struct Schema {
    name: String,
    collection: String,
    prefix: Option<String>,
    prefix_params: Vec<String>,
    belongs_to: Vec<String>,
    has_many: Vec<String>,
    has_one: Vec<String>,
    columns: Vec<String>,
    skip_serialization: Vec<String>,
    nested: Vec<NestedResource>,
    accessors: HashMap<String, Accessor>,
    hooks: Arc<dyn Hooks>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("collection", &self.collection)
            .field("belongs_to", &self.belongs_to)
            .field("has_many", &self.has_many)
            .field("has_one", &self.has_one)
            .finish_non_exhaustive()
    }
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    /// A bare schema for resource names that were never registered, used
    /// when loading nested documents under unknown keys.
    pub fn anonymous(name: &str) -> Arc<Schema> {
        SchemaBuilder::new(name).build()
    }

    /// Singular resource name, e.g. `test_resource`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plural collection name, e.g. `test_resources`.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Root name of this resource's wire documents.
    pub fn element_name(&self) -> &str {
        &self.name
    }

    /// The foreign-key field children of this resource carry,
    /// e.g. `test_resource_id`.
    pub fn foreign_key(&self) -> String {
        id_field(&self.name)
    }

    pub fn accessor(&self, field: &str) -> Option<&Accessor> {
        self.accessors.get(field)
    }

    pub fn is_belongs_to(&self, field: &str) -> bool {
        self.belongs_to.iter().any(|n| n == field)
    }

    pub fn belongs_to(&self) -> &[String] {
        &self.belongs_to
    }

    pub fn has_many(&self) -> &[String] {
        &self.has_many
    }

    pub fn has_one(&self) -> &[String] {
        &self.has_one
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn nested(&self) -> &[NestedResource] {
        &self.nested
    }

    pub fn skips_serialization(&self, field: &str) -> bool {
        self.skip_serialization.iter().any(|n| n == field)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Route parameters the prefix template needs, e.g. `country_id` for
    /// `/countries/:country_id`.
    pub fn prefix_params(&self) -> &[String] {
        &self.prefix_params
    }

    pub fn hooks(&self) -> Arc<dyn Hooks> {
        self.hooks.clone()
    }
}

/// Builds a [`Schema`]. Declarations accumulate, `build` derives the
/// accessor table and freezes everything.
pub struct SchemaBuilder {
    name: String,
    collection: Option<String>,
    prefix: Option<String>,
    belongs_to: Vec<String>,
    has_many: Vec<String>,
    has_one: Vec<String>,
    columns: Vec<String>,
    skip_serialization: Vec<String>,
    nested: Vec<NestedResource>,
    hooks: Arc<dyn Hooks>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: None,
            prefix: None,
            belongs_to: Vec::new(),
            has_many: Vec::new(),
            has_one: Vec::new(),
            columns: Vec::new(),
            skip_serialization: Vec::new(),
            nested: Vec::new(),
            hooks: Arc::new(NoHooks),
        }
    }

    /// Overrides the derived plural collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Route prefix template for nested remote paths,
    /// e.g. `/countries/:country_id`.
    pub fn prefix(mut self, template: impl Into<String>) -> Self {
        self.prefix = Some(template.into());
        self
    }

    /// Declares a belongs-to association by its singular name.
    pub fn belongs_to(mut self, name: impl Into<String>) -> Self {
        self.belongs_to.push(name.into());
        self
    }

    /// Declares a has-many association by its plural name.
    pub fn has_many(mut self, name: impl Into<String>) -> Self {
        self.has_many.push(name.into());
        self
    }

    /// Declares a has-one association by its singular name.
    pub fn has_one(mut self, name: impl Into<String>) -> Self {
        self.has_one.push(name.into());
        self
    }

    /// Declares a plain column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Excludes a field from serialized wire documents.
    pub fn skip_serialization(mut self, name: impl Into<String>) -> Self {
        self.skip_serialization.push(name.into());
        self
    }

    /// Declares a nested resource (singular name) cascaded on save.
    pub fn nested(mut self, name: impl Into<String>) -> Self {
        self.nested.push(NestedResource {
            name: name.into(),
            foreign_key: None,
        });
        self
    }

    /// Declares a nested resource with an explicit foreign-key field.
    pub fn nested_with_foreign_key(
        mut self,
        name: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.nested.push(NestedResource {
            name: name.into(),
            foreign_key: Some(foreign_key.into()),
        });
        self
    }

    pub fn hooks(mut self, hooks: impl Hooks + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn build(self) -> Arc<Schema> {
        let collection = self
            .collection
            .unwrap_or_else(|| pluralize(&self.name));
        let prefix_params = self
            .prefix
            .as_deref()
            .map(parse_prefix_params)
            .unwrap_or_default();

        let mut accessors = HashMap::new();
        for name in &self.belongs_to {
            accessors.insert(name.clone(), Accessor::BelongsTo {
                target: name.clone(),
            });
            accessors.insert(id_field(name), Accessor::BelongsToId {
                association: name.clone(),
            });
        }
        for name in &self.has_many {
            accessors.insert(name.clone(), Accessor::HasMany {
                target: name.clone(),
            });
            accessors.insert(ids_field(name), Accessor::HasManyIds {
                association: name.clone(),
            });
        }
        for name in &self.has_one {
            accessors.insert(name.clone(), Accessor::HasOne {
                target: name.clone(),
            });
        }
        // Explicit columns win over derived association fields, matching
        // dispatch order in the original dynamic lookup.
        for name in &self.columns {
            accessors.insert(name.clone(), Accessor::Column);
        }

        Arc::new(Schema {
            name: self.name,
            collection,
            prefix: self.prefix,
            prefix_params,
            belongs_to: self.belongs_to,
            has_many: self.has_many,
            has_one: self.has_one,
            columns: self.columns,
            skip_serialization: self.skip_serialization,
            nested: self.nested,
            accessors,
            hooks: self.hooks,
        })
    }
}

fn parse_prefix_params(template: &str) -> Vec<String> {
    template
        .split('/')
        .filter_map(|seg| seg.strip_prefix(':'))
        .map(String::from)
        .collect()
}

/// Resource name to schema, frozen at client construction.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl Registry {
    pub fn new(schemas: impl IntoIterator<Item = Arc<Schema>>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|s| (s.name().to_string(), s))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Registered schema, or an anonymous one for unknown names.
    pub fn get_or_default(&self, name: &str) -> Arc<Schema> {
        self.get(name).unwrap_or_else(|| Schema::anonymous(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }
}
