//! Cascading persistence for nested resources.
//!
//! After a parent create or update, every declared nested resource's
//! children are saved with the parent's foreign key wired in, and the
//! successfully saved children are merged back over the parent's plural
//! attribute. A child that fails to save is excluded from the merge without
//! failing the parent; the per-child results stay readable through
//! [`Record::nested_outcomes`] until the next save.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::Error;
use crate::inflect::pluralize;
use crate::value::Value;

use super::Record;

/// The result of one nested child save.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedOutcome {
    /// Nested resource name the child belongs to.
    pub resource: String,
    /// Position of the child in the plural attribute.
    pub index: usize,
    /// The child's id after the save attempt, when it has one.
    pub id: Option<i64>,
    pub saved: bool,
}

/// Saved children per nested resource, built during one save and merged
/// back immediately after the parent refreshes from the response.
pub(crate) type SavedNested = Vec<(String, Vec<Record>)>;

impl Record {
    /// Per-child results of the most recent save's nested cascade.
    pub fn nested_outcomes(&self) -> &[NestedOutcome] {
        &self.nested_outcomes
    }

    /// Saves every child of every declared nested resource.
    ///
    /// The child list comes from the plural attribute when present,
    /// falling back to the has-many getter (which caches what it resolves).
    /// Children are mutated in place: foreign key first, then saved, so the
    /// merge in [`Record::merge_saved_nested`] can identify them by
    /// equality.
    pub(crate) async fn save_nested(&mut self) -> Result<SavedNested, Error> {
        let mut saved: SavedNested = Vec::new();
        let mut outcomes = Vec::new();
        let parent_id = self.id();

        for nested in self.schema.nested().to_vec() {
            let plural = pluralize(&nested.name);
            if !self.attributes.contains(&plural) && self.schema.accessor(&plural).is_some() {
                self.read(&plural).await?;
            }
            let Some(list_value) = self.attributes.remove(&plural) else {
                continue;
            };
            let mut children = match list_value {
                Value::List(children) => children,
                other => {
                    self.attributes.set(plural, other);
                    continue;
                }
            };

            let foreign_key = nested
                .foreign_key
                .clone()
                .unwrap_or_else(|| self.schema.foreign_key());
            debug!(
                resource = %self.schema.name(),
                nested = %nested.name,
                count = children.len(),
                %foreign_key,
                "saving nested resources"
            );

            let mut saved_children = Vec::new();
            for (index, child) in children.iter_mut().enumerate() {
                let Value::Record(child) = child else {
                    continue;
                };
                child.set(&foreign_key, Value::from(parent_id));
                let ok = child.save().await?;
                if !ok {
                    warn!(
                        nested = %nested.name,
                        index,
                        "nested save failed, excluding child from merge"
                    );
                }
                outcomes.push(NestedOutcome {
                    resource: nested.name.clone(),
                    index,
                    id: child.id(),
                    saved: ok,
                });
                if ok {
                    saved_children.push((**child).clone());
                }
            }

            self.attributes.set(plural, Value::List(children));
            saved.push((nested.name.clone(), saved_children));
        }

        self.nested_outcomes = outcomes;
        Ok(saved)
    }

    /// Replaces each nested plural attribute with (previous entries minus
    /// anything equal to a freshly saved child) plus the freshly saved
    /// children — the saved instances are authoritative.
    pub(crate) fn merge_saved_nested(&mut self, saved: SavedNested) {
        for (name, saved_children) in saved {
            let plural = pluralize(&name);
            let before = match self.attributes.get(&plural) {
                Some(Value::List(list)) => list.clone(),
                _ => Vec::new(),
            };
            let mut merged: Vec<Value> = before
                .into_iter()
                .filter(|value| match value {
                    Value::Record(r) => !saved_children.iter().any(|s| s == &**r),
                    _ => true,
                })
                .collect();
            merged.extend(
                saved_children
                    .into_iter()
                    .map(|r| Value::Record(Box::new(r))),
            );
            self.attributes.set(plural, Value::List(merged));
        }
    }
}
