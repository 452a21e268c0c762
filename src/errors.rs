//! Error types for the record layer.
//!
//! One enum per concern: [`Error`] for the record/resource surface,
//! [`TransportError`](crate::transport::TransportError) for the HTTP seam,
//! [`FormatError`](crate::format::FormatError) for the wire codec.
//! Validation failures are not errors — they accumulate in
//! [`ValidationErrors`] and only
//! [`save_strict`](crate::record::Record::save_strict) turns them into
//! [`Error::RecordNotSaved`].

use serde::Serialize;
use thiserror::Error;

use crate::format::FormatError;
use crate::transport::TransportError;

/// Errors surfaced by records and resource handles.
#[derive(Debug, Error)]
pub enum Error {
    /// `save_strict` failed: either local validation added errors or the
    /// remote save was rejected.
    #[error("record not saved")]
    RecordNotSaved,

    /// A dynamic class-level call matched no finder pattern.
    #[error("no such method: {0}")]
    NoSuchMethod(String),

    /// An instance-level read matched neither an attribute nor a declared
    /// accessor.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// An association or lookup referenced a resource name that was never
    /// registered.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The remote service answered 404 for a single-element request.
    #[error("resource not found at {path}")]
    NotFound { path: String },

    /// The remote service answered a non-success status that is not handled
    /// as a validation rejection.
    #[error("request failed with status {status} for {path}")]
    RequestFailed { status: u16, path: String },

    /// An element operation (update, destroy, reload) needs a persisted id.
    #[error("record has no id")]
    MissingId,

    /// Construction was handed something other than an attribute map.
    #[error("expected an attribute map, got {0}")]
    InvalidAttributes(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// An ordered multiset of `(field, message)` validation errors.
///
/// Cleared at the start of every validation pass; also absorbs remote
/// messages when the service rejects a save with a validation status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationErrors {
    entries: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.entries.push((field.into(), message.into()));
    }

    /// Records a message not tied to any one field.
    pub fn add_to_base(&mut self, message: impl Into<String>) {
        self.add("base", message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded against one field, in insertion order.
    pub fn on(&self, field: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `"field message"` per entry, in insertion order.
    pub fn full_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(f, m)| {
                if f == "base" {
                    m.clone()
                } else {
                    format!("{f} {m}")
                }
            })
            .collect()
    }
}
