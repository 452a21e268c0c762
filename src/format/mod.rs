//! The wire-format seam.
//!
//! The remote service speaks a tagged hierarchical document whose root is
//! named after the resource. Which concrete syntax carries that document is
//! a collaborator concern behind [`WireFormat`]; the bundled implementation
//! is [`JsonFormat`]. The massaging rules that shape the document (belongs-to
//! objects become `_id` fields, `*_ids` fields are dropped) belong to the
//! record serializer, not the format.

use serde_json::Value as Json;
use thiserror::Error;

pub mod json;

pub use json::JsonFormat;

/// Errors from encoding or decoding a wire document.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed wire document: {0}")]
    Malformed(String),
}

/// Encodes and decodes the tagged document the remote service speaks.
pub trait WireFormat: Send + Sync {
    /// MIME type sent as the request content type.
    fn mime_type(&self) -> &'static str;

    /// Path extension for collection and element paths, e.g. `json`.
    fn extension(&self) -> &'static str;

    /// Wraps `tree` under a root named `root` and renders it to bytes.
    fn encode(&self, root: &str, tree: &Json) -> Result<Vec<u8>, FormatError>;

    /// Parses bytes into a document tree, root element included.
    fn decode(&self, bytes: &[u8]) -> Result<Json, FormatError>;
}

/// Unwraps the single root element of a decoded document.
///
/// A document of the shape `{"race": {...}}` yields the inner value; a tree
/// that is not a single-key object is returned as is.
pub fn unwrap_root(tree: &Json) -> &Json {
    if let Json::Object(map) = tree {
        if map.len() == 1 {
            if let Some(inner) = map.values().next() {
                return inner;
            }
        }
    }
    tree
}
