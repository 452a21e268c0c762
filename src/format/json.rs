//! JSON rendering of the wire document.

use serde_json::{json, Value as Json};

use super::{FormatError, WireFormat};

/// The bundled wire format: the tagged document rendered as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl WireFormat for JsonFormat {
    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, root: &str, tree: &Json) -> Result<Vec<u8>, FormatError> {
        serde_json::to_vec(&json!({ root: tree }))
            .map_err(|e| FormatError::Malformed(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Json, FormatError> {
        serde_json::from_slice(bytes).map_err(|e| FormatError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::unwrap_root;

    #[test]
    fn encodes_under_the_root_name() {
        let bytes = JsonFormat
            .encode("race", &json!({"id": 1, "name": "5k"}))
            .unwrap();
        let tree: Json = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(tree, json!({"race": {"id": 1, "name": "5k"}}));
    }

    #[test]
    fn decode_round_trips() {
        let tree = JsonFormat.decode(br#"{"race":{"id":1}}"#).unwrap();
        assert_eq!(unwrap_root(&tree), &json!({"id": 1}));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(JsonFormat.decode(b"<race/>").is_err());
    }

    #[test]
    fn unwrap_root_leaves_multi_key_trees_alone() {
        let tree = json!({"a": 1, "b": 2});
        assert_eq!(unwrap_root(&tree), &tree);
    }
}
