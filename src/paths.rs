//! Remote path conventions.
//!
//! Collection path `/<plural>.<ext>`, element path `/<plural>/<id>.<ext>`,
//! both behind the schema's prefix template instantiated with the record's
//! prefix options.

use crate::attributes::AttributeStore;
use crate::schema::Schema;

/// `/test_resources.json`, or with a query: `/races.json?kind=5k`.
pub fn collection_path(
    schema: &Schema,
    prefix_options: &AttributeStore,
    query: &[(String, String)],
    extension: &str,
) -> String {
    format!(
        "{}/{}.{}{}",
        expand_prefix(schema, prefix_options),
        schema.collection(),
        extension,
        query_string(query)
    )
}

/// `/test_resources/1.json`.
pub fn element_path(
    schema: &Schema,
    id: i64,
    prefix_options: &AttributeStore,
    extension: &str,
) -> String {
    format!(
        "{}/{}/{}.{}",
        expand_prefix(schema, prefix_options),
        schema.collection(),
        id,
        extension
    )
}

/// Substitutes `:param` segments of the prefix template from the record's
/// prefix options. A missing option leaves the placeholder visible rather
/// than silently mangling the path.
fn expand_prefix(schema: &Schema, prefix_options: &AttributeStore) -> String {
    let Some(template) = schema.prefix() else {
        return String::new();
    };
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => prefix_options
                .get(param)
                .map(|v| encode(&v.scalar_string()))
                .unwrap_or_else(|| segment.to_string()),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn query_string(query: &[(String, String)]) -> String {
    if query.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect();
    format!("?{}", rendered.join("&"))
}

fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
