//! Name inflection for association and field derivation.
//!
//! Declarations name associations the way the remote service does
//! (`races`, `gender`, `enrollment`); everything else — `race_ids`,
//! `gender_id`, `test_resource_id` — is derived here. The rule set is the
//! small closed subset of English inflection the wire conventions need, not
//! a general inflector.

/// `race` -> `races`, `residency` -> `residencies`, `match` -> `matches`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !ends_with_vowel(stem) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Inverse of [`pluralize`] for the forms it produces.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if stem.ends_with('s')
            || stem.ends_with('x')
            || stem.ends_with('z')
            || stem.ends_with("ch")
            || stem.ends_with("sh")
        {
            return stem.to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// `gender` -> `gender_id`.
pub fn id_field(name: &str) -> String {
    format!("{name}_id")
}

/// `races` -> `race_ids`.
pub fn ids_field(plural: &str) -> String {
    format!("{}_ids", singularize(plural))
}

/// Chops a trailing `_id` or `_ids` off a field name.
pub fn strip_id_suffix(name: &str) -> &str {
    name.strip_suffix("_ids")
        .or_else(|| name.strip_suffix("_id"))
        .unwrap_or(name)
}

fn ends_with_vowel(s: &str) -> bool {
    matches!(s.chars().last(), Some('a' | 'e' | 'i' | 'o' | 'u'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pluralizes() {
        assert_eq!(pluralize("race"), "races");
        assert_eq!(pluralize("enrollment"), "enrollments");
        assert_eq!(pluralize("residency"), "residencies");
        assert_eq!(pluralize("match"), "matches");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("day"), "days");
    }

    #[test]
    fn singularizes() {
        assert_eq!(singularize("races"), "race");
        assert_eq!(singularize("enrollments"), "enrollment");
        assert_eq!(singularize("residencies"), "residency");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("dogs"), "dog");
        assert_eq!(singularize("class"), "class");
    }

    #[test]
    fn derives_id_fields() {
        assert_eq!(id_field("gender"), "gender_id");
        assert_eq!(ids_field("races"), "race_ids");
        assert_eq!(strip_id_suffix("gender_id"), "gender");
        assert_eq!(strip_id_suffix("race_ids"), "race");
        assert_eq!(strip_id_suffix("name"), "name");
    }
}
