//! Dynamic finder dispatch.
//!
//! Class-level calls shaped like `find_by_<field>` or `find_all_by_<field>`
//! translate into generic remote finds with a `{field: value}` filter.
//! The pattern is fixed; nothing else dispatches dynamically.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::Record;

static FINDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^find_(?:(all)_?)?by_([a-zA-Z0-9_]+)$").expect("finder pattern"));

/// A parsed finder call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FinderCall {
    /// `find_by_<field>`: first match.
    First(String),
    /// `find_all_by_<field>`: every match.
    All(String),
}

pub(crate) fn parse(method: &str) -> Option<FinderCall> {
    let caps = FINDER_PATTERN.captures(method)?;
    let field = caps.get(2)?.as_str().to_string();
    if caps.get(1).is_some() {
        Some(FinderCall::All(field))
    } else {
        Some(FinderCall::First(field))
    }
}

/// Result of a dynamic finder call.
#[derive(Debug)]
pub enum Found {
    One(Option<Record>),
    Many(Vec<Record>),
}

impl Found {
    /// The single match, or the first of many.
    pub fn one(self) -> Option<Record> {
        match self {
            Found::One(record) => record,
            Found::Many(records) => records.into_iter().next(),
        }
    }

    /// Every match; a single match becomes a one-element list.
    pub fn many(self) -> Vec<Record> {
        match self {
            Found::One(record) => record.into_iter().collect(),
            Found::Many(records) => records,
        }
    }
}
