//! Code-to-label tables for discrete properties.

use std::collections::BTreeMap;

/// Maps integer codes of a discrete property to labels, in code order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupTable {
    entries: BTreeMap<i64, String>,
}

impl LookupTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the label for `code`. Returns the previous label.
    pub fn insert(&mut self, code: i64, label: impl Into<String>) -> Option<String> {
        self.entries.insert(code, label.into())
    }

    /// Label for `code`.
    pub fn label(&self, code: i64) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    /// First code carrying `label`.
    pub fn code(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find_map(|(&c, l)| (l == label).then_some(c))
    }

    /// `true` when `code` has a label.
    pub fn contains(&self, code: i64) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the table has no codes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(code, label)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(&c, l)| (c, l.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (i64, S)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(c, l)| (c, l.into())).collect(),
        }
    }
}
