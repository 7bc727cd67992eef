//! Tag metadata
//!
//! A tag maps lowercase labels (`artist`, `album`, `title`, ...) to optional
//! string values. A label mapped to `None` renders as null and is treated as
//! absent when matching.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// New label values applied by an update. `None` clears the label.
pub type Assignments = BTreeMap<String, Option<String>>;

/// Label to value metadata attached to one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag {
    fields: BTreeMap<String, Option<String>>,
}

impl Tag {
    /// Create an empty tag
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a label to a value
    pub fn with<K: Into<String>, V: Into<String>>(mut self, label: K, value: V) -> Self {
        self.set(label, value);
        self
    }

    /// Builder: set a label to null
    pub fn with_null<K: Into<String>>(mut self, label: K) -> Self {
        self.fields.insert(label.into(), None);
        self
    }

    /// Set a label to a value
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, label: K, value: V) {
        self.fields.insert(label.into(), Some(value.into()));
    }

    /// Insert a label with an optional value
    pub fn insert<K: Into<String>>(&mut self, label: K, value: Option<String>) {
        self.fields.insert(label.into(), value);
    }

    /// Remove a label, returning its previous value
    pub fn remove(&mut self, label: &str) -> Option<Option<String>> {
        self.fields.remove(label)
    }

    /// Get the value of a label, if present and non-null
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).and_then(|v| v.as_deref())
    }

    /// Returns true if the label exists, even with a null value
    pub fn contains_label(&self, label: &str) -> bool {
        self.fields.contains_key(label)
    }

    /// Iterate over labels in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over label/value pairs in sorted label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply update assignments in place. A `None` value removes the label.
    pub fn apply(&mut self, changes: &Assignments) {
        for (label, value) in changes {
            match value {
                Some(v) => self.set(label.clone(), v.clone()),
                None => {
                    self.fields.remove(label);
                }
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tag = Tag::new();
        for (k, v) in iter {
            tag.set(k, v);
        }
        tag
    }
}
