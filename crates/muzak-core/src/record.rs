//! Record identification types
//!
//! A record is a file path mapped to the tag read from that file.

use crate::tag::Tag;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a record: the file path of the track
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record ID from a path
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self(path.into())
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A record owned by storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// File path, unique within a storage
    pub id: RecordId,

    /// Metadata read from the file
    pub tag: Tag,
}

impl Record {
    /// Create a new record
    pub fn new<I: Into<RecordId>>(id: I, tag: Tag) -> Self {
        Self { id: id.into(), tag }
    }
}
