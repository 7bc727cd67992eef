//! Query results
//!
//! A [`QueryResult`] is a plain value. Its JSON and table renderings are both
//! views over the same `result_set`.

use muzak_core::{PropertyValue, RecordId, Result, Tag};
use serde::{Deserialize, Serialize};
use tabled::{builder::Builder, settings::Style};

/// Cell text for a missing or null value
const NULL_CELL: &str = "-";

/// One matched record and its projected tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultEntry {
    pub id: RecordId,
    pub tag: Tag,
}

impl ResultEntry {
    pub fn new(id: RecordId, tag: Tag) -> Self {
        Self { id, tag }
    }
}

/// Element of a result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultItem {
    /// Record entry produced by select and delete
    Record(ResultEntry),
    /// Property value produced by show
    Property {
        property: String,
        value: PropertyValue,
    },
}

/// Execution statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    /// Records evaluated before the scan finished or hit the limit
    pub records_scanned: usize,
    /// Records that satisfied the target
    pub records_matched: usize,
    /// Records storage actually updated or removed
    pub records_changed: usize,
}

/// Query execution result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Entries in storage order
    pub result_set: Vec<ResultItem>,

    /// Projected labels in the order requested; empty when every label is kept
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,

    /// Records changed by update or delete
    pub changed: Vec<RecordId>,

    /// Execution statistics
    pub stats: ExecutionStats,
}

impl QueryResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Result holding a single property value
    pub fn property(name: &str, value: PropertyValue) -> Self {
        Self {
            result_set: vec![ResultItem::Property {
                property: name.to_string(),
                value,
            }],
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.result_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result_set.is_empty()
    }

    /// Number of records changed
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }

    /// Record entries, skipping property items
    pub fn entries(&self) -> impl Iterator<Item = &ResultEntry> {
        self.result_set.iter().filter_map(|item| match item {
            ResultItem::Record(entry) => Some(entry),
            ResultItem::Property { .. } => None,
        })
    }

    /// Value of the first property item, if any
    pub fn property_value(&self) -> Option<&PropertyValue> {
        self.result_set.iter().find_map(|item| match item {
            ResultItem::Property { value, .. } => Some(value),
            ResultItem::Record(_) => None,
        })
    }

    /// Flat structured form: `[{id, tag}]` or `[{property, value}]`
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.result_set)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.result_set)?)
    }

    /// Projected labels, or every label across all entries in first-seen order
    pub fn headers(&self) -> Vec<String> {
        if !self.columns.is_empty() {
            return self.columns.clone();
        }

        let mut headers: Vec<String> = Vec::new();
        for entry in self.entries() {
            for label in entry.tag.labels() {
                if !headers.iter().any(|h| h == label) {
                    headers.push(label.to_string());
                }
            }
        }
        headers
    }

    /// Tabular form
    pub fn to_table(&self) -> String {
        if self.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        let labels = self.headers();

        if self.entries().next().is_some() {
            let mut header = vec!["id".to_string()];
            header.extend(labels.iter().cloned());
            builder.push_record(header);

            for entry in self.entries() {
                let mut row = vec![entry.id.to_string()];
                row.extend(
                    labels
                        .iter()
                        .map(|label| entry.tag.get(label).unwrap_or(NULL_CELL).to_string()),
                );
                builder.push_record(row);
            }
        } else {
            builder.push_record(["property", "value"]);
            for item in &self.result_set {
                if let ResultItem::Property { property, value } = item {
                    builder.push_record([property.clone(), value.to_string()]);
                }
            }
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}
