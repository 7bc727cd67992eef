//! Query engine configuration

use serde::{Deserialize, Serialize};

/// Record-id label used in result rows
pub const FILE_PATH_LABEL: &str = "file_path";

/// Library field name for the record path
pub const PATH_LABEL: &str = "path";

/// Query engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Labels that address the record identifier rather than the tag
    pub record_id_labels: Vec<String>,

    /// Limit applied to queries without a `limit` clause (0 = unbounded)
    pub default_limit: usize,

    /// Drop repeated result entries
    pub deduplicate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            record_id_labels: vec![FILE_PATH_LABEL.to_string(), PATH_LABEL.to_string()],
            default_limit: 0,
            deduplicate: true,
        }
    }
}

impl EngineConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration for tests: no implicit limit, `file_path` only
    pub fn for_testing() -> Self {
        Self {
            record_id_labels: vec![FILE_PATH_LABEL.to_string()],
            ..Default::default()
        }
    }

    /// Create configuration for interactive use, capping unbounded queries
    pub fn for_interactive(default_limit: usize) -> Self {
        Self {
            default_limit,
            ..Default::default()
        }
    }

    /// Builder: add a record-id label
    pub fn record_id_label(mut self, label: &str) -> Self {
        if !self.is_record_id_label(label) {
            self.record_id_labels.push(label.to_string());
        }
        self
    }

    /// Builder: set the default limit
    pub fn default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Builder: keep repeated result entries
    pub fn keep_duplicates(mut self) -> Self {
        self.deduplicate = false;
        self
    }

    /// Returns true if `label` addresses the record identifier
    pub fn is_record_id_label(&self, label: &str) -> bool {
        self.record_id_labels.iter().any(|l| l == label)
    }

    /// Limit in effect for a query stating `limit` (0 = none stated)
    pub fn effective_limit(&self, limit: usize) -> usize {
        if limit == 0 { self.default_limit } else { limit }
    }
}
