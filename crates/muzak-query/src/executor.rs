//! Query Execution Engine
//!
//! Evaluates [`Query`] descriptors against a [`Storage`]. Select is the
//! evaluation primitive; update and delete run a select first and then ask
//! storage to apply the change to each candidate. The write phase is best
//! effort: records storage fails to change are skipped, not rolled back.

use crate::config::EngineConfig;
use crate::parser::parse_all;
use crate::query::{Command, Query, Subject, Target, TargetValue};
use crate::result::{ExecutionStats, QueryResult, ResultEntry, ResultItem};
use muzak_core::{Error, QueryError, Record, RecordId, Result, Storage, Tag};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of the select phase
struct Selection {
    entries: Vec<ResultEntry>,
    ids: Vec<RecordId>,
    stats: ExecutionStats,
}

/// Query executor
pub struct QueryExecutor<S: Storage> {
    storage: Arc<S>,
    config: EngineConfig,
}

impl<S: Storage> QueryExecutor<S> {
    /// Create an executor with the default configuration
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, EngineConfig::default())
    }

    pub fn with_config(storage: Arc<S>, config: EngineConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Execute every query in `text` and return the last result.
    ///
    /// All queries are parsed before any runs, so a syntax error anywhere in
    /// the buffer leaves storage untouched.
    pub fn execute(&self, text: &str) -> Result<QueryResult> {
        let mut last = QueryResult::new();
        for query in parse_all(text)? {
            last = self.run(&query)?;
        }
        Ok(last)
    }

    /// Execute every query in `text`, one result per query
    pub fn execute_all(&self, text: &str) -> Result<Vec<QueryResult>> {
        let queries = parse_all(text)?;
        queries.iter().map(|query| self.run(query)).collect()
    }

    /// Evaluate a parsed query
    pub fn run(&self, query: &Query) -> Result<QueryResult> {
        let start = Instant::now();

        let result = match &query.command {
            Command::Select => self.execute_select(query)?,
            Command::Update => self.execute_update(query)?,
            Command::Delete => self.execute_delete(query)?,
            Command::Show => self.execute_show(query)?,
            Command::Unknown(word) => {
                return Err(QueryError::UnknownCommand {
                    command: word.clone(),
                }
                .into());
            }
        };

        debug!(
            "Evaluated {} in {:?}: {} scanned, {} matched, {} changed",
            query.command,
            start.elapsed(),
            result.stats.records_scanned,
            result.stats.records_matched,
            result.stats.records_changed
        );

        Ok(result)
    }

    fn execute_select(&self, query: &Query) -> Result<QueryResult> {
        let labels = projection(&query.subject);
        let selection = self.select(query, labels)?;
        Ok(QueryResult {
            result_set: selection.entries.into_iter().map(ResultItem::Record).collect(),
            columns: labels.to_vec(),
            changed: Vec::new(),
            stats: selection.stats,
        })
    }

    fn execute_update(&self, query: &Query) -> Result<QueryResult> {
        let Subject::Assignment(changes) = &query.subject else {
            return Err(Error::Internal(format!(
                "update requires assignments, got {:?}",
                query.subject
            )));
        };

        let mut selection = self.select(query, &[])?;
        let changed = if changes.is_empty() {
            Vec::new()
        } else {
            self.storage.update_records(&selection.ids, changes)
        };
        selection.stats.records_changed = changed.len();

        info!(
            "Updated {} of {} matched records",
            changed.len(),
            selection.ids.len()
        );

        Ok(QueryResult {
            result_set: Vec::new(),
            columns: Vec::new(),
            changed,
            stats: selection.stats,
        })
    }

    fn execute_delete(&self, query: &Query) -> Result<QueryResult> {
        let labels = projection(&query.subject);
        let mut selection = self.select(query, labels)?;
        let changed = self.storage.remove_records(&selection.ids);
        selection.stats.records_changed = changed.len();

        info!(
            "Deleted {} of {} matched records",
            changed.len(),
            selection.ids.len()
        );

        Ok(QueryResult {
            result_set: selection.entries.into_iter().map(ResultItem::Record).collect(),
            columns: labels.to_vec(),
            changed,
            stats: selection.stats,
        })
    }

    fn execute_show(&self, query: &Query) -> Result<QueryResult> {
        let Subject::Property(name) = &query.subject else {
            return Err(Error::Internal(format!(
                "show requires a property name, got {:?}",
                query.subject
            )));
        };

        match self.storage.get_property(name)? {
            Some(value) => Ok(QueryResult::property(name, value)),
            None => Err(QueryError::UnknownProperty {
                property: name.clone(),
            }
            .into()),
        }
    }

    /// Scan storage in its native order, collecting matches until the limit
    fn select(&self, query: &Query, labels: &[String]) -> Result<Selection> {
        let limit = self.config.effective_limit(query.limit);
        let mut selection = Selection {
            entries: Vec::new(),
            ids: Vec::new(),
            stats: ExecutionStats::default(),
        };
        let mut seen = HashSet::new();

        for record in self.storage.all_records()? {
            selection.stats.records_scanned += 1;
            if !self.matches(&query.target, &record) {
                continue;
            }
            selection.stats.records_matched += 1;

            let entry = ResultEntry::new(record.id.clone(), self.project(&record, labels));
            if !self.config.deduplicate || seen.insert(entry.clone()) {
                selection.entries.push(entry);
            }
            if !selection.ids.contains(&record.id) {
                selection.ids.push(record.id);
            }

            if limit > 0 && selection.stats.records_matched >= limit {
                break;
            }
        }

        Ok(selection)
    }

    /// Returns true if the record satisfies the target
    pub fn matches(&self, target: &Target, record: &Record) -> bool {
        match target {
            Target::Eager(labels) => {
                labels.is_empty()
                    || labels.iter().any(|(label, values)| {
                        values.iter().any(|value| self.satisfies(record, label, value))
                    })
            }
            Target::Strict(pairs) => pairs
                .iter()
                .all(|(label, value)| self.satisfies(record, label, value)),
        }
    }

    fn satisfies(&self, record: &Record, label: &str, value: &TargetValue) -> bool {
        value.accepts(record.tag.get(label))
            || (self.config.is_record_id_label(label) && value.accepts(Some(record.id.as_str())))
    }

    /// Project a record's tag onto `labels`; empty keeps the whole tag
    fn project(&self, record: &Record, labels: &[String]) -> Tag {
        if labels.is_empty() {
            return record.tag.clone();
        }

        let mut tag = Tag::new();
        for label in labels {
            let value = match record.tag.get(label) {
                Some(value) => Some(value.to_string()),
                None if self.config.is_record_id_label(label) => Some(record.id.to_string()),
                None => None,
            };
            tag.insert(label.as_str(), value);
        }
        tag
    }
}

fn projection(subject: &Subject) -> &[String] {
    match subject {
        Subject::Projection(labels) => labels,
        Subject::Assignment(_) | Subject::Property(_) => &[],
    }
}
