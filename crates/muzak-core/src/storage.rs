//! Storage collaborator
//!
//! The query engine never touches records directly. It reads a snapshot of
//! the record set through [`Storage`] and asks the storage to apply updates
//! and removals.

use crate::error::Result;
use crate::record::{Record, RecordId};
use crate::tag::Assignments;
use crate::value::PropertyValue;
use tracing::warn;

/// Record store queried and mutated by the MQL engine.
///
/// Methods take `&self`; implementations that mutate use interior
/// mutability so a single store can be shared behind an `Arc`.
pub trait Storage {
    /// Snapshot of every record, in the storage's native order.
    ///
    /// The order must be stable between calls while the store is unchanged.
    fn all_records(&self) -> Result<Vec<Record>>;

    /// Remove one record
    fn remove_record(&self, id: &RecordId) -> Result<()>;

    /// Apply label assignments to one record's tag
    fn update_record(&self, id: &RecordId, changes: &Assignments) -> Result<()>;

    /// Look up a metadata property by name. `None` if the name is unknown.
    fn get_property(&self, name: &str) -> Result<Option<PropertyValue>>;

    /// Remove several records, skipping any that fail.
    ///
    /// Returns the ids that were actually removed.
    fn remove_records(&self, ids: &[RecordId]) -> Vec<RecordId> {
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            match self.remove_record(id) {
                Ok(()) => removed.push(id.clone()),
                Err(e) => warn!("Skipping removal of {}: {}", id, e),
            }
        }
        removed
    }

    /// Update several records, skipping any that fail.
    ///
    /// Returns the ids that were actually updated.
    fn update_records(&self, ids: &[RecordId], changes: &Assignments) -> Vec<RecordId> {
        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            match self.update_record(id, changes) {
                Ok(()) => updated.push(id.clone()),
                Err(e) => warn!("Skipping update of {}: {}", id, e),
            }
        }
        updated
    }
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn all_records(&self) -> Result<Vec<Record>> {
        (**self).all_records()
    }

    fn remove_record(&self, id: &RecordId) -> Result<()> {
        (**self).remove_record(id)
    }

    fn update_record(&self, id: &RecordId, changes: &Assignments) -> Result<()> {
        (**self).update_record(id, changes)
    }

    fn get_property(&self, name: &str) -> Result<Option<PropertyValue>> {
        (**self).get_property(name)
    }

    fn remove_records(&self, ids: &[RecordId]) -> Vec<RecordId> {
        (**self).remove_records(ids)
    }

    fn update_records(&self, ids: &[RecordId], changes: &Assignments) -> Vec<RecordId> {
        (**self).update_records(ids, changes)
    }
}
