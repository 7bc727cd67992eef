//! In-memory storage engine

use muzak_core::{Assignments, Error, PropertyValue, Record, RecordId, Result, Storage, Tag};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Property names answered by [`MemoryStorage::get_property`]
pub mod property {
    pub const LABELS: &str = "labels";
    pub const COUNT: &str = "count";
    pub const PATHS: &str = "paths";
    pub const ARTISTS: &str = "artists";
    pub const ALBUMS: &str = "albums";
    pub const GENRES: &str = "genres";
}

/// Properties that list the distinct values of a single label
const VALUE_PROPERTIES: &[(&str, &str)] = &[
    (property::ARTISTS, "artist"),
    (property::ALBUMS, "album"),
    (property::GENRES, "genre"),
];

/// Record store held in memory, ordered by record identifier
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<BTreeMap<RecordId, Tag>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records
    pub fn from_records<I: IntoIterator<Item = Record>>(records: I) -> Self {
        let map = records.into_iter().map(|r| (r.id, r.tag)).collect();
        Self {
            records: RwLock::new(map),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<RecordId, Tag>>> {
        self.records
            .read()
            .map_err(|e| Error::Internal(format!("Record lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<RecordId, Tag>>> {
        self.records
            .write()
            .map_err(|e| Error::Internal(format!("Record lock poisoned: {}", e)))
    }

    /// Insert or replace a record, returning the previous tag
    pub fn insert(&self, record: Record) -> Result<Option<Tag>> {
        debug!("Storing record {}", record.id);
        Ok(self.write()?.insert(record.id, record.tag))
    }

    /// Get a copy of a record's tag
    pub fn get(&self, id: &RecordId) -> Result<Option<Tag>> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Number of records
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Sorted distinct labels across every tag
    pub fn labels(&self) -> Result<Vec<String>> {
        let records = self.read()?;
        let labels: BTreeSet<&str> = records.values().flat_map(|tag| tag.labels()).collect();
        Ok(labels.into_iter().map(str::to_string).collect())
    }

    /// Sorted distinct non-null values of one label
    pub fn distinct_values(&self, label: &str) -> Result<Vec<String>> {
        let records = self.read()?;
        let values: BTreeSet<&str> = records.values().filter_map(|tag| tag.get(label)).collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }
}

impl FromIterator<Record> for MemoryStorage {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

impl Storage for MemoryStorage {
    fn all_records(&self) -> Result<Vec<Record>> {
        Ok(self
            .read()?
            .iter()
            .map(|(id, tag)| Record::new(id.clone(), tag.clone()))
            .collect())
    }

    fn remove_record(&self, id: &RecordId) -> Result<()> {
        match self.write()?.remove(id) {
            Some(_) => {
                info!("Removed record {}", id);
                Ok(())
            }
            None => Err(Error::RecordNotFound(id.to_string())),
        }
    }

    fn update_record(&self, id: &RecordId, changes: &Assignments) -> Result<()> {
        let mut records = self.write()?;
        let tag = records
            .get_mut(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        tag.apply(changes);
        info!("Updated record {} ({} labels changed)", id, changes.len());
        Ok(())
    }

    fn get_property(&self, name: &str) -> Result<Option<PropertyValue>> {
        let value = match name {
            property::LABELS => PropertyValue::from(self.labels()?),
            property::COUNT => PropertyValue::from(self.len()?),
            property::PATHS => {
                let paths: Vec<String> = self.read()?.keys().map(|id| id.to_string()).collect();
                PropertyValue::from(paths)
            }
            _ => match VALUE_PROPERTIES.iter().find(|(p, _)| *p == name) {
                Some((_, label)) => PropertyValue::from(self.distinct_values(label)?),
                None => return Ok(None),
            },
        };
        Ok(Some(value))
    }
}
