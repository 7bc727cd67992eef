//! Muzak - music library manager
//!
//! This is the main library crate that re-exports the Muzak components.

pub use muzak_core as core;
pub use muzak_query as query;
pub use muzak_storage as storage;

// Re-export commonly used types
pub use muzak_core::{
    Assignments, Error, PropertyValue, QueryError, Record, RecordId, Result, Storage, Tag,
};

pub use muzak_query::{EngineConfig, Query, QueryExecutor, QueryResult, parse, parse_all};
pub use muzak_storage::MemoryStorage;
