//! Muzak Core Library
//!
//! This crate provides the fundamental types, traits, and error handling
//! shared by the Muzak library manager and its query language (MQL).
//!
//! # Modules
//!
//! - `record` - Record identifiers and records
//! - `tag` - Label to value metadata attached to a record
//! - `value` - Values returned by metadata properties
//! - `storage` - The storage collaborator consumed by the query engine
//! - `error` - Error types and result aliases

pub mod error;
pub mod record;
pub mod storage;
pub mod tag;
pub mod value;

pub use error::{Error, QueryError, Result};
pub use record::{Record, RecordId};
pub use storage::Storage;
pub use tag::{Assignments, Tag};
pub use value::PropertyValue;
