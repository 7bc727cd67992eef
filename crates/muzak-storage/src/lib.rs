//! Muzak Storage
//!
//! In-memory implementation of the [`muzak_core::Storage`] collaborator.
//!
//! Records are kept in identifier order, which is the order queries iterate
//! them in. The metadata facet answers the properties read by `show`:
//!
//! - `labels` - sorted distinct labels across all tags
//! - `count` - number of records
//! - `paths` - record identifiers
//! - `artists`, `albums`, `genres` - sorted distinct values of that label

pub mod memory;

pub use memory::MemoryStorage;
