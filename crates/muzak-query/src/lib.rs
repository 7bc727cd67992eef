//! Muzak Query Language (MQL)
//!
//! Provides MQL parsing and execution.
//!
//! # Overview
//!
//! The query engine implements:
//! - Character classification and lexing into AST nodes
//! - LL(1) parsing into immutable [`Query`] descriptors
//! - Eager and strict target matching, projection and match-counted limits
//! - Best-effort update and delete over a [`muzak_core::Storage`]
//! - JSON and table rendering of results

pub mod ast;
pub mod classifier;
pub mod config;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod result;

pub use ast::{Node, NodeKind, WordKind};
pub use classifier::{TokenClass, classify};
pub use config::EngineConfig;
pub use executor::QueryExecutor;
pub use lexer::{Lexer, NULL_SENTINEL, tokenize};
pub use parser::{Parser, parse, parse_all};
pub use query::{Command, MatchMode, Query, Subject, Target, TargetValue};
pub use result::{ExecutionStats, QueryResult, ResultEntry, ResultItem};

/// Result type for lexing and parsing
pub type ParseResult<T> = std::result::Result<T, muzak_core::QueryError>;
