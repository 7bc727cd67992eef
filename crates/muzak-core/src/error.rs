//! Error types for Muzak
//!
//! Provides the MQL error taxonomy and the crate-wide error type.

use thiserror::Error;

/// Errors raised while lexing, parsing or evaluating an MQL query.
///
/// Lexer and parser variants are raised before any evaluation happens.
/// `UnknownCommand` and `UnknownProperty` are only detected by the engine,
/// since any word is syntactically acceptable as a command or property name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown character {ch:?} at position {position}")]
    UnknownCharacter { ch: char, position: usize },

    #[error("unterminated grouping at position {position}: expected '{expected}' near: {near}")]
    UnterminatedGrouping {
        expected: char,
        position: usize,
        near: String,
    },

    #[error("expected integer at position {position}, found {found:?}")]
    ExpectedInteger { found: String, position: usize },

    #[error("unexpected token '{found}' at position {position} near: {near}")]
    UnexpectedToken {
        found: String,
        position: usize,
        near: String,
    },

    #[error("expected {expected} but found {found} at position {position}")]
    UnexpectedNodeType {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("missing command at position {position}")]
    MissingCommand { position: usize },

    #[error("unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("unknown property: {property}")]
    UnknownProperty { property: String },

    #[error("duplicate key {label:?} in strict target at position {position}")]
    DuplicateStrictKey { label: String, position: usize },

    #[error("invalid assignment {item:?} at position {position}: expected label=value")]
    InvalidAssignment { item: String, position: usize },
}

impl QueryError {
    /// Name of the error variant, for user-facing rendering
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::UnknownCharacter { .. } => "UnknownCharacter",
            QueryError::UnterminatedGrouping { .. } => "UnterminatedGrouping",
            QueryError::ExpectedInteger { .. } => "ExpectedInteger",
            QueryError::UnexpectedToken { .. } => "UnexpectedToken",
            QueryError::UnexpectedNodeType { .. } => "UnexpectedNodeType",
            QueryError::MissingCommand { .. } => "MissingCommand",
            QueryError::UnknownCommand { .. } => "UnknownCommand",
            QueryError::UnknownProperty { .. } => "UnknownProperty",
            QueryError::DuplicateStrictKey { .. } => "DuplicateStrictKey",
            QueryError::InvalidAssignment { .. } => "InvalidAssignment",
        }
    }

    /// Character position of the offending fragment, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            QueryError::UnknownCharacter { position, .. }
            | QueryError::UnterminatedGrouping { position, .. }
            | QueryError::ExpectedInteger { position, .. }
            | QueryError::UnexpectedToken { position, .. }
            | QueryError::UnexpectedNodeType { position, .. }
            | QueryError::MissingCommand { position }
            | QueryError::DuplicateStrictKey { position, .. }
            | QueryError::InvalidAssignment { position, .. } => Some(*position),
            QueryError::UnknownCommand { .. } | QueryError::UnknownProperty { .. } => None,
        }
    }

    /// Returns true if this error was raised before evaluation
    pub fn is_syntax_error(&self) -> bool {
        !matches!(
            self,
            QueryError::UnknownCommand { .. } | QueryError::UnknownProperty { .. }
        )
    }
}

/// The main error type for Muzak operations
#[derive(Error, Debug)]
pub enum Error {
    // ========== Query Errors ==========
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    // ========== Storage Errors ==========
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ========== Serialization Errors ==========
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Muzak operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true if a batch operation may skip this error and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::RecordNotFound(_) | Error::Storage(_))
    }

    /// Returns the query error, if this is one
    pub fn as_query_error(&self) -> Option<&QueryError> {
        match self {
            Error::Query(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RecordNotFound("abc.mp3".to_string());
        assert_eq!(err.to_string(), "Record not found: abc.mp3");

        let err = QueryError::UnknownCommand {
            command: "frobnicate".to_string(),
        };
        assert_eq!(err.to_string(), "unknown command: frobnicate");
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::RecordNotFound("a".to_string()).is_recoverable());
        assert!(Error::Storage("disk".to_string()).is_recoverable());
        assert!(!Error::Internal("poisoned".to_string()).is_recoverable());
        assert!(
            !Error::from(QueryError::MissingCommand { position: 0 }).is_recoverable()
        );
    }

    #[test]
    fn test_query_error_kind_and_position() {
        let err = QueryError::UnterminatedGrouping {
            expected: ')',
            position: 7,
            near: "(title".to_string(),
        };
        assert_eq!(err.kind(), "UnterminatedGrouping");
        assert_eq!(err.position(), Some(7));
        assert!(err.is_syntax_error());

        let err = QueryError::UnknownProperty {
            property: "moods".to_string(),
        };
        assert_eq!(err.position(), None);
        assert!(!err.is_syntax_error());
    }

    #[test]
    fn test_as_query_error() {
        let err: Error = QueryError::MissingCommand { position: 3 }.into();
        assert!(matches!(
            err.as_query_error(),
            Some(QueryError::MissingCommand { position: 3 })
        ));
        assert!(Error::Internal("x".to_string()).as_query_error().is_none());
    }
}
