//! AST nodes produced by the lexer

use crate::query::Target;

/// Sub-classification of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    /// `select`, `update`, `delete`, `show`
    Command,
    /// `where`, `limit`
    Condition,
    /// Anything else: property names, unquoted text
    Generic,
}

impl WordKind {
    /// Classify a word, ignoring ASCII case for keywords
    pub fn of(word: &str) -> WordKind {
        match word.to_ascii_lowercase().as_str() {
            "select" | "update" | "delete" | "show" => WordKind::Command,
            "where" | "limit" => WordKind::Condition,
            _ => WordKind::Generic,
        }
    }
}

/// Kind and payload of an AST node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Word(WordKind, String),
    Integer(u64),
    /// Items of a `(...)` or `[...]` list
    Collection(Vec<String>),
    /// A `{...}` or `&{...}` target
    Target(Target),
    /// `;`
    Terminator,
}

impl NodeKind {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            NodeKind::Word(WordKind::Command, w) => format!("command '{}'", w),
            NodeKind::Word(WordKind::Condition, w) => format!("condition '{}'", w),
            NodeKind::Word(WordKind::Generic, w) => format!("word '{}'", w),
            NodeKind::Integer(i) => format!("integer {}", i),
            NodeKind::Collection(_) => "collection".to_string(),
            NodeKind::Target(_) => "target".to_string(),
            NodeKind::Terminator => "terminator".to_string(),
        }
    }
}

/// An AST node and the character position it started at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: usize,
}

impl Node {
    pub fn new(kind: NodeKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, NodeKind::Terminator)
    }
}
