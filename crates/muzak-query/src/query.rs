//! Query descriptor
//!
//! A [`Query`] is what the parser hands to the executor. It is immutable once
//! built and can be evaluated any number of times against any storage.

use muzak_core::Assignments;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// MQL command
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Select,
    Update,
    Delete,
    Show,
    /// A leading word that is not a known command; rejected at evaluation
    Unknown(String),
}

impl Command {
    /// Resolve a command word, ignoring ASCII case
    pub fn from_word(word: &str) -> Option<Command> {
        match word.to_ascii_lowercase().as_str() {
            "select" => Some(Command::Select),
            "update" => Some(Command::Update),
            "delete" => Some(Command::Delete),
            "show" => Some(Command::Show),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Select => "select",
            Command::Update => "update",
            Command::Delete => "delete",
            Command::Show => "show",
            Command::Unknown(word) => word,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a target decides membership
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// Any satisfied label matches; repeated labels accept any of their values
    #[default]
    Eager,
    /// Every label/value pair must hold
    Strict,
}

/// Value accepted by a target label
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetValue {
    /// The `\Null` sentinel: the label must be missing or null
    Absent,
    /// The label must equal this text
    Value(String),
}

impl TargetValue {
    /// Returns true if a record value satisfies this target value.
    ///
    /// `Absent` accepts a missing label and a label stored as null alike.
    pub fn accepts(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (TargetValue::Absent, None) => true,
            (TargetValue::Value(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }
}

impl From<&str> for TargetValue {
    fn from(s: &str) -> Self {
        TargetValue::Value(s.to_string())
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetValue::Absent => write!(f, "\\Null"),
            TargetValue::Value(v) => write!(f, "{}", v),
        }
    }
}

/// The `where` clause filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// `{label=value,...}`: each label accepts a set of values
    Eager(BTreeMap<String, BTreeSet<TargetValue>>),
    /// `&{label=value,...}`: each label requires exactly one value
    Strict(BTreeMap<String, TargetValue>),
}

impl Default for Target {
    fn default() -> Self {
        Target::Eager(BTreeMap::new())
    }
}

impl Target {
    pub fn mode(&self) -> MatchMode {
        match self {
            Target::Eager(_) => MatchMode::Eager,
            Target::Strict(_) => MatchMode::Strict,
        }
    }

    /// An empty target matches every record
    pub fn is_empty(&self) -> bool {
        match self {
            Target::Eager(map) => map.is_empty(),
            Target::Strict(map) => map.is_empty(),
        }
    }

    /// Number of labels constrained by this target
    pub fn len(&self) -> usize {
        match self {
            Target::Eager(map) => map.len(),
            Target::Strict(map) => map.len(),
        }
    }
}

/// What a query acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    /// Labels to project; empty projects the whole tag
    Projection(Vec<String>),
    /// New label values for `update`
    Assignment(Assignments),
    /// Property name for `show`
    Property(String),
}

impl Subject {
    /// Projection that keeps every label
    pub fn all() -> Self {
        Subject::Projection(Vec::new())
    }
}

/// A parsed MQL query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub command: Command,
    pub subject: Subject,
    pub target: Target,
    /// Maximum number of matches; 0 is unbounded
    pub limit: usize,
}

impl Query {
    /// Create an unconditional, unbounded query
    pub fn new(command: Command, subject: Subject) -> Self {
        Self {
            command,
            subject,
            target: Target::default(),
            limit: 0,
        }
    }

    /// Builder: set the target
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Builder: set the limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn match_mode(&self) -> MatchMode {
        self.target.mode()
    }
}
