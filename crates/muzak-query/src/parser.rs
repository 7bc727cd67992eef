//! MQL parser
//!
//! Recursive descent over the lexer's node sequence. Each step looks at one
//! node and never backtracks.

use crate::ParseResult;
use crate::ast::{Node, NodeKind, WordKind};
use crate::lexer::{NULL_SENTINEL, tokenize};
use crate::query::{Command, Query, Subject, Target};
use muzak_core::{Assignments, QueryError};
use tracing::debug;

/// Wildcard projection item
const WILDCARD: &str = "*";

/// Parse exactly one query. Trailing terminators are allowed.
pub fn parse(input: &str) -> ParseResult<Query> {
    let mut parser = Parser::new(tokenize(input)?);
    let query = parser.parse_query()?;
    parser.skip_terminators();
    match parser.next() {
        None => Ok(query),
        Some(node) => Err(QueryError::UnexpectedNodeType {
            expected: "end of input".to_string(),
            found: node.kind.describe(),
            position: node.position,
        }),
    }
}

/// Parse every `;`-separated query in a buffer
pub fn parse_all(input: &str) -> ParseResult<Vec<Query>> {
    Parser::new(tokenize(input)?).parse_all()
}

/// Parser over a node sequence
pub struct Parser {
    nodes: Vec<Node>,
    cursor: usize,
    end_position: usize,
}

impl Parser {
    pub fn new(nodes: Vec<Node>) -> Self {
        let end_position = nodes.last().map(|n| n.position + 1).unwrap_or(0);
        Self {
            nodes,
            cursor: 0,
            end_position,
        }
    }

    fn peek(&self) -> Option<&Node> {
        self.nodes.get(self.cursor)
    }

    fn next(&mut self) -> Option<Node> {
        let node = self.nodes.get(self.cursor).cloned();
        if node.is_some() {
            self.cursor += 1;
        }
        node
    }

    /// True at a terminator or at the end of the nodes
    fn at_query_end(&self) -> bool {
        self.peek().is_none_or(Node::is_terminator)
    }

    fn skip_terminators(&mut self) {
        while self.peek().is_some_and(Node::is_terminator) {
            self.cursor += 1;
        }
    }

    fn unexpected(&self, expected: &str, found: Option<Node>) -> QueryError {
        match found {
            Some(node) => QueryError::UnexpectedNodeType {
                expected: expected.to_string(),
                found: node.kind.describe(),
                position: node.position,
            },
            None => QueryError::UnexpectedNodeType {
                expected: expected.to_string(),
                found: "end of input".to_string(),
                position: self.end_position,
            },
        }
    }

    fn expect_generic_word(&mut self) -> ParseResult<String> {
        match self.next() {
            Some(Node {
                kind: NodeKind::Word(WordKind::Generic, word),
                ..
            }) => Ok(word),
            other => Err(self.unexpected("property name", other)),
        }
    }

    fn expect_collection(&mut self) -> ParseResult<(Vec<String>, usize)> {
        match self.next() {
            Some(Node {
                kind: NodeKind::Collection(items),
                position,
            }) => Ok((items, position)),
            other => Err(self.unexpected("collection", other)),
        }
    }

    fn expect_target(&mut self) -> ParseResult<Target> {
        match self.next() {
            Some(Node {
                kind: NodeKind::Target(target),
                ..
            }) => Ok(target),
            other => Err(self.unexpected("target", other)),
        }
    }

    fn expect_integer(&mut self) -> ParseResult<usize> {
        match self.next() {
            Some(Node {
                kind: NodeKind::Integer(value),
                position,
            }) => usize::try_from(value).map_err(|_| QueryError::ExpectedInteger {
                found: value.to_string(),
                position,
            }),
            other => Err(self.unexpected("integer", other)),
        }
    }

    fn parse_command(&mut self) -> ParseResult<Command> {
        match self.next() {
            Some(Node {
                kind: NodeKind::Word(WordKind::Command, word),
                position,
            }) => Command::from_word(&word).ok_or(QueryError::MissingCommand { position }),
            Some(Node {
                kind: NodeKind::Word(WordKind::Generic, word),
                ..
            }) => Ok(Command::Unknown(word)),
            Some(node) => Err(QueryError::MissingCommand {
                position: node.position,
            }),
            None => Err(QueryError::MissingCommand {
                position: self.end_position,
            }),
        }
    }

    fn parse_assignments(items: Vec<String>, position: usize) -> ParseResult<Assignments> {
        if items.is_empty() {
            return Err(QueryError::InvalidAssignment {
                item: String::new(),
                position,
            });
        }

        let mut assignments = Assignments::new();
        for item in items {
            let Some((label, value)) = item.split_once('=') else {
                return Err(QueryError::InvalidAssignment { item, position });
            };
            let label = label.trim();
            if label.is_empty() {
                return Err(QueryError::InvalidAssignment { item, position });
            }
            let value = value.trim();
            let value = (value != NULL_SENTINEL).then(|| value.to_string());
            assignments.insert(label.to_string(), value);
        }
        Ok(assignments)
    }

    fn parse_subject(&mut self, command: &Command) -> ParseResult<Subject> {
        if *command == Command::Show {
            return Ok(Subject::Property(self.expect_generic_word()?));
        }

        let (items, position) = self.expect_collection()?;
        if *command == Command::Update {
            return Ok(Subject::Assignment(Self::parse_assignments(items, position)?));
        }

        if items.iter().any(|item| item == WILDCARD) {
            Ok(Subject::all())
        } else {
            Ok(Subject::Projection(items))
        }
    }

    /// Parse one query, stopping at a terminator or the end of input
    pub fn parse_query(&mut self) -> ParseResult<Query> {
        let command = self.parse_command()?;
        let subject = self.parse_subject(&command)?;
        let mut query = Query::new(command, subject);

        if query.command == Command::Show {
            debug!("Parsed query {:?}", query);
            return Ok(query);
        }

        let mut seen_where = false;
        let mut seen_limit = false;
        while !self.at_query_end() {
            let node = self.next();
            let condition = match &node {
                Some(Node {
                    kind: NodeKind::Word(WordKind::Condition, word),
                    ..
                }) => word.to_ascii_lowercase(),
                _ => return Err(self.unexpected("condition", node)),
            };

            if condition == "where" && !seen_where {
                query.target = self.expect_target()?;
                seen_where = true;
            } else if condition == "limit" && !seen_limit {
                query.limit = self.expect_integer()?;
                seen_limit = true;
            } else {
                return Err(self.unexpected("terminator", node));
            }
        }

        debug!("Parsed query {:?}", query);
        Ok(query)
    }

    /// Parse queries until the nodes run out
    pub fn parse_all(&mut self) -> ParseResult<Vec<Query>> {
        let mut queries = Vec::new();
        loop {
            self.skip_terminators();
            if self.peek().is_none() {
                break;
            }
            queries.push(self.parse_query()?);
        }
        Ok(queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{MatchMode, TargetValue};
    use std::collections::{BTreeMap, BTreeSet};

    fn labels(items: &[&str]) -> Subject {
        Subject::Projection(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_parse_select() {
        let query = parse("select (title,artist) where {artist=Muse} limit 1").unwrap();

        let mut values = BTreeSet::new();
        values.insert(TargetValue::from("Muse"));
        let mut target = BTreeMap::new();
        target.insert("artist".to_string(), values);

        assert_eq!(
            query,
            Query::new(Command::Select, labels(&["title", "artist"]))
                .with_target(Target::Eager(target))
                .with_limit(1)
        );
        assert_eq!(query.match_mode(), MatchMode::Eager);
    }

    #[test]
    fn test_parse_select_without_conditions() {
        let query = parse("select [title,album]").unwrap();
        assert_eq!(query, Query::new(Command::Select, labels(&["title", "album"])));
        assert!(query.target.is_empty());
        assert_eq!(query.limit, 0);
    }

    #[test]
    fn test_parse_empty_and_wildcard_projection() {
        assert_eq!(parse("select ()").unwrap().subject, Subject::all());
        assert_eq!(parse("select (*)").unwrap().subject, Subject::all());
    }

    #[test]
    fn test_parse_show() {
        let query = parse("show labels").unwrap();
        assert_eq!(
            query,
            Query::new(Command::Show, Subject::Property("labels".to_string()))
        );
    }

    #[test]
    fn test_parse_show_requires_word() {
        let err = parse("show (labels)").unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnexpectedNodeType { ref expected, position: 5, .. } if expected == "property name"
        ));
    }

    #[test]
    fn test_parse_update_assignments() {
        let query = parse("update (title=New Title, isrc=\\Null) where {path=abc.mp3}").unwrap();

        let mut expected = Assignments::new();
        expected.insert("title".to_string(), Some("New Title".to_string()));
        expected.insert("isrc".to_string(), None);
        assert_eq!(query.command, Command::Update);
        assert_eq!(query.subject, Subject::Assignment(expected));
    }

    #[test]
    fn test_parse_update_rejects_bare_label() {
        let err = parse("update (title) where {album=Unknown}").unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidAssignment {
                item: "title".to_string(),
                position: 7,
            }
        );
    }

    #[test]
    fn test_parse_update_requires_assignments() {
        let err = parse("update () where {artist=Muse}").unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidAssignment {
                item: String::new(),
                position: 7,
            }
        );
        assert!(parse("update [ , ]").is_err());
    }

    #[test]
    fn test_parse_limit_before_where() {
        let query = parse("delete (title) limit 2 where &{album=Unknown}").unwrap();
        assert_eq!(query.command, Command::Delete);
        assert_eq!(query.limit, 2);
        assert_eq!(query.match_mode(), MatchMode::Strict);
    }

    #[test]
    fn test_parse_repeated_condition() {
        let err = parse("select () limit 1 limit 2").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedNodeType { position: 18, .. }));
    }

    #[test]
    fn test_parse_wrong_node_after_condition() {
        let err = parse("select (title) where (artist)").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnexpectedNodeType {
                expected: "target".to_string(),
                found: "collection".to_string(),
                position: 21,
            }
        );

        let err = parse("select (title) limit").unwrap_err();
        assert!(matches!(
            err,
            QueryError::UnexpectedNodeType { ref found, .. } if found == "end of input"
        ));
    }

    #[test]
    fn test_parse_missing_command() {
        assert_eq!(
            parse("").unwrap_err(),
            QueryError::MissingCommand { position: 0 }
        );
        assert_eq!(
            parse("(title) where {a=b}").unwrap_err(),
            QueryError::MissingCommand { position: 0 }
        );
        assert!(matches!(
            parse("where {a=b}").unwrap_err(),
            QueryError::MissingCommand { .. }
        ));
    }

    #[test]
    fn test_unknown_command_is_deferred() {
        let query = parse("insert (title)").unwrap();
        assert_eq!(query.command, Command::Unknown("insert".to_string()));
    }

    #[test]
    fn test_keywords_ignore_case() {
        let query = parse("SELECT (title) WHERE {artist=Muse} LIMIT 3").unwrap();
        assert_eq!(query.command, Command::Select);
        assert_eq!(query.limit, 3);
    }

    #[test]
    fn test_parse_rejects_trailing_query() {
        let err = parse("show labels; show count").unwrap_err();
        assert!(matches!(err, QueryError::UnexpectedNodeType { position: 13, .. }));
        assert!(parse("show labels;;").is_ok());
    }

    #[test]
    fn test_parse_all() {
        let queries =
            parse_all("show labels; select [title] where {genre=Rock} limit 2;; delete ()").unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0].command, Command::Show);
        assert_eq!(queries[1].limit, 2);
        assert_eq!(queries[2].command, Command::Delete);

        assert!(parse_all("").unwrap().is_empty());
        assert!(parse_all(" ; ;").unwrap().is_empty());
    }

    #[test]
    fn test_parse_all_fails_fast() {
        let err = parse_all("show labels; select (title").unwrap_err();
        assert!(matches!(err, QueryError::UnterminatedGrouping { .. }));
    }
}
