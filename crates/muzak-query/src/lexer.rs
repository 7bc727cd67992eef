//! MQL lexer
//!
//! Turns query text into a flat sequence of AST [`Node`]s: words, integers,
//! collections, targets and terminators. Collections and targets are lexed
//! whole, so the parser only ever looks at one node at a time.

use crate::ast::{Node, NodeKind, WordKind};
use crate::classifier::{TokenClass, classify_all};
use crate::query::{Target, TargetValue};
use crate::ParseResult;
use muzak_core::QueryError;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Literal value text of the null sentinel
pub const NULL_SENTINEL: &str = "\\Null";

/// Number of characters of context included in error messages
const CONTEXT_LEN: usize = 24;

/// Tokenize a query string into AST nodes
pub fn tokenize(input: &str) -> ParseResult<Vec<Node>> {
    Lexer::new(input)?.run()
}

/// Cursor over classified query characters
pub struct Lexer {
    chars: Vec<(char, TokenClass)>,
    position: usize,
}

impl Lexer {
    /// Classify the input. Fails on the first unknown character.
    pub fn new(input: &str) -> ParseResult<Self> {
        Ok(Lexer {
            chars: classify_all(input)?,
            position: 0,
        })
    }

    fn peek_class(&self) -> Option<TokenClass> {
        self.chars.get(self.position).map(|(_, class)| *class)
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.position).map(|(ch, _)| *ch)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek_char();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while self.peek_class() == Some(TokenClass::Whitespace) {
            self.advance();
        }
    }

    /// Input text starting at `position`, for error context
    fn near(&self, position: usize) -> String {
        self.chars
            .iter()
            .skip(position)
            .take(CONTEXT_LEN)
            .map(|(ch, _)| *ch)
            .collect()
    }

    fn found(&self) -> String {
        match self.peek_char() {
            Some(ch) => ch.to_string(),
            None => "end of input".to_string(),
        }
    }

    fn unexpected(&self) -> QueryError {
        QueryError::UnexpectedToken {
            found: self.found(),
            position: self.position,
            near: self.near(self.position),
        }
    }

    fn unterminated(&self, expected: char, start: usize) -> QueryError {
        QueryError::UnterminatedGrouping {
            expected,
            position: start,
            near: self.near(start),
        }
    }

    /// Consume characters while `accept` holds for their class
    fn take_while<F: Fn(TokenClass) -> bool>(&mut self, accept: F) -> String {
        let mut text = String::new();
        while let Some(class) = self.peek_class() {
            if !accept(class) {
                break;
            }
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }
        text
    }

    /// Read a word. A single trailing space is consumed with it.
    fn read_word(&mut self) -> String {
        let word = self.take_while(|c| c.is_word() || c == TokenClass::Digit);
        if self.peek_char() == Some(' ') {
            self.advance();
        }
        word
    }

    fn read_integer(&mut self) -> ParseResult<u64> {
        let start = self.position;
        let digits = self.take_while(|c| c == TokenClass::Digit);

        if self.peek_class().is_some_and(TokenClass::is_word) {
            let rest = self.take_while(|c| c.is_word() || c == TokenClass::Digit);
            return Err(QueryError::ExpectedInteger {
                found: format!("{}{}", digits, rest),
                position: start,
            });
        }

        digits.parse().map_err(|_| QueryError::ExpectedInteger {
            found: digits.clone(),
            position: start,
        })
    }

    /// Read a `(...)` or `[...]` list of items
    fn read_collection(&mut self, opener: TokenClass) -> ParseResult<Vec<String>> {
        let start = self.position;
        let closer = opener.closer().unwrap_or(TokenClass::CloseParen);
        let expected = if closer == TokenClass::CloseBracket { ']' } else { ')' };
        self.advance();

        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek_class() {
                Some(class) if class == closer => {
                    self.advance();
                    break;
                }
                Some(TokenClass::Comma) => {
                    self.advance();
                }
                None | Some(TokenClass::Terminator) => {
                    return Err(self.unterminated(expected, start));
                }
                Some(class) if class.is_grouping() => {
                    return Err(self.unterminated(expected, start));
                }
                Some(_) => {
                    let item = self.take_while(|c| {
                        c != TokenClass::Comma && c != TokenClass::Terminator && !c.is_grouping()
                    });
                    let item = item.trim();
                    if !item.is_empty() {
                        items.push(item.to_string());
                    }
                }
            }
        }

        Ok(items)
    }

    /// Read one side of a `key=value` pair inside a target
    fn read_pair_part(&mut self) -> String {
        self.take_while(|c| c.is_word() || c == TokenClass::Digit || c == TokenClass::Whitespace)
            .trim()
            .to_string()
    }

    /// Read a `{...}` or `&{...}` target
    fn read_target(&mut self) -> ParseResult<Target> {
        let start = self.position;
        let strict = self.peek_class() == Some(TokenClass::Ampersand);
        if strict {
            self.advance();
        }
        if self.peek_class() != Some(TokenClass::OpenBrace) {
            return Err(self.unexpected());
        }
        self.advance();

        let mut eager: BTreeMap<String, BTreeSet<TargetValue>> = BTreeMap::new();
        let mut exact: BTreeMap<String, TargetValue> = BTreeMap::new();

        loop {
            self.skip_whitespace();
            match self.peek_class() {
                None => return Err(self.unterminated('}', start)),
                Some(TokenClass::CloseBrace) => {
                    self.advance();
                    break;
                }
                Some(TokenClass::Comma) => {
                    self.advance();
                    continue;
                }
                Some(_) => {}
            }

            let key_position = self.position;
            let key = self.read_pair_part();
            match self.peek_class() {
                None => return Err(self.unterminated('}', start)),
                Some(TokenClass::Equal) if !key.is_empty() => {
                    self.advance();
                }
                Some(_) => return Err(self.unexpected()),
            }

            let value = self.read_pair_part();
            match self.peek_class() {
                None => return Err(self.unterminated('}', start)),
                Some(TokenClass::Comma) | Some(TokenClass::CloseBrace) => {}
                Some(_) => return Err(self.unexpected()),
            }

            let value = if value == NULL_SENTINEL {
                TargetValue::Absent
            } else {
                TargetValue::Value(value)
            };

            if strict {
                if exact.contains_key(&key) {
                    return Err(QueryError::DuplicateStrictKey {
                        label: key,
                        position: key_position,
                    });
                }
                exact.insert(key, value);
            } else {
                eager.entry(key).or_default().insert(value);
            }
        }

        Ok(if strict {
            Target::Strict(exact)
        } else {
            Target::Eager(eager)
        })
    }

    /// Lex the whole input
    pub fn run(mut self) -> ParseResult<Vec<Node>> {
        let mut nodes = Vec::new();

        while let Some(class) = self.peek_class() {
            let position = self.position;
            let kind = match class {
                TokenClass::Whitespace => {
                    self.advance();
                    continue;
                }
                TokenClass::Letter | TokenClass::Escape => {
                    let word = self.read_word();
                    NodeKind::Word(WordKind::of(&word), word)
                }
                TokenClass::Digit => NodeKind::Integer(self.read_integer()?),
                TokenClass::OpenParen | TokenClass::OpenBracket => {
                    NodeKind::Collection(self.read_collection(class)?)
                }
                TokenClass::Ampersand | TokenClass::OpenBrace => {
                    NodeKind::Target(self.read_target()?)
                }
                TokenClass::Terminator => {
                    self.advance();
                    NodeKind::Terminator
                }
                _ => return Err(self.unexpected()),
            };

            trace!("Lexed {} at {}", kind.describe(), position);
            nodes.push(Node::new(kind, position));
        }

        Ok(nodes)
    }
}
