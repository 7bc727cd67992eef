//! Character classifier using logos
//!
//! MQL is lexed one character at a time. Every accepted character belongs to
//! exactly one [`TokenClass`]; anything else is an `UnknownCharacter` error.

use logos::Logos;
use muzak_core::QueryError;

/// Class of a single query character
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Letters and the symbols allowed inside words
    #[regex(r"[a-zA-Z_/.~-]")]
    Letter,

    /// Backslash, used by the `\Null` sentinel
    #[token("\\")]
    Escape,

    #[regex(r"[0-9]")]
    Digit,

    #[regex(r"[ \t\r\n]")]
    Whitespace,

    #[token(",")]
    Comma,

    #[token("=")]
    Equal,

    /// Strict target prefix
    #[token("&")]
    Ampersand,

    #[token("*")]
    Wildcard,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    /// Query terminator `;`
    #[token(";")]
    Terminator,
}

impl TokenClass {
    /// Returns true if characters of this class may appear in a word
    pub fn is_word(self) -> bool {
        matches!(self, TokenClass::Letter | TokenClass::Escape)
    }

    /// Returns true for any grouping open/close character
    pub fn is_grouping(self) -> bool {
        matches!(
            self,
            TokenClass::OpenParen
                | TokenClass::CloseParen
                | TokenClass::OpenBracket
                | TokenClass::CloseBracket
                | TokenClass::OpenBrace
                | TokenClass::CloseBrace
        )
    }

    /// Closing class matching an opening class
    pub fn closer(self) -> Option<TokenClass> {
        match self {
            TokenClass::OpenParen => Some(TokenClass::CloseParen),
            TokenClass::OpenBracket => Some(TokenClass::CloseBracket),
            TokenClass::OpenBrace => Some(TokenClass::CloseBrace),
            _ => None,
        }
    }
}

/// Classify a single character
pub fn classify(ch: char) -> Result<TokenClass, QueryError> {
    let mut buf = [0u8; 4];
    let text = ch.encode_utf8(&mut buf);
    let mut lexer = TokenClass::lexer(text);
    match lexer.next() {
        Some(Ok(class)) if lexer.remainder().is_empty() => Ok(class),
        _ => Err(QueryError::UnknownCharacter { ch, position: 0 }),
    }
}

/// Classify every character of a query, in order
pub fn classify_all(input: &str) -> Result<Vec<(char, TokenClass)>, QueryError> {
    let mut classes = Vec::with_capacity(input.len());
    let mut lexer = TokenClass::lexer(input);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let ch = input[span.start..].chars().next().unwrap_or('\u{fffd}');
        match result {
            Ok(class) => classes.push((ch, class)),
            Err(()) => {
                return Err(QueryError::UnknownCharacter {
                    ch,
                    position: input[..span.start].chars().count(),
                });
            }
        }
    }

    Ok(classes)
}
