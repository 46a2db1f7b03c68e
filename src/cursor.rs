//! Forward-only cursor over a token slice.
//!
//! The parser and the clause resolvers share one [`Cursor`]. Each grammar
//! decision looks at most two tokens past the current one (`DAY BEFORE YESTERDAY`,
//! `3 HOURS AGO`), then consumes the whole construct at once with
//! [`Cursor::advance_by`]. Nothing ever moves the position back.
//!
//! Errors are reported through [`Cursor::location`]: the byte offset of the
//! current token in the query as typed, plus the rest of the query from
//! there, or the end of the query once the tokens run out.

use crate::error::Location;
use crate::token::{Token, TokenKind};

/// The parse state of one statement: the query text, its tokens and a
/// position that only ever moves forward.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    query: &'a str,
    tokens: &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(query: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            query,
            tokens,
            position: 0,
        }
    }

    /// Returns the current token without advancing.
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    /// Returns the token `n` places after the current one without advancing.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    /// Kind of the current token.
    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub fn peek_kind_nth(&self, n: usize) -> Option<TokenKind> {
        self.peek_nth(n).map(|t| t.kind)
    }

    /// Checks whether the current token is of the given kind.
    pub fn is_at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Returns the current token and advances.
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Skips `n` tokens, stopping at the end of input.
    pub fn advance_by(&mut self, n: usize) {
        self.position = (self.position + n).min(self.tokens.len());
    }

    /// Advances past the current token if it is of the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.is_at(kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// True once every token of the statement is consumed.
    pub fn at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// Location of the current token, or of the end of the query.
    pub fn location(&self) -> Location {
        self.location_nth(0)
    }

    /// Location of the token `n` places ahead, or of the end of the query.
    pub fn location_nth(&self, n: usize) -> Location {
        let offset = self
            .peek_nth(n)
            .map_or(self.query.len(), |token| token.offset());
        Location::at(self.query, offset)
    }
}
