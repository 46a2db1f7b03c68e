//! Error types for lexing and parsing FIND statements.
//!
//! Every error carries a [`Location`]: the byte offset of the failing token in
//! the original query and the rest of the query from there on, so callers can
//! point into the text the user typed.

use serde::Serialize;

use crate::token::Tag;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub offset: usize,
    /// The original query from `offset` to the end.
    pub near: String,
}

impl Location {
    pub fn at(query: &str, offset: usize) -> Self {
        Self {
            offset,
            near: query.get(offset..).unwrap_or_default().to_string(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.near)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unknown token or unquoted string at '{location}'")]
    NoMatch { location: Location },

    /// A rule matched a keyword the keyword table does not know.
    #[error("lexer: {tag} token '{lexeme}' unknown in symbol table")]
    UnknownSymbol {
        tag: Tag,
        lexeme: String,
        location: Location,
    },
}

impl LexError {
    pub fn location(&self) -> &Location {
        match self {
            LexError::NoMatch { location } | LexError::UnknownSymbol { location, .. } => location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected statement at '{0}'")]
    ExpectedStatement(Location),

    #[error("expected field at '{0}'")]
    ExpectedField(Location),

    #[error("MATCHING clause cut short at '{0}'")]
    MatchingClauseTruncated(Location),

    #[error("expected comparison operator '=' at '{0}'")]
    ExpectedComparisonOperator(Location),

    #[error("missing AND in BETWEEN clause at '{0}'")]
    MissingAnd(Location),

    #[error("invalid temporal reference at '{0}'")]
    InvalidTemporalReference(Location),

    #[error("FIND statement cut short at '{0}'")]
    StatementTruncated(Location),

    #[error("expected temporal clause (SINCE or BETWEEN) at '{0}'")]
    MissingTemporalClause(Location),

    #[error("not an integer literal at '{0}'")]
    NotAnIntegerLiteral(Location),

    #[error("BEFORE YESTERDAY missing at '{0}'")]
    BeforeYesterdayMissing(Location),

    #[error("unexpected clause at '{0}'")]
    UnexpectedClause(Location),
}

impl ParseError {
    pub fn location(&self) -> &Location {
        match self {
            ParseError::Lex(err) => err.location(),
            ParseError::ExpectedStatement(location)
            | ParseError::ExpectedField(location)
            | ParseError::MatchingClauseTruncated(location)
            | ParseError::ExpectedComparisonOperator(location)
            | ParseError::MissingAnd(location)
            | ParseError::InvalidTemporalReference(location)
            | ParseError::StatementTruncated(location)
            | ParseError::MissingTemporalClause(location)
            | ParseError::NotAnIntegerLiteral(location)
            | ParseError::BeforeYesterdayMissing(location)
            | ParseError::UnexpectedClause(location) => location,
        }
    }

    pub fn offset(&self) -> usize {
        self.location().offset
    }

    /// True for faults in the static symbol tables rather than in the query.
    pub fn is_internal(&self) -> bool {
        matches!(self, ParseError::Lex(LexError::UnknownSymbol { .. }))
    }

    /// The error message, the query line holding the error and a caret under
    /// the offending position.
    pub fn render(&self, query: &str) -> String {
        // an offset past the end or inside a character points at the end
        let offset = match query.get(..self.offset()) {
            Some(_) => self.offset(),
            None => query.len(),
        };
        let line_start = query[..offset].rfind('\n').map_or(0, |i| i + 1);
        let line_end = query[offset..].find('\n').map_or(query.len(), |i| offset + i);
        let column = query[line_start..offset].chars().count();
        format!(
            "syntax error: {self}\n{}\n{}^",
            &query[line_start..line_end],
            " ".repeat(column)
        )
    }
}
