//! The token definition for the FIND language.

use serde::Serialize;

use crate::symbols::lookup_keyword;

/// A token is a single unit of the language, with a kind, the rule tag that
/// produced it, its literal text and its location in the original query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub tag: Tag,
    /// Lexeme with quotes (strings) or brackets (identifiers) removed.
    pub text: String,
    pub span: Span,
}

impl Token {
    /// Byte offset of the token in the original query.
    pub fn offset(&self) -> usize {
        self.span.start
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Spelling that lexes back to an equivalent token. Identifiers whose
    /// leading word is reserved are bracketed, `[day]` rather than `day`.
    pub fn to_source(&self) -> String {
        match self.tag {
            Tag::String if self.text.contains('\'') => format!("\"{}\"", self.text),
            Tag::String => format!("'{}'", self.text),
            Tag::Ident if shadowed_by_keyword(&self.text) => format!("[{}]", self.text),
            _ => self.text.clone(),
        }
    }
}

/// True when a bare `name` would lex as a keyword, or start with one.
fn shadowed_by_keyword(name: &str) -> bool {
    let word = name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    lookup_keyword(word).is_some()
}

/// The kind of a token. Literals share one kind and are told apart by [`Tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Literal,

    // Commands
    Find,
    Sort,
    Group,
    Distinct,
    All,
    Pipe,
    Matching,

    // Temporal clauses
    Since,
    Between,

    // Relative references
    Yesterday,
    Before,
    Last,
    Previous,
    Ago,
    Forever,

    // Clock units
    Second,
    Minute,
    Hour,

    // Calendar units
    Day,
    Week,
    Fortnight,
    Month,
    Quarter,
    Year,
    Century,

    // Weekdays
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,

    // Month names
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,

    // Punctuation
    Comma,  // ,
    LParen, // (
    RParen, // )

    // Operators
    Minus,        // -
    Plus,         // +
    Equal,        // = ==
    NotEqual,     // != <>
    Mul,          // *
    Div,          // / DIV
    Mod,          // % MOD
    LessEqual,    // <=
    GreaterEqual, // >=
    Less,         // <
    Greater,      // >
    And,
    Or,
    Not, // ! NOT
    Like,
    In,
    As,
}

/// The symbol rule a token was matched by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Command,
    CmdSpec,
    Command2,
    Pipe,
    Condition,
    Temporal,
    Relative,
    Clock,
    Clocks,
    Calendar,
    Calendars,
    Weekday,
    Weekdays,
    Months,
    Mon,
    Comma,
    LParen,
    RParen,
    Minus,
    Plus,
    Equal,
    NotEqual,
    Mul,
    Div,
    Mod,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    And,
    Or,
    Not,
    Like,
    In,
    Alias,
    String,
    Ident,
    Float,
    Int,
}

impl Tag {
    /// Literal tags carry a value instead of a keyword.
    pub fn is_literal(self) -> bool {
        matches!(self, Tag::String | Tag::Ident | Tag::Float | Tag::Int)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Tag::Float | Tag::Int)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Command => "command",
            Tag::CmdSpec => "cmdspec",
            Tag::Command2 => "command2",
            Tag::Pipe => "pipe",
            Tag::Condition => "condition",
            Tag::Temporal => "temporal",
            Tag::Relative => "relative",
            Tag::Clock => "clock",
            Tag::Clocks => "clocks",
            Tag::Calendar => "calendar",
            Tag::Calendars => "calendars",
            Tag::Weekday => "weekday",
            Tag::Weekdays => "weekdays",
            Tag::Months => "months",
            Tag::Mon => "mon",
            Tag::Comma => "comma",
            Tag::LParen => "lparen",
            Tag::RParen => "rparen",
            Tag::Minus => "minus",
            Tag::Plus => "plus",
            Tag::Equal => "equal",
            Tag::NotEqual => "not_equal",
            Tag::Mul => "mul",
            Tag::Div => "div",
            Tag::Mod => "mod",
            Tag::LessEqual => "less_equal",
            Tag::GreaterEqual => "greater_equal",
            Tag::Less => "less",
            Tag::Greater => "greater",
            Tag::And => "and",
            Tag::Or => "or",
            Tag::Not => "not",
            Tag::Like => "like",
            Tag::In => "in",
            Tag::Alias => "alias",
            Tag::String => "string",
            Tag::Ident => "ident",
            Tag::Float => "float",
            Tag::Int => "int",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
