//! Front end of the FIND query language.
//!
//! ```text
//! FIND field[, field...] [MATCHING condition] SINCE|BETWEEN temporal-reference [| ...]
//! ```
//!
//! Query text goes through the [`lexer`], then the [`parser`] drives the
//! [`matching`] condition builder and the [`temporal`] resolver, producing an
//! [`ast::Query`] with a concrete time range in nanoseconds since the epoch.

pub mod ast;
pub mod config;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod matching;
pub mod parser;
pub mod symbols;
pub mod temporal;
pub mod token;

pub use ast::{
    CompareOp, ConjunctionGroup, DisjunctionGroup, FieldSpec, Predicate, Query, TimeRange, Value,
    ValueKind,
};
pub use error::{LexError, Location, ParseError};
pub use lexer::tokenize;
pub use parser::{parse, parse_at, Parser};
pub use token::{Tag, Token, TokenKind};
