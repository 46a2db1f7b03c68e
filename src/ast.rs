//! Parsed FIND statements.
//!
//! ```text
//! Query
//! ├─ fields: [FieldSpec { name, alias }]      empty for FIND ALL
//! ├─ all_flag
//! ├─ condition: DisjunctionGroup              OR of ...
//! │    └─ groups: [ConjunctionGroup]          ... AND of ...
//! │         └─ predicates: [Predicate]        ... left op right
//! ├─ time_range: TimeRange { from, to }       epoch nanoseconds, inclusive
//! └─ remainder_tokens                         everything after the first `|`
//! ```
//!
//! Every type serializes with serde, which is how the shell prints a query.
//! Values keep the text the user wrote; numeric conversion happens on demand
//! through [`Value::as_i64`] and [`Value::as_f64`].

use serde::Serialize;

use crate::token::{Tag, Token};

/// A fully resolved FIND statement, ready for the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    /// Requested fields in result column order. Empty when `all_flag` is set.
    pub fields: Vec<FieldSpec>,
    /// `FIND ALL`
    pub all_flag: bool,
    /// `None` when there was no MATCHING clause, which matches everything.
    pub condition: Option<DisjunctionGroup>,
    pub time_range: TimeRange,
    /// Tokens after the first `|`, handed on unparsed.
    pub remainder_tokens: Vec<Token>,
}

impl Query {
    pub fn has_subcommands(&self) -> bool {
        !self.remainder_tokens.is_empty()
    }
}

/// A requested field, e.g. `src_ip` or `src_ip AS source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    pub alias: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    pub fn with_alias(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// Literal class of a [`Value`], taken from the lexer tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int,
    Float,
    String,
    Ident,
}

/// One side of a predicate. The raw text is kept as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    pub kind: ValueKind,
    pub raw: String,
}

impl Value {
    pub fn new(kind: ValueKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Value of a literal token, `None` for keyword tokens.
    pub fn from_token(token: &Token) -> Option<Self> {
        let kind = match token.tag {
            Tag::Int => ValueKind::Int,
            Tag::Float => ValueKind::Float,
            Tag::String => ValueKind::String,
            Tag::Ident => ValueKind::Ident,
            _ => return None,
        };
        Some(Self::new(kind, token.text.as_str()))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.kind {
            ValueKind::Int => parse_int_literal(&self.raw),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.kind {
            ValueKind::Int | ValueKind::Float => self.raw.parse().ok(),
            _ => None,
        }
    }
}

/// Parses an integer literal, including the `12E3` exponent form.
pub fn parse_int_literal(raw: &str) -> Option<i64> {
    let (sign, digits) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let (mantissa, exponent) = match digits.find(['e', 'E']) {
        Some(i) => (&digits[..i], digits[i + 1..].parse::<u32>().ok()?),
        None => (digits, 0),
    };
    let value = mantissa
        .parse::<i64>()
        .ok()?
        .checked_mul(10_i64.checked_pow(exponent)?)?;
    value.checked_mul(sign)
}

/// Comparison operators of the grammar. Only [`CompareOp::Eq`] is resolved
/// by the parser so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
    In,
    Between,
}

impl CompareOp {
    pub fn is_resolved(self) -> bool {
        matches!(self, CompareOp::Eq)
    }
}

/// `left op right`, e.g. `dest_port = 80`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub left: Value,
    pub op: CompareOp,
    pub right: Value,
}

/// Predicates that must all hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConjunctionGroup {
    pub predicates: Vec<Predicate>,
}

/// Conjunction groups of which at least one must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisjunctionGroup {
    pub groups: Vec<ConjunctionGroup>,
}

impl DisjunctionGroup {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.groups.iter().flat_map(|g| g.predicates.iter())
    }
}

/// Builds a [`DisjunctionGroup`] front to back.
///
/// `AND` binds tighter than `OR`, so reading predicates left to right is
/// enough: `a AND b OR c` becomes `[[a, b], [c]]`.
#[derive(Debug, Default)]
pub struct ConditionBuilder {
    groups: Vec<ConjunctionGroup>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new conjunction group holding `predicate`.
    pub fn or(&mut self, predicate: Predicate) -> &mut Self {
        self.groups.push(ConjunctionGroup {
            predicates: vec![predicate],
        });
        self
    }

    /// Adds `predicate` to the current conjunction group.
    pub fn and(&mut self, predicate: Predicate) -> &mut Self {
        if self.groups.is_empty() {
            return self.or(predicate);
        }
        if let Some(group) = self.groups.last_mut() {
            group.predicates.push(predicate);
        }
        self
    }

    /// Finishes the condition. No group is ever empty.
    pub fn build(self) -> DisjunctionGroup {
        DisjunctionGroup {
            groups: self.groups,
        }
    }
}

/// Closed interval in nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    /// Builds a range, swapping the bounds if they are inverted.
    pub fn new(from: i64, to: i64) -> Self {
        if from > to {
            tracing::debug!(from, to, "swapping inverted time range");
            Self { from: to, to: from }
        } else {
            Self { from, to }
        }
    }

    pub fn contains(&self, nanos: i64) -> bool {
        self.from <= nanos && nanos <= self.to
    }
}
