//! The MATCHING clause.
//!
//! ```text
//! cond  := conj (OR conj)*
//! conj  := pred (AND pred)*
//! pred  := value op value
//! value := int | float | string | ident | ('-' | '+') (int | float)
//! ```
//!
//! The result is kept flat, as an OR of AND groups. Operators other than `=`
//! are recognised but rejected for now.

use crate::ast::{CompareOp, ConditionBuilder, DisjunctionGroup, Predicate, Value, ValueKind};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::token::{Tag, TokenKind};

/// Parses the condition following `MATCHING`. The cursor is left on the first
/// token after the condition.
pub fn parse_matching(cursor: &mut Cursor<'_>) -> Result<DisjunctionGroup, ParseError> {
    tracing::debug!(at = %cursor.location(), "parse_matching");

    let mut builder = ConditionBuilder::new();
    builder.or(parse_predicate(cursor)?);

    loop {
        if cursor.eat(TokenKind::And) {
            builder.and(parse_predicate(cursor)?);
        } else if cursor.eat(TokenKind::Or) {
            builder.or(parse_predicate(cursor)?);
        } else {
            break;
        }
    }

    Ok(builder.build())
}

fn parse_predicate(cursor: &mut Cursor<'_>) -> Result<Predicate, ParseError> {
    let left = parse_value(cursor)?;
    let op = parse_operator(cursor)?;
    let right = parse_value(cursor)?;
    Ok(Predicate { left, op, right })
}

fn parse_operator(cursor: &mut Cursor<'_>) -> Result<CompareOp, ParseError> {
    let location = cursor.location();
    let Some(token) = cursor.advance() else {
        return Err(ParseError::MatchingClauseTruncated(location));
    };
    match comparison_operator(token.kind) {
        Some(op) if op.is_resolved() => Ok(op),
        _ => Err(ParseError::ExpectedComparisonOperator(location)),
    }
}

fn comparison_operator(kind: TokenKind) -> Option<CompareOp> {
    let op = match kind {
        TokenKind::Equal => CompareOp::Eq,
        TokenKind::NotEqual => CompareOp::NotEq,
        TokenKind::Less => CompareOp::Lt,
        TokenKind::Greater => CompareOp::Gt,
        TokenKind::LessEqual => CompareOp::Lte,
        TokenKind::GreaterEqual => CompareOp::Gte,
        TokenKind::Like => CompareOp::Like,
        TokenKind::In => CompareOp::In,
        TokenKind::Between => CompareOp::Between,
        _ => return None,
    };
    Some(op)
}

fn parse_value(cursor: &mut Cursor<'_>) -> Result<Value, ParseError> {
    let location = cursor.location();
    let Some(token) = cursor.peek() else {
        return Err(ParseError::MatchingClauseTruncated(location));
    };

    if let Some(value) = Value::from_token(token) {
        cursor.advance();
        return Ok(value);
    }

    // signed number
    if matches!(token.kind, TokenKind::Minus | TokenKind::Plus) {
        match cursor.peek_nth(1) {
            Some(number) if number.tag.is_numeric() => {
                let kind = if number.tag == Tag::Int {
                    ValueKind::Int
                } else {
                    ValueKind::Float
                };
                let raw = format!("{}{}", token.text, number.text);
                cursor.advance_by(2);
                return Ok(Value::new(kind, raw));
            }
            None => return Err(ParseError::MatchingClauseTruncated(cursor.location_nth(1))),
            Some(_) => {}
        }
    }

    Err(ParseError::UnexpectedClause(location))
}
