//! Parser for FIND statements
//!
//! ## Parse flow
//!
//! ```text
//! Parser::new()
//!   └─ split tokens at the first '|' → statement | remainder_tokens
//!
//! parse()
//!   ├─ expect FIND                        → ExpectedStatement
//!   ├─ parse_field_list()
//!   │    ├─ ALL → all_flag
//!   │    └─ field (',' field)*            → ExpectedField / StatementTruncated
//!   │         └─ ident [AS ident]
//!   ├─ MATCHING? → matching::parse_matching()
//!   ├─ SINCE   → temporal::resolve_since()
//!   │  BETWEEN → temporal::resolve_between()
//!   │  other   → MissingTemporalClause
//!   └─ leftover tokens                    → UnexpectedClause
//! ```
//!
//! The parser never backtracks. Grammar decisions look at most two tokens
//! ahead of the cursor.
//!
//! ## Examples
//!
//! ```text
//! FIND src_ip SINCE LAST HOUR
//! FIND dest_ip MATCHING src_ip='192.168.0.1' AND dest_port=80 SINCE YESTERDAY
//! FIND ALL BETWEEN 6 MONTHS AGO AND LAST MONTH
//! FIND [dest_ip] AS dst SINCE MONDAY BEFORE LAST | DISTINCT src_ip
//! ```

use chrono::{DateTime, FixedOffset, Local};

use crate::ast::{FieldSpec, Query};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::matching::parse_matching;
use crate::temporal::{resolve_between, resolve_since};
use crate::token::{Tag, Token, TokenKind};

pub struct Parser<'a> {
    cursor: Cursor<'a>,
    /// Tokens after the first pipe.
    remainder: &'a [Token],
    /// Reference instant for relative temporal references.
    now: DateTime<FixedOffset>,
}

/// The current local time with its UTC offset.
pub fn local_now() -> DateTime<FixedOffset> {
    let now = Local::now();
    now.with_timezone(now.offset())
}

impl<'a> Parser<'a> {
    pub fn new(query: &'a str, tokens: &'a [Token]) -> Self {
        let (statement, remainder) = match tokens.iter().position(|t| t.is(TokenKind::Pipe)) {
            Some(pipe) => (&tokens[..pipe], &tokens[pipe + 1..]),
            None => (tokens, &tokens[tokens.len()..]),
        };
        Self {
            cursor: Cursor::new(query, statement),
            remainder,
            now: local_now(),
        }
    }

    /// Resolves relative references against `now` instead of the current time.
    pub fn with_reference_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    pub fn parse(mut self) -> Result<Query, ParseError> {
        tracing::debug!(at = %self.cursor.location(), "parse");

        if !self.cursor.eat(TokenKind::Find) {
            return Err(ParseError::ExpectedStatement(self.cursor.location()));
        }

        let (all_flag, fields) = self.parse_field_list()?;

        let condition = if self.cursor.eat(TokenKind::Matching) {
            Some(parse_matching(&mut self.cursor)?)
        } else {
            None
        };

        // every query has to be bounded in time
        let time_range = match self.cursor.peek_kind() {
            Some(TokenKind::Since) => {
                self.cursor.advance();
                resolve_since(&mut self.cursor, self.now)?
            }
            Some(TokenKind::Between) => {
                self.cursor.advance();
                resolve_between(&mut self.cursor, self.now)?
            }
            _ => return Err(ParseError::MissingTemporalClause(self.cursor.location())),
        };

        if !self.cursor.at_end() {
            return Err(ParseError::UnexpectedClause(self.cursor.location()));
        }

        let query = Query {
            fields,
            all_flag,
            condition,
            time_range,
            remainder_tokens: self.remainder.to_vec(),
        };
        tracing::debug!(
            fields = query.fields.len(),
            all = query.all_flag,
            from = query.time_range.from,
            to = query.time_range.to,
            subcommands = query.has_subcommands(),
            "parsed statement"
        );
        Ok(query)
    }

    /// `ALL | field (',' field)*`
    fn parse_field_list(&mut self) -> Result<(bool, Vec<FieldSpec>), ParseError> {
        tracing::debug!(at = %self.cursor.location(), "parse_field_list");

        if self.cursor.eat(TokenKind::All) {
            return Ok((true, Vec::new()));
        }

        let mut fields = Vec::new();
        while let Some(token) = self.cursor.peek() {
            if token.is(TokenKind::Comma) {
                // comma before the first field
                return Err(ParseError::ExpectedField(self.cursor.location()));
            }
            if !is_field_name(token) {
                break;
            }
            fields.push(self.parse_field_spec()?);

            if !self.cursor.is_at(TokenKind::Comma) {
                break;
            }
            // two adjacent commas, or a comma after the last field
            if !self.cursor.peek_nth(1).is_some_and(is_field_name) {
                return Err(ParseError::ExpectedField(self.cursor.location_nth(1)));
            }
            self.cursor.advance();
        }

        if fields.is_empty() {
            return Err(ParseError::StatementTruncated(self.cursor.location()));
        }
        Ok((false, fields))
    }

    /// `ident [AS ident]`
    fn parse_field_spec(&mut self) -> Result<FieldSpec, ParseError> {
        let location = self.cursor.location();
        let Some(name) = self.cursor.advance().filter(|t| is_field_name(t)) else {
            return Err(ParseError::ExpectedField(location));
        };

        if !self.cursor.eat(TokenKind::As) {
            return Ok(FieldSpec::new(name.text.as_str()));
        }
        let location = self.cursor.location();
        match self.cursor.advance() {
            Some(alias) if is_field_name(alias) => {
                Ok(FieldSpec::with_alias(name.text.as_str(), alias.text.as_str()))
            }
            _ => Err(ParseError::ExpectedField(location)),
        }
    }
}

fn is_field_name(token: &Token) -> bool {
    matches!(token.tag, Tag::Ident | Tag::String)
}

/// Parses a statement, resolving relative time against the local clock.
pub fn parse(query: &str) -> Result<Query, ParseError> {
    parse_at(query, local_now())
}

/// Parses a statement, resolving relative time against `now`.
pub fn parse_at(query: &str, now: DateTime<FixedOffset>) -> Result<Query, ParseError> {
    let tokens = tokenize(query)?;
    Parser::new(query, &tokens).with_reference_time(now).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Value, ValueKind};
    use chrono::TimeZone;

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, 14, 35, 27)
            .unwrap()
    }

    fn parse_string(input: &str) -> Result<Query, ParseError> {
        parse_at(input, now())
    }

    fn field_names(query: &Query) -> Vec<(&str, &str)> {
        query
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.alias.as_str()))
            .collect()
    }

    #[test]
    fn test_simple_find() {
        let query = parse_string("FIND src_ip SINCE FOREVER").unwrap();
        assert_eq!(field_names(&query), vec![("src_ip", "src_ip")]);
        assert!(!query.all_flag);
        assert!(query.condition.is_none());
        assert_eq!(query.time_range.from, 0);
        assert!(query.remainder_tokens.is_empty());
    }

    #[test]
    fn test_find_all() {
        let query = parse_string("find all since forever").unwrap();
        assert!(query.all_flag);
        assert!(query.fields.is_empty());
    }

    #[test]
    fn test_field_list_and_aliases() {
        let query =
            parse_string("FIND src_ip AS source, [dest_ip], 'odd name' AS odd SINCE FOREVER")
                .unwrap();
        assert_eq!(
            field_names(&query),
            vec![
                ("src_ip", "source"),
                ("dest_ip", "dest_ip"),
                ("odd name", "odd"),
            ]
        );
    }

    #[test]
    fn test_comma_errors() {
        let cases = [
            ("FIND , a SINCE FOREVER", ", a SINCE FOREVER"),
            ("FIND a,, b SINCE FOREVER", ", b SINCE FOREVER"),
            ("FIND a, SINCE FOREVER", "SINCE FOREVER"),
            ("FIND a,", ""),
        ];
        for (input, near) in cases {
            match parse_string(input) {
                Err(ParseError::ExpectedField(location)) => assert_eq!(location.near, near, "{input}"),
                other => panic!("{input}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_alias_errors() {
        assert!(matches!(
            parse_string("FIND a AS SINCE FOREVER"),
            Err(ParseError::ExpectedField(_))
        ));
        assert!(matches!(parse_string("FIND a AS"), Err(ParseError::ExpectedField(_))));
    }

    #[test]
    fn test_empty_field_list() {
        assert!(matches!(
            parse_string("FIND SINCE FOREVER"),
            Err(ParseError::StatementTruncated(_))
        ));
        assert!(matches!(parse_string("FIND"), Err(ParseError::StatementTruncated(_))));
    }

    #[test]
    fn test_expected_statement() {
        match parse_string("SORT src_ip SINCE FOREVER") {
            Err(ParseError::ExpectedStatement(location)) => assert_eq!(location.offset, 0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse_string(""), Err(ParseError::ExpectedStatement(_))));
        assert!(matches!(
            parse_string("| DISTINCT a"),
            Err(ParseError::ExpectedStatement(_))
        ));
    }

    #[test]
    fn test_missing_temporal_clause() {
        for input in [
            "FIND a",
            "FIND ALL",
            "FIND a, b MATCHING x=1",
            "FIND a MATCHING x=1 AND y='2' OR z=3",
            "FIND a b SINCE LAST HOUR",
            "FIND a | SORT a",
        ] {
            assert!(
                matches!(parse_string(input), Err(ParseError::MissingTemporalClause(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_matching_condition() {
        let query = parse_string("FIND a MATCHING x=1 OR y='two' SINCE FOREVER").unwrap();
        let condition = query.condition.unwrap();
        assert_eq!(condition.groups.len(), 2);
        let second = &condition.groups[1].predicates[0];
        assert_eq!(second.left, Value::new(ValueKind::Ident, "y"));
        assert_eq!(second.op, CompareOp::Eq);
        assert_eq!(second.right, Value::new(ValueKind::String, "two"));
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        match parse_string("FIND a SINCE LAST HOUR extra") {
            Err(ParseError::UnexpectedClause(location)) => assert_eq!(location.near, "extra"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_pipe_splits_remainder() {
        let query = parse_string("FIND a SINCE YESTERDAY | SORT a").unwrap();
        let kinds: Vec<_> = query.remainder_tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Sort, TokenKind::Literal]);
        assert!(query.has_subcommands());
    }

    #[test]
    fn test_only_first_pipe_splits() {
        let query = parse_string("FIND a SINCE FOREVER | SORT a | DISTINCT a").unwrap();
        assert_eq!(query.remainder_tokens.len(), 5);
        assert_eq!(query.remainder_tokens[2].kind, TokenKind::Pipe);
    }

    #[test]
    fn test_lex_errors_surface() {
        let err = parse_string("FIND a SINCE ~yesterday").unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
        assert_eq!(err.location().near, "~yesterday");
    }

    #[test]
    fn test_parser_with_prelexed_tokens() {
        let input = "FIND a BETWEEN 2 DAYS AGO AND YESTERDAY";
        let tokens = tokenize(input).unwrap();
        let query = Parser::new(input, &tokens)
            .with_reference_time(now())
            .parse()
            .unwrap();
        assert!(query.time_range.from < query.time_range.to);
    }
}
