//! Lexer for the FIND language.
//!
//! Tokenizing is a two step affair. A pre-pass blanks out comments and turns
//! tabs and line breaks into spaces; every replacement keeps the byte length,
//! so offsets into the normalized text are offsets into the original query.
//! Then, from the current position, the rules of [`SYMBOL_RULES`] are tried in
//! order and the first anchored match becomes the next token.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{LexError, Location};
use crate::symbols::{lookup_keyword, SYMBOL_RULES};
use crate::token::{Span, Tag, Token, TokenKind};

/// Quoted strings are matched too, so comment markers inside them survive.
static COMMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'[^']*'|"[^"]*"|//[^\n]*|/\*(?s:.*?)\*/"#).expect("comment pattern")
});

/// Replaces comments, tabs and line breaks with spaces of the same byte length.
pub fn normalize(query: &str) -> String {
    let stripped = COMMENTS.replace_all(query, |caps: &Captures<'_>| {
        let matched = &caps[0];
        if matched.starts_with('\'') || matched.starts_with('"') {
            matched.to_string()
        } else {
            " ".repeat(matched.len())
        }
    });
    stripped.replace(['\t', '\r', '\n'], " ")
}

pub struct Lexer<'a> {
    /// The query as given, used for error locations.
    input: &'a str,
    normalized: String,
    /// Current byte offset, valid for both `input` and `normalized`.
    position: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            normalized: normalize(input),
            position: 0,
            failed: false,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.normalized[self.position..];
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    fn fail(&mut self, error: LexError) -> Option<Result<Token, LexError>> {
        self.failed = true;
        Some(Err(error))
    }
}

/// Converts a raw match into a token.
fn make_token(tag: Tag, lexeme: &str, span: Span, input: &str) -> Result<Token, LexError> {
    let (kind, text) = match tag {
        Tag::String => (TokenKind::Literal, &lexeme[1..lexeme.len() - 1]),
        Tag::Ident => {
            let bare = lexeme
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .unwrap_or(lexeme);
            (TokenKind::Literal, bare)
        }
        Tag::Int | Tag::Float => (TokenKind::Literal, lexeme),
        _ => match lookup_keyword(lexeme) {
            Some(kind) => (kind, lexeme),
            None => {
                return Err(LexError::UnknownSymbol {
                    tag,
                    lexeme: lexeme.to_string(),
                    location: Location::at(input, span.start),
                })
            }
        },
    };
    Ok(Token {
        kind,
        tag,
        text: text.to_string(),
        span,
    })
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();
        if self.position >= self.normalized.len() {
            return None;
        }

        let start = self.position;
        let rest = &self.normalized[start..];
        let matched = SYMBOL_RULES
            .iter()
            .find_map(|rule| rule.match_len(rest).map(|len| (rule.tag, len)));

        let Some((tag, len)) = matched else {
            return self.fail(LexError::NoMatch {
                location: Location::at(self.input, start),
            });
        };

        let span = Span::new(start, start + len);
        match make_token(tag, &rest[..len], span, self.input) {
            Ok(token) => {
                self.position = span.end;
                Some(Ok(token))
            }
            Err(error) => self.fail(error),
        }
    }
}

/// Tokenizes a whole query, stopping at the first error.
pub fn tokenize(query: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(query).collect::<Result<Vec<_>, _>>()?;
    tracing::trace!(count = tokens.len(), "tokenized query");
    Ok(tokens)
}
