//! Symbol tables for the FIND language.
//!
//! Two tables drive the lexer:
//!
//! * [`SYMBOL_RULES`]: the ordered pattern list. The lexer tries the rules in
//!   table order and the first one that matches at the current position wins,
//!   so reserved words and multi-character operators have to stay ahead of the
//!   generic identifier and number patterns.
//! * [`lookup_keyword`]: keyword and operator spelling to [`TokenKind`].
//!
//! Adding a keyword means touching both: a pattern in [`RULE_PATTERNS`] and a
//! spelling in [`lookup_keyword`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::token::{Tag, TokenKind};

/// One entry of the ordered rule table. Its priority is its index.
#[derive(Debug)]
pub struct SymbolRule {
    pub tag: Tag,
    pub regex: Regex,
}

impl SymbolRule {
    /// Length in bytes of the match anchored at the start of `input`, if any.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        self.regex
            .find(input)
            .filter(|m| m.start() == 0 && !m.as_str().is_empty())
            .map(|m| m.end())
    }
}

const RULE_PATTERNS: &[(Tag, &str)] = &[
    // commands
    (Tag::Command, r"(?i)^FIND\b"),
    (Tag::CmdSpec, r"(?i)^ALL\b"),
    (Tag::Command2, r"(?i)^(?:SORT|GROUP|DISTINCT)\b"),
    (Tag::Condition, r"(?i)^MATCHING\b"),
    // temporal base
    (Tag::Temporal, r"(?i)^(?:SINCE|BETWEEN)\b"),
    // temporal scope
    (Tag::Relative, r"(?i)^(?:YESTERDAY|BEFORE|LAST|PREVIOUS|AGO|FOREVER)\b"),
    (Tag::Clock, r"(?i)^(?:SECOND|MINUTE|HOUR)\b"),
    (Tag::Clocks, r"(?i)^(?:SECONDS|MINUTES|HOURS)\b"),
    (Tag::Calendar, r"(?i)^(?:DAY|WEEK|FORTNIGHT|MONTH|QUARTER|YEAR|CENTURY)\b"),
    (
        Tag::Calendars,
        r"(?i)^(?:DAYS|WEEKS|FORTNIGHTS|MONTHS|QUARTERS|YEARS|CENTURIES)\b",
    ),
    (
        Tag::Weekday,
        r"(?i)^(?:MONDAY|TUESDAY|WEDNESDAY|THURSDAY|FRIDAY|SATURDAY|SUNDAY)\b",
    ),
    (
        Tag::Weekdays,
        r"(?i)^(?:MONDAYS|TUESDAYS|WEDNESDAYS|THURSDAYS|FRIDAYS|SATURDAYS|SUNDAYS)\b",
    ),
    (
        Tag::Months,
        r"(?i)^(?:JANUARY|FEBRUARY|MARCH|APRIL|MAY|JUNE|JULY|AUGUST|SEPTEMBER|OCTOBER|NOVEMBER|DECEMBER)\b",
    ),
    (
        Tag::Mon,
        r"(?i)^(?:JAN|FEB|MAR|APR|JUN|JUL|AUG|SEP|OCT|NOV|DEC)\b",
    ),
    // word operators
    (Tag::And, r"(?i)^AND\b"),
    (Tag::Or, r"(?i)^OR\b"),
    (Tag::Not, r"(?i)^NOT\b"),
    (Tag::Like, r"(?i)^LIKE\b"),
    (Tag::In, r"(?i)^IN\b"),
    (Tag::Alias, r"(?i)^AS\b"),
    (Tag::Div, r"(?i)^DIV\b"),
    (Tag::Mod, r"(?i)^MOD\b"),
    // pipe, comma and parentheses
    (Tag::Pipe, r"^\|"),
    (Tag::Comma, r"^,"),
    (Tag::LParen, r"^\("),
    (Tag::RParen, r"^\)"),
    // binary operands
    (Tag::Minus, r"^-"),
    (Tag::Plus, r"^\+"),
    (Tag::Equal, r"^==?"),
    (Tag::NotEqual, r"^(?:!=|<>)"),
    (Tag::Not, r"^!"),
    (Tag::Mul, r"^\*"),
    (Tag::Div, r"^/"),
    (Tag::Mod, r"^%"),
    (Tag::LessEqual, r"^<="),
    (Tag::GreaterEqual, r"^>="),
    (Tag::Less, r"^<"),
    (Tag::Greater, r"^>"),
    // literals
    (Tag::String, r#"^(?:'[^']*'|"[^"]*")"#),
    (
        Tag::Ident,
        r"^(?:[A-Za-z_][A-Za-z0-9_.@$]*|\[[A-Za-z_][A-Za-z0-9_.@$]*\])",
    ),
    (Tag::Float, r"^(?:\d*\.\d+(?:[eE][-+]?\d+)?|\d+[eE][-+]\d+)"),
    (Tag::Int, r"^\d+(?:[eE]\d+)?\b"),
];

/// The compiled rule table, built once on first use and read-only afterwards.
pub static SYMBOL_RULES: Lazy<Vec<SymbolRule>> = Lazy::new(|| {
    RULE_PATTERNS
        .iter()
        .map(|&(tag, pattern)| SymbolRule {
            tag,
            regex: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid {tag} pattern {pattern:?}: {e}")),
        })
        .collect()
});

/// Forces compilation of the rule table.
pub fn init() {
    Lazy::force(&SYMBOL_RULES);
}

/// Maps a keyword or operator spelling to its token kind. Case-insensitive.
pub fn lookup_keyword(lexeme: &str) -> Option<TokenKind> {
    use TokenKind::*;

    let kind = match lexeme.to_ascii_uppercase().as_str() {
        // commands
        "FIND" => Find,
        "SORT" => Sort,
        "GROUP" => Group,
        "DISTINCT" => Distinct,
        "ALL" => All,
        "|" => Pipe,
        "MATCHING" => Matching,
        // temporals
        "SINCE" => Since,
        "BETWEEN" => Between,
        "YESTERDAY" => Yesterday,
        "BEFORE" => Before,
        "LAST" => Last,
        "PREVIOUS" => Previous,
        "AGO" => Ago,
        "FOREVER" => Forever,
        "SECOND" | "SECONDS" => Second,
        "MINUTE" | "MINUTES" => Minute,
        "HOUR" | "HOURS" => Hour,
        "DAY" | "DAYS" => Day,
        "WEEK" | "WEEKS" => Week,
        "FORTNIGHT" | "FORTNIGHTS" => Fortnight,
        "MONTH" | "MONTHS" => Month,
        "QUARTER" | "QUARTERS" => Quarter,
        "YEAR" | "YEARS" => Year,
        "CENTURY" | "CENTURIES" => Century,
        "MONDAY" | "MONDAYS" => Monday,
        "TUESDAY" | "TUESDAYS" => Tuesday,
        "WEDNESDAY" | "WEDNESDAYS" => Wednesday,
        "THURSDAY" | "THURSDAYS" => Thursday,
        "FRIDAY" | "FRIDAYS" => Friday,
        "SATURDAY" | "SATURDAYS" => Saturday,
        "SUNDAY" | "SUNDAYS" => Sunday,
        "JANUARY" | "JAN" => January,
        "FEBRUARY" | "FEB" => February,
        "MARCH" | "MAR" => March,
        "APRIL" | "APR" => April,
        "MAY" => May,
        "JUNE" | "JUN" => June,
        "JULY" | "JUL" => July,
        "AUGUST" | "AUG" => August,
        "SEPTEMBER" | "SEP" => September,
        "OCTOBER" | "OCT" => October,
        "NOVEMBER" | "NOV" => November,
        "DECEMBER" | "DEC" => December,
        // operators
        "," => Comma,
        "(" => LParen,
        ")" => RParen,
        "-" => Minus,
        "+" => Plus,
        "=" | "==" => Equal,
        "<>" | "!=" => NotEqual,
        "*" => Mul,
        "/" | "DIV" => Div,
        "%" | "MOD" => Mod,
        "<=" => LessEqual,
        ">=" => GreaterEqual,
        "<" => Less,
        ">" => Greater,
        "AND" => And,
        "OR" => Or,
        "NOT" | "!" => Not,
        "LIKE" => Like,
        "IN" => In,
        "AS" => As,
        _ => return None,
    };
    Some(kind)
}
