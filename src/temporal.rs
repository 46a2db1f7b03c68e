//! Temporal references: the SINCE and BETWEEN clauses.
//!
//! ```text
//! tempref := FOREVER
//!          | YESTERDAY
//!          | DAY BEFORE YESTERDAY
//!          | (LAST | PREVIOUS) unit
//!          | unit BEFORE LAST
//!          | int unit AGO
//!          | 'timestamp'
//! unit    := clock-unit | weekday | month-name | calendar-unit
//! ```
//!
//! Every reference resolves against a fixed reference instant `now`, in the
//! offset of `now`. A reference names a period (an hour, a Tuesday, last
//! month, ...). As the opening bound of a range it resolves to the first
//! instant of that period; as the closing bound of a BETWEEN it resolves to the
//! last instant, one unit later minus one nanosecond.
//!
//! Calendar units use calendar arithmetic (a month back from 31 March is
//! 28 or 29 February). The fixed durations below only drive clock units and
//! the overflow guard.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike, Weekday,
};

use crate::ast::{parse_int_literal, TimeRange};
use crate::cursor::Cursor;
use crate::error::{Location, ParseError};
use crate::token::{Tag, Token, TokenKind};

// Nanoseconds since the Unix epoch.
pub const SECOND_NS: i64 = 1_000_000_000;
pub const MINUTE_NS: i64 = SECOND_NS * 60;
pub const HOUR_NS: i64 = MINUTE_NS * 60;
pub const DAY_NS: i64 = HOUR_NS * 24;
pub const WEEK_NS: i64 = DAY_NS * 7;
pub const FORTNIGHT_NS: i64 = DAY_NS * 14;
/// Rough approximation, fixed-duration contexts only.
pub const MONTH_NS: i64 = DAY_NS * 30;
pub const QUARTER_NS: i64 = DAY_NS * 90;
pub const YEAR_NS: i64 = DAY_NS * 365;
pub const CENTURY_NS: i64 = YEAR_NS * 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockUnit {
    Second,
    Minute,
    Hour,
}

impl ClockUnit {
    pub fn nanos(self) -> i64 {
        match self {
            ClockUnit::Second => SECOND_NS,
            ClockUnit::Minute => MINUTE_NS,
            ClockUnit::Hour => HOUR_NS,
        }
    }

    /// Drops everything below the unit, except for seconds.
    fn truncate(self, dt: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        match self {
            ClockUnit::Second => Some(dt),
            ClockUnit::Minute => dt.with_second(0)?.with_nanosecond(0),
            ClockUnit::Hour => dt.with_minute(0)?.with_second(0)?.with_nanosecond(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarUnit {
    Day,
    Week,
    Fortnight,
    Month,
    Quarter,
    Year,
    Century,
}

impl CalendarUnit {
    /// Fixed-length approximation of the unit.
    pub fn approx_nanos(self) -> i64 {
        match self {
            CalendarUnit::Day => DAY_NS,
            CalendarUnit::Week => WEEK_NS,
            CalendarUnit::Fortnight => FORTNIGHT_NS,
            CalendarUnit::Month => MONTH_NS,
            CalendarUnit::Quarter => QUARTER_NS,
            CalendarUnit::Year => YEAR_NS,
            CalendarUnit::Century => CENTURY_NS,
        }
    }

    fn period(self) -> Period {
        match self {
            CalendarUnit::Day => Period::Days(1),
            CalendarUnit::Week => Period::Days(7),
            CalendarUnit::Fortnight => Period::Days(14),
            CalendarUnit::Month => Period::Months(1),
            CalendarUnit::Quarter => Period::Months(3),
            CalendarUnit::Year => Period::Months(12),
            CalendarUnit::Century => Period::Months(1200),
        }
    }
}

/// The unit of a relative reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Clock(ClockUnit),
    Weekday(Weekday),
    /// Month number, 1 to 12.
    MonthName(u32),
    Calendar(CalendarUnit),
}

impl Unit {
    pub fn from_kind(kind: TokenKind) -> Option<Unit> {
        use TokenKind::*;

        let unit = match kind {
            Second => Unit::Clock(ClockUnit::Second),
            Minute => Unit::Clock(ClockUnit::Minute),
            Hour => Unit::Clock(ClockUnit::Hour),
            Monday => Unit::Weekday(Weekday::Mon),
            Tuesday => Unit::Weekday(Weekday::Tue),
            Wednesday => Unit::Weekday(Weekday::Wed),
            Thursday => Unit::Weekday(Weekday::Thu),
            Friday => Unit::Weekday(Weekday::Fri),
            Saturday => Unit::Weekday(Weekday::Sat),
            Sunday => Unit::Weekday(Weekday::Sun),
            January => Unit::MonthName(1),
            February => Unit::MonthName(2),
            March => Unit::MonthName(3),
            April => Unit::MonthName(4),
            May => Unit::MonthName(5),
            June => Unit::MonthName(6),
            July => Unit::MonthName(7),
            August => Unit::MonthName(8),
            September => Unit::MonthName(9),
            October => Unit::MonthName(10),
            November => Unit::MonthName(11),
            December => Unit::MonthName(12),
            Day => Unit::Calendar(CalendarUnit::Day),
            Week => Unit::Calendar(CalendarUnit::Week),
            Fortnight => Unit::Calendar(CalendarUnit::Fortnight),
            Month => Unit::Calendar(CalendarUnit::Month),
            Quarter => Unit::Calendar(CalendarUnit::Quarter),
            Year => Unit::Calendar(CalendarUnit::Year),
            Century => Unit::Calendar(CalendarUnit::Century),
            _ => return None,
        };
        Some(unit)
    }

    fn of(token: Option<&Token>) -> Option<Unit> {
        token.and_then(|t| Unit::from_kind(t.kind))
    }
}

/// Length of a resolved period, used to find its last instant.
#[derive(Debug, Clone, Copy)]
enum Period {
    Nanos(i64),
    Days(u64),
    Months(u32),
}

/// Accepted timestamp layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// `SINCE <ref>`: from the reference up to `now`.
pub fn resolve_since(
    cursor: &mut Cursor<'_>,
    now: DateTime<FixedOffset>,
) -> Result<TimeRange, ParseError> {
    tracing::debug!(at = %cursor.location(), "resolve_since");

    let from = resolve_reference(cursor, now, false)?;
    let to = nanos(now, cursor.location())?;
    Ok(TimeRange::new(from, to))
}

/// `BETWEEN <ref> AND <ref>`, the closing reference inclusive.
pub fn resolve_between(
    cursor: &mut Cursor<'_>,
    now: DateTime<FixedOffset>,
) -> Result<TimeRange, ParseError> {
    tracing::debug!(at = %cursor.location(), "resolve_between");

    let from = resolve_reference(cursor, now, false)?;
    if !cursor.eat(TokenKind::And) {
        return Err(ParseError::MissingAnd(cursor.location()));
    }
    let to = resolve_reference(cursor, now, true)?;
    Ok(TimeRange::new(from, to))
}

/// Resolves one temporal reference to nanoseconds since the epoch and moves
/// the cursor past it.
fn resolve_reference(
    cursor: &mut Cursor<'_>,
    now: DateTime<FixedOffset>,
    end: bool,
) -> Result<i64, ParseError> {
    let location = cursor.location();
    let Some(token) = cursor.peek() else {
        return Err(invalid(&location));
    };

    let resolved = match token.kind {
        TokenKind::Forever => {
            cursor.advance();
            return Ok(0);
        }
        TokenKind::Yesterday => {
            cursor.advance();
            days_back(now, 1, end)
        }
        TokenKind::Day if cursor.peek_kind_nth(1) == Some(TokenKind::Before) => {
            match cursor.peek_kind_nth(2) {
                Some(TokenKind::Yesterday) => {
                    cursor.advance_by(3);
                    days_back(now, 2, end)
                }
                Some(TokenKind::Last) => {
                    cursor.advance_by(3);
                    relative(now, Unit::Calendar(CalendarUnit::Day), 2, end)
                }
                _ => return Err(ParseError::BeforeYesterdayMissing(location)),
            }
        }
        TokenKind::Day if cursor.peek_kind_nth(1) != Some(TokenKind::Ago) => {
            return Err(ParseError::BeforeYesterdayMissing(location));
        }
        TokenKind::Last | TokenKind::Previous => {
            let unit = Unit::of(cursor.peek_nth(1)).ok_or_else(|| invalid(&location))?;
            cursor.advance_by(2);
            relative(now, unit, 1, end)
        }
        TokenKind::Literal => match token.tag {
            Tag::Int => {
                let count = parse_int_literal(&token.text)
                    .ok_or_else(|| ParseError::NotAnIntegerLiteral(location.clone()))?;
                let unit = Unit::of(cursor.peek_nth(1)).ok_or_else(|| invalid(&location))?;
                if cursor.peek_kind_nth(2) != Some(TokenKind::Ago) {
                    return Err(ParseError::InvalidTemporalReference(cursor.location_nth(2)));
                }
                cursor.advance_by(3);
                relative(now, unit, count, end)
            }
            Tag::Float => return Err(ParseError::NotAnIntegerLiteral(location)),
            Tag::String => {
                cursor.advance();
                timestamp(now, &token.text, end)
            }
            _ => return Err(invalid(&location)),
        },
        kind => {
            let unit = Unit::from_kind(kind).ok_or_else(|| invalid(&location))?;
            match (cursor.peek_kind_nth(1), cursor.peek_kind_nth(2)) {
                (Some(TokenKind::Before), Some(TokenKind::Last)) => {
                    cursor.advance_by(3);
                    relative(now, unit, 2, end)
                }
                // `<unit> AGO` is missing its count
                (Some(TokenKind::Ago), _) => return Err(ParseError::NotAnIntegerLiteral(location)),
                _ => return Err(invalid(&location)),
            }
        }
    };

    let instant = resolved.ok_or_else(|| invalid(&location))?;
    nanos(instant, location)
}

fn invalid(location: &Location) -> ParseError {
    ParseError::InvalidTemporalReference(location.clone())
}

fn nanos(instant: DateTime<FixedOffset>, location: Location) -> Result<i64, ParseError> {
    instant
        .timestamp_nanos_opt()
        .ok_or(ParseError::InvalidTemporalReference(location))
}

fn start_of_day(dt: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    local(dt.timezone(), dt.date_naive().and_hms_opt(0, 0, 0)?)
}

fn local(tz: FixedOffset, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive).single()
}

/// The opening instant itself, or the last instant of the period it opens.
fn bound(
    start: DateTime<FixedOffset>,
    period: Period,
    end: bool,
) -> Option<DateTime<FixedOffset>> {
    if !end {
        return Some(start);
    }
    let next = match period {
        Period::Nanos(n) => start.checked_add_signed(Duration::nanoseconds(n))?,
        Period::Days(n) => start.checked_add_days(Days::new(n))?,
        Period::Months(n) => start.checked_add_months(Months::new(n))?,
    };
    next.checked_sub_signed(Duration::nanoseconds(1))
}

/// YESTERDAY and DAY BEFORE YESTERDAY.
fn days_back(now: DateTime<FixedOffset>, days: u64, end: bool) -> Option<DateTime<FixedOffset>> {
    let start = start_of_day(now.checked_sub_days(Days::new(days))?)?;
    bound(start, Period::Days(1), end)
}

/// Applies a relative step `count` times.
fn relative(
    now: DateTime<FixedOffset>,
    unit: Unit,
    count: i64,
    end: bool,
) -> Option<DateTime<FixedOffset>> {
    tracing::trace!(?unit, count, end, "relative reference");

    match unit {
        Unit::Clock(clock) => {
            let back = count.checked_mul(clock.nanos())?;
            let start = clock.truncate(now.checked_sub_signed(Duration::nanoseconds(back))?)?;
            bound(start, Period::Nanos(clock.nanos()), end)
        }
        Unit::Weekday(weekday) => {
            let current = now.weekday().num_days_from_monday();
            let target = weekday.num_days_from_monday();
            let mut back = u64::from((current + 7 - target) % 7);
            if count > 1 {
                back += 7;
            }
            let start = start_of_day(now.checked_sub_days(Days::new(back))?)?;
            bound(start, Period::Days(1), end)
        }
        Unit::MonthName(month) => {
            let mut year = now.year();
            if now.month() <= month {
                year -= 1;
            }
            let extra = i32::try_from(count.max(1) - 1).ok()?;
            let first = NaiveDate::from_ymd_opt(year.checked_sub(extra)?, month, 1)?;
            let start = local(now.timezone(), first.and_hms_opt(0, 0, 0)?)?;
            bound(start, Period::Months(1), end)
        }
        Unit::Calendar(calendar) => {
            // anything overflowing the fixed-length estimate is out of range
            count.checked_mul(calendar.approx_nanos())?;
            let period = calendar.period();
            if end && count > 0 {
                // the period closes where the next more recent one opens
                let next = steps_back(now, period, count - 1)?;
                return next.checked_sub_signed(Duration::nanoseconds(1));
            }
            bound(steps_back(now, period, count)?, period, end)
        }
    }
}

/// Opening instant of the calendar period `count` steps before `now`.
fn steps_back(
    now: DateTime<FixedOffset>,
    period: Period,
    count: i64,
) -> Option<DateTime<FixedOffset>> {
    match period {
        Period::Days(days) => {
            now.checked_sub_days(Days::new(days.checked_mul(u64::try_from(count).ok()?)?))
        }
        Period::Months(months) => {
            let months = months.checked_mul(u32::try_from(count).ok()?)?;
            start_of_day(now.checked_sub_months(Months::new(months))?)
        }
        Period::Nanos(_) => None,
    }
}

/// Absolute timestamps. A date on its own covers the whole day when it closes
/// a range; a time on its own is taken on the reference day.
fn timestamp(now: DateTime<FixedOffset>, text: &str, end: bool) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }
    let tz = now.timezone();
    if let Some(naive) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return local(tz, naive);
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        let start = local(tz, date.and_hms_opt(0, 0, 0)?)?;
        return bound(start, Period::Days(1), end);
    }
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
        .and_then(|time| local(tz, now.date_naive().and_time(time)))
}
