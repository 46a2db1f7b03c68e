use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike};
use findql::{
    parse, parse_at, tokenize, CompareOp, ParseError, Predicate, TokenKind, Value, ValueKind,
};

/// Saturday 2026-10-17 14:35:27 at +02:00.
fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 17, 14, 35, 27)
        .unwrap()
}

fn ns(dt: DateTime<FixedOffset>) -> i64 {
    dt.timestamp_nanos_opt().unwrap()
}

fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
    now().timezone().with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn eq(left: (ValueKind, &str), right: (ValueKind, &str)) -> Predicate {
    Predicate {
        left: Value::new(left.0, left.1),
        op: CompareOp::Eq,
        right: Value::new(right.0, right.1),
    }
}

#[test]
fn last_hour() {
    let query = parse_at("FIND src_ip SINCE LAST HOUR", now()).unwrap();

    assert_eq!(query.fields.len(), 1);
    assert_eq!(query.fields[0].name, "src_ip");
    assert!(!query.all_flag);
    assert!(query.condition.is_none());
    assert_eq!(query.time_range.to, ns(now()));
    assert_eq!(query.time_range.from, ns(local(2026, 10, 17, 13, 0, 0)));
}

#[test]
fn last_hour_against_the_clock() {
    let before = chrono::Local::now();
    let query = parse("FIND src_ip SINCE LAST HOUR").unwrap();
    let after = chrono::Local::now();

    let to = query.time_range.to;
    assert!(before.timestamp_nanos_opt().unwrap() <= to);
    assert!(to <= after.timestamp_nanos_opt().unwrap());

    let from = DateTime::from_timestamp_nanos(query.time_range.from).with_timezone(&chrono::Local);
    assert_eq!((from.minute(), from.second(), from.nanosecond()), (0, 0, 0));
    let span = query.time_range.to - query.time_range.from;
    assert!(span >= Duration::hours(1).num_nanoseconds().unwrap());
    assert!(span <= Duration::hours(2).num_nanoseconds().unwrap());
}

#[test]
fn matching_since_yesterday() {
    let query = parse_at(
        "FIND dest_ip MATCHING src_ip='192.168.0.1' AND dest_port=80 SINCE YESTERDAY",
        now(),
    )
    .unwrap();

    assert_eq!(query.fields[0].name, "dest_ip");
    let condition = query.condition.unwrap();
    assert_eq!(condition.groups.len(), 1);
    assert_eq!(
        condition.groups[0].predicates,
        vec![
            eq((ValueKind::Ident, "src_ip"), (ValueKind::String, "192.168.0.1")),
            eq((ValueKind::Ident, "dest_port"), (ValueKind::Int, "80")),
        ]
    );

    let yesterday_start = ns(local(2026, 10, 16, 0, 0, 0));
    let yesterday_end = ns(local(2026, 10, 17, 0, 0, 0)) - 1;
    assert_eq!(query.time_range.from, yesterday_start);
    assert!(query.time_range.contains(yesterday_end));
}

#[test]
fn between_yesterday_covers_the_whole_day() {
    let query = parse_at("FIND dest_ip BETWEEN YESTERDAY AND YESTERDAY", now()).unwrap();
    assert_eq!(query.time_range.from, ns(local(2026, 10, 16, 0, 0, 0)));
    assert_eq!(query.time_range.to, ns(local(2026, 10, 17, 0, 0, 0)) - 1);
}

#[test]
fn fortnight_ago_without_count_is_rejected() {
    let err = parse_at("FIND src_ip,dest_ip BETWEEN LAST MONTH AND FORTNIGHT AGO", now()).unwrap_err();
    assert!(matches!(err, ParseError::NotAnIntegerLiteral(_)));
    assert_eq!(err.location().near, "FORTNIGHT AGO");
}

#[test]
fn pipe_hands_on_the_remainder() {
    let piped = parse_at(
        "FIND [dest_ip] MATCHING src_ip='192.168.0.1' AND dest_port=80 SINCE YESTERDAY | DISTINCT src_ip",
        now(),
    )
    .unwrap();
    let plain = parse_at(
        "FIND [dest_ip] MATCHING src_ip='192.168.0.1' AND dest_port=80 SINCE YESTERDAY",
        now(),
    )
    .unwrap();

    assert_eq!(piped.fields, plain.fields);
    assert_eq!(piped.condition, plain.condition);
    assert_eq!(piped.time_range, plain.time_range);
    assert!(plain.remainder_tokens.is_empty());

    let expected = tokenize("DISTINCT src_ip").unwrap();
    let key = |t: &findql::Token| (t.kind, t.tag, t.text.clone());
    assert_eq!(
        piped.remainder_tokens.iter().map(key).collect::<Vec<_>>(),
        expected.iter().map(key).collect::<Vec<_>>()
    );
    assert_eq!(piped.remainder_tokens[0].kind, TokenKind::Distinct);
}

#[test]
fn missing_temporal_clause() {
    for input in [
        "FIND src_ip",
        "FIND ALL MATCHING a=1",
        "FIND dest_ip MATCHING src_ip='192.168.0.1' AND dest_port=80",
        "FIND dest_ip MATCHING src_ip='192.168.0.1' | SORT dest_ip",
    ] {
        assert!(
            matches!(parse_at(input, now()), Err(ParseError::MissingTemporalClause(_))),
            "{input}"
        );
    }
}

#[test]
fn reversed_references_keep_from_before_to() {
    let cases = [
        "FIND a BETWEEN LAST WEEK AND 3 MONTHS AGO",
        "FIND a BETWEEN YESTERDAY AND FOREVER",
        "FIND a BETWEEN '2030-01-01' AND '2020-01-01'",
        "FIND a SINCE '2099-01-01 00:00:00'",
        "FIND a BETWEEN LAST DECEMBER AND LAST JANUARY",
    ];
    for input in cases {
        let range = parse_at(input, now()).unwrap().time_range;
        assert!(range.from <= range.to, "{input}: {range:?}");
    }
}

#[test]
fn three_and_six_months_is_not_a_range_of_counts() {
    let err = parse_at(
        "FIND dest_ip MATCHING src_ip='192.168.0.1' BETWEEN 3 AND 6 MONTHS AGO | SORT dest_ip",
        now(),
    )
    .unwrap_err();
    assert!(matches!(err, ParseError::InvalidTemporalReference(_)));
}

#[test]
fn query_serializes_to_json() {
    let query = parse_at("FIND a AS b SINCE FOREVER | SORT a", now()).unwrap();
    let json = serde_json::to_value(&query).unwrap();
    assert_eq!(json["fields"][0]["alias"], "b");
    assert_eq!(json["all_flag"], false);
    assert_eq!(json["time_range"]["from"], 0);
    assert_eq!(json["remainder_tokens"][0]["kind"], "sort");
    assert_eq!(json["remainder_tokens"][1]["tag"], "ident");
}

#[test]
fn errors_point_into_the_original_query() {
    let input = "FIND a // pick a\nMATCHING b < 3 SINCE LAST DAY";
    let err = parse_at(input, now()).unwrap_err();
    assert!(matches!(err, ParseError::ExpectedComparisonOperator(_)));
    assert_eq!(&input[err.offset()..err.offset() + 1], "<");
    assert!(err.render(input).ends_with("           ^"));
}

#[test]
fn parsers_run_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let input = format!("FIND f{i} MATCHING n={i} SINCE {} HOURS AGO", i + 1);
                parse_at(&input, now()).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let query = handle.join().unwrap();
        assert_eq!(query.fields[0].name, format!("f{i}"));
        let hours_back = i64::try_from(i + 1).unwrap();
        assert_eq!(
            query.time_range.from,
            ns(local(2026, 10, 17, 14, 0, 0) - Duration::hours(hours_back))
        );
    }
}
