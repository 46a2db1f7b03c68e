use chrono::{DateTime, FixedOffset, TimeZone};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use findql::lexer::tokenize;
use findql::parser::Parser;
use std::hint::black_box;

const TEST_CASES: &[(&str, &str)] = &[
    ("simple", "FIND src_ip SINCE LAST HOUR"),
    (
        "medium",
        "FIND dest_ip MATCHING src_ip='192.168.0.1' AND dest_port=80 SINCE YESTERDAY",
    ),
    (
        "complex",
        "FIND [dest_ip] AS dst, src_ip, proto /* all three */ \
         MATCHING src_ip='192.168.0.1' AND dest_port=80 OR proto='udp' AND dest_port=53 \
         BETWEEN MONDAY BEFORE LAST AND '2026-10-16 23:00' | DISTINCT src_ip",
    ),
];

fn reference_time() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 17, 14, 35, 27)
        .unwrap()
}

// tokenizing only
fn benchmark_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_performance");

    for &(name, query) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("tokenize", name), &query, |b, &query| {
            b.iter(|| black_box(tokenize(black_box(query)).unwrap()))
        });
    }

    group.finish();
}

// parsing pre-lexed tokens
fn benchmark_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_performance");
    let now = reference_time();

    for &(name, query) in TEST_CASES {
        let tokens = tokenize(query).unwrap();

        group.bench_with_input(BenchmarkId::new("parse", name), &tokens, |b, tokens| {
            b.iter(|| {
                let parser = Parser::new(query, black_box(tokens)).with_reference_time(now);
                black_box(parser.parse().unwrap())
            })
        });
    }

    group.finish();
}

// temporal references on their own
fn benchmark_temporal(c: &mut Criterion) {
    let references = [
        ("clock", "FIND a SINCE 90 MINUTES AGO"),
        ("weekday", "FIND a SINCE SUNDAY BEFORE LAST"),
        ("month_name", "FIND a SINCE 3 MAY AGO"),
        ("calendar", "FIND a BETWEEN 6 MONTHS AGO AND LAST QUARTER"),
        ("timestamp", "FIND a SINCE '2023-01-05 10:00:00'"),
    ];

    let mut group = c.benchmark_group("temporal_performance");
    let now = reference_time();

    for (name, query) in references {
        group.bench_with_input(BenchmarkId::new("resolve", name), &query, |b, &query| {
            b.iter(|| black_box(findql::parse_at(black_box(query), now).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_lexer, benchmark_parser, benchmark_temporal);
criterion_main!(benches);
