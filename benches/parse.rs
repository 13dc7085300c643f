//! Parsing benchmarks
//!
//! Covers the two hot paths: compiling grammar text through the
//! meta-grammar, and running a compiled grammar over input with the
//! packrat cache.

use criterion::{criterion_group, criterion_main, Criterion};
use pegrat::{meta_grammar, parse_grammar, PEG_GRAMMAR};
use std::hint::black_box;

fn bench_parse_grammar(c: &mut Criterion) {
    c.bench_function("parse_grammar/meta_source", |b| {
        b.iter(|| parse_grammar(black_box(PEG_GRAMMAR)).unwrap())
    });

    c.bench_function("parse_grammar/small", |b| {
        b.iter(|| parse_grammar(black_box("S <- ('a' / [0-9])+ '!'\n")).unwrap())
    });
}

fn bench_recognize(c: &mut Criterion) {
    let meta = meta_grammar();
    c.bench_function("recognize/self_hosting", |b| {
        b.iter(|| meta.parse(black_box(PEG_GRAMMAR), "Grammar").unwrap())
    });

    let grammar = parse_grammar("S <- ('ab' / .)*\n").unwrap();
    let input = "ab".repeat(500) + &"x".repeat(1000);
    c.bench_function("recognize/repetition_1k", |b| {
        b.iter(|| grammar.parse(black_box(&input), "S").unwrap())
    });

    let nested = parse_grammar("V <- [0-9] / '(' V ')'\n").unwrap();
    let deep = format!("{}7{}", "(".repeat(200), ")".repeat(200));
    c.bench_function("recognize/nested_200", |b| {
        b.iter(|| nested.parse(black_box(&deep), "V").unwrap())
    });
}

criterion_group!(benches, bench_parse_grammar, bench_recognize);
criterion_main!(benches);
