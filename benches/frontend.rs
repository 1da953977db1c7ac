mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pysub::{lexer, parser};

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let source = common::load_source(&path);

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source)).expect("tokenize");
                black_box(tokens);
            })
        });

        c.bench_function(&format!("frontend_tokenize_and_parse_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source)).expect("tokenize");
                let program = parser::parse_tokens(tokens).expect("parse");
                black_box(program);
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
