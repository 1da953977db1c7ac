mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pysub::interpreter::run_program;
use pysub::{lexer, parser};

fn bench_interpreter(c: &mut Criterion) {
    for (label, path) in common::workloads() {
        let source = common::load_source(&path);
        let program = common::load_program(&path);

        c.bench_function(&format!("interpreter_run_{label}"), |b| {
            b.iter(|| {
                let mut out = Vec::new();
                run_program(black_box(&program), &mut out).expect("run");
                black_box(out);
            })
        });

        c.bench_function(&format!("interpreter_full_pipeline_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(&source)).expect("tokenize");
                let parsed = parser::parse_tokens(tokens).expect("parse");
                let mut out = Vec::new();
                run_program(&parsed, &mut out).expect("run");
                black_box(out);
            })
        });
    }
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);
