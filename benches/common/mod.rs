#![allow(dead_code)]
use std::fs;

use pysub::ast::Program;
use pysub::{lexer, parser};

pub const WORKLOADS: [(&str, &str); 2] = [
    ("loop_sum", "tests/programs/loop_sum/program.py"),
    ("branching", "tests/programs/branching/program.py"),
];

pub fn workloads() -> Vec<(String, String)> {
    WORKLOADS
        .iter()
        .map(|(label, path)| (label.to_string(), path.to_string()))
        .collect()
}

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_program(path: &str) -> Program {
    let source = load_source(path);
    let tokens = lexer::tokenize(&source).unwrap_or_else(|err| panic!("tokenize {path}: {err}"));
    parser::parse_tokens(tokens).unwrap_or_else(|err| panic!("parse {path}: {err}"))
}
