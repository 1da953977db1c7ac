use std::env;
use std::fs;
use std::io;
use std::process::ExitCode;

use pysub::error::{Diagnostic, ErrorKind};
use pysub::interpreter::Interpreter;
use pysub::{lexer, parser};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Diagnostic> {
    let path = env::args()
        .nth(1)
        .ok_or_else(|| Diagnostic::startup(ErrorKind::MissingFile, "No input file provided"))?;

    // The whole file is read up front; the handle is closed before lexing.
    let source = fs::read_to_string(&path).map_err(|_| {
        Diagnostic::startup(
            ErrorKind::FileOpen,
            format!("Could not open input file: {path}"),
        )
    })?;

    let tokens = lexer::tokenize(&source)?;
    let program = parser::parse_tokens(tokens)?;

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(stdout.lock());
    interpreter.run(&program)?;
    Ok(())
}
