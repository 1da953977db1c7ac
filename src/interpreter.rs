//! Tree-walking evaluator.
//!
//! Executes the parsed program directly, statement by statement. Expression
//! evaluation is guarded by a per-node static type check against the current
//! store, so operator/operand mismatches surface as type errors before any
//! side effect happens. `break`/`continue` travel as control-flow signals
//! returned from statement execution.

mod error;
mod runtime;
mod store;
mod value;

use std::io::Write;

use crate::ast::Program;

pub use error::RuntimeError;
pub use store::SymbolStore;
pub use value::{DataType, Value};

use runtime::{Flow, Runtime};

pub struct Interpreter<W: Write> {
    runtime: Runtime<W>,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W) -> Self {
        Self {
            runtime: Runtime::new(out),
        }
    }

    /// Runs the program to completion, writing `print` output to the sink as
    /// each statement executes.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for statement in &program.statements {
            match self.runtime.exec_statement(statement)? {
                Flow::Normal => {}
                Flow::Break | Flow::Continue => {
                    // Loop signals are consumed by the loops that legalize
                    // them; one reaching the root is an interpreter bug.
                    return Err(RuntimeError::Internal {
                        message: "loop control signal escaped the program root".to_string(),
                        span: statement.span(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Fresh interpreter, one program, one output sink.
pub fn run_program<W: Write>(program: &Program, out: W) -> Result<(), RuntimeError> {
    Interpreter::new(out).run(program)
}
