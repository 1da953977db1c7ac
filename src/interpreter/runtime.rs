use std::io::Write;

use crate::ast::{BinaryOp, ElifBlock, Expression, Location, Statement, UnaryOp};
use crate::token::Span;

use super::error::RuntimeError;
use super::store::SymbolStore;
use super::value::{DataType, Value};

/// Control-flow marker returned by statement execution. `Break` and
/// `Continue` travel up through enclosing blocks until the nearest `while`
/// consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Normal,
    Break,
    Continue,
}

/// Statement executor and expression evaluator. Owns the symbol store, the
/// condition-met stack (one entry per active `if` chain) and the loop depth
/// that legality of `break`/`continue` is checked against.
pub(super) struct Runtime<W> {
    store: SymbolStore,
    condition_met: Vec<bool>,
    loop_depth: usize,
    out: W,
}

impl<W: Write> Runtime<W> {
    pub(super) fn new(out: W) -> Self {
        Self {
            store: SymbolStore::new(),
            condition_met: Vec::new(),
            loop_depth: 0,
            out,
        }
    }

    pub(super) fn exec_block(&mut self, block: &[Statement]) -> Result<Flow, RuntimeError> {
        for statement in block {
            match self.exec_statement(statement)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }
        Ok(Flow::Normal)
    }

    pub(super) fn exec_statement(&mut self, statement: &Statement) -> Result<Flow, RuntimeError> {
        match statement {
            Statement::Assign { target, value } => {
                self.exec_assign(target, value)?;
                Ok(Flow::Normal)
            }
            Statement::ListDecl { name, span } => {
                if self.store.is_defined(name) {
                    return Err(RuntimeError::AlreadyDefined {
                        name: name.clone(),
                        span: *span,
                    });
                }
                self.store.add_list(name);
                Ok(Flow::Normal)
            }
            Statement::ListAppend { name, value, span } => {
                if !self.store.is_list_defined(name) {
                    return Err(RuntimeError::UndefinedList {
                        name: name.clone(),
                        span: *span,
                    });
                }
                let value = self.eval_expression(value)?;
                if !self.store.append(name, value) {
                    return Err(RuntimeError::Internal {
                        message: format!("list '{name}' disappeared from the store"),
                        span: *span,
                    });
                }
                Ok(Flow::Normal)
            }
            Statement::Print { value, span } => {
                let value = self.eval_expression(value)?;
                writeln!(self.out, "{value}").map_err(|error| RuntimeError::OutputWrite {
                    message: error.to_string(),
                    span: *span,
                })?;
                Ok(Flow::Normal)
            }
            Statement::Break { span } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeError::BreakOutsideLoop { span: *span });
                }
                Ok(Flow::Break)
            }
            Statement::Continue { span } => {
                if self.loop_depth == 0 {
                    return Err(RuntimeError::ContinueOutsideLoop { span: *span });
                }
                Ok(Flow::Continue)
            }
            Statement::If {
                condition,
                then_block,
                elif_blocks,
                else_block,
                span,
            } => {
                self.condition_met.push(false);
                let result =
                    self.exec_if_chain(condition, then_block, elif_blocks, else_block, *span);
                self.condition_met.pop();
                result
            }
            Statement::While {
                condition, body, ..
            } => {
                self.loop_depth += 1;
                let result = self.run_loop(condition, body);
                self.loop_depth -= 1;
                result
            }
        }
    }

    /// One pass over an `if` chain: the first branch whose condition holds
    /// marks the chain as satisfied, and every later branch checks that mark
    /// before looking at its own condition.
    fn exec_if_chain(
        &mut self,
        condition: &Expression,
        then_block: &[Statement],
        elif_blocks: &[ElifBlock],
        else_block: &Option<Vec<Statement>>,
        span: Span,
    ) -> Result<Flow, RuntimeError> {
        let mut flow = Flow::Normal;
        if self.eval_condition(condition, "If")? {
            self.mark_branch_taken(span)?;
            flow = self.exec_block(then_block)?;
        }

        for elif in elif_blocks {
            if self.branch_taken(elif.span)? {
                break;
            }
            if self.eval_condition(&elif.condition, "Elif")? {
                self.mark_branch_taken(elif.span)?;
                flow = self.exec_block(&elif.body)?;
            }
        }

        if let Some(block) = else_block {
            if !self.branch_taken(span)? {
                flow = self.exec_block(block)?;
            }
        }

        Ok(flow)
    }

    fn run_loop(&mut self, condition: &Expression, body: &[Statement]) -> Result<Flow, RuntimeError> {
        loop {
            if !self.eval_condition(condition, "While")? {
                return Ok(Flow::Normal);
            }
            match self.exec_block(body)? {
                Flow::Break => return Ok(Flow::Normal),
                Flow::Normal | Flow::Continue => {}
            }
        }
    }

    fn exec_assign(&mut self, target: &Location, value: &Expression) -> Result<(), RuntimeError> {
        let value = self.eval_expression(value)?;
        match target {
            Location::Id { name, .. } => {
                // A scalar assignment may take over a list name; the list is
                // dropped first.
                if self.store.is_list_defined(name) && !self.store.is_var_defined(name) {
                    self.store.clear(name);
                }
                self.store.set_var(name, value);
            }
            Location::ListElement { name, index, span } => {
                if !self.store.is_list_defined(name) {
                    return Err(RuntimeError::UndefinedList {
                        name: name.clone(),
                        span: *span,
                    });
                }
                let index = self.eval_index(name, index, *span)?;
                if !self.store.update_elem(name, index, value) {
                    return Err(RuntimeError::Internal {
                        message: format!("list '{name}' lost element {index} during assignment"),
                        span: *span,
                    });
                }
            }
        }
        Ok(())
    }

    fn eval_condition(
        &self,
        condition: &Expression,
        context: &'static str,
    ) -> Result<bool, RuntimeError> {
        match self.eval_expression(condition)? {
            Value::Bool(value) => Ok(value),
            Value::Int(_) => Err(RuntimeError::NonBooleanCondition {
                context,
                span: condition.span(),
            }),
        }
    }

    fn eval_expression(&self, expr: &Expression) -> Result<Value, RuntimeError> {
        match expr {
            Expression::Number { value, .. } => Ok(Value::Int(*value)),
            Expression::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expression::Location(location) => self.eval_location(location),
            Expression::Unary { op, operand, span } => match op {
                UnaryOp::Not => {
                    if self.data_type(operand)? != DataType::Bool {
                        return Err(RuntimeError::NotOperand { span: *span });
                    }
                    let value = self.eval_expression(operand)?.as_bool(*span)?;
                    Ok(Value::Bool(!value))
                }
                UnaryOp::Neg => {
                    if self.data_type(operand)? != DataType::Int {
                        return Err(RuntimeError::NegOperand { span: *span });
                    }
                    let value = self.eval_expression(operand)?.as_int(*span)?;
                    Ok(Value::Int(value.wrapping_neg()))
                }
            },
            Expression::Binary {
                op,
                left,
                right,
                span,
            } => self.eval_binary(*op, left, right, *span),
        }
    }

    /// Every compound node type-checks both operands (structurally, via
    /// `data_type`) before anything is evaluated; `and`/`or` then
    /// short-circuit, so a deciding left operand skips evaluation of the
    /// right one entirely.
    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expression,
        right: &Expression,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match op {
            BinaryOp::Or | BinaryOp::And => {
                if self.data_type(left)? != DataType::Bool
                    || self.data_type(right)? != DataType::Bool
                {
                    return Err(RuntimeError::BooleanOperands {
                        op: op.symbol(),
                        span,
                    });
                }
                let left = self.eval_expression(left)?.as_bool(span)?;
                match (op, left) {
                    (BinaryOp::Or, true) => Ok(Value::Bool(true)),
                    (BinaryOp::And, false) => Ok(Value::Bool(false)),
                    _ => Ok(Value::Bool(self.eval_expression(right)?.as_bool(span)?)),
                }
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                let left_type = self.data_type(left)?;
                let right_type = self.data_type(right)?;
                if left_type == DataType::Undefined || left_type != right_type {
                    return Err(RuntimeError::EqualityOperands { span });
                }
                let left = self.eval_expression(left)?;
                let right = self.eval_expression(right)?;
                let equal = left == right;
                Ok(Value::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if self.data_type(left)? != DataType::Int
                    || self.data_type(right)? != DataType::Int
                {
                    return Err(RuntimeError::ComparisonOperands { span });
                }
                let left = self.eval_expression(left)?.as_int(span)?;
                let right = self.eval_expression(right)?.as_int(span)?;
                let result = match op {
                    BinaryOp::Lt => left < right,
                    BinaryOp::Le => left <= right,
                    BinaryOp::Gt => left > right,
                    _ => left >= right,
                };
                Ok(Value::Bool(result))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FloorDiv => {
                if self.data_type(left)? != DataType::Int
                    || self.data_type(right)? != DataType::Int
                {
                    return Err(RuntimeError::ArithmeticOperands { span });
                }
                let left = self.eval_expression(left)?.as_int(span)?;
                let right = self.eval_expression(right)?.as_int(span)?;
                let result = match op {
                    BinaryOp::Add => left.wrapping_add(right),
                    BinaryOp::Sub => left.wrapping_sub(right),
                    BinaryOp::Mul => left.wrapping_mul(right),
                    _ => {
                        if right == 0 {
                            return Err(RuntimeError::DivisionByZero { span });
                        }
                        // Truncates toward zero, like the host's `/`.
                        left.wrapping_div(right)
                    }
                };
                Ok(Value::Int(result))
            }
        }
    }

    fn eval_location(&self, location: &Location) -> Result<Value, RuntimeError> {
        match location {
            Location::Id { name, span } => {
                self.store
                    .get_var(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        span: *span,
                    })
            }
            Location::ListElement { name, index, span } => {
                if !self.store.is_list_defined(name) {
                    return Err(RuntimeError::UndefinedList {
                        name: name.clone(),
                        span: *span,
                    });
                }
                let index = self.eval_index(name, index, *span)?;
                self.store
                    .get_elem(name, index)
                    .ok_or_else(|| RuntimeError::Internal {
                        message: format!("list '{name}' lost element {index}"),
                        span: *span,
                    })
            }
        }
    }

    /// Evaluates a list index: its static type must be `Int` and its value
    /// must land inside the list named `name`.
    fn eval_index(
        &self,
        name: &str,
        index: &Expression,
        span: Span,
    ) -> Result<usize, RuntimeError> {
        if self.data_type(index)? != DataType::Int {
            return Err(RuntimeError::NonIntegerIndex { span: index.span() });
        }
        let value = self.eval_expression(index)?.as_int(index.span())?;
        let len = self.store.size(name).ok_or_else(|| RuntimeError::Internal {
            message: format!("list '{name}' disappeared from the store"),
            span,
        })?;
        if value < 0 || value as usize >= len {
            return Err(RuntimeError::IndexOutOfBounds {
                name: name.to_string(),
                span,
            });
        }
        Ok(value as usize)
    }

    /// Static type of an expression against the current store. Operand
    /// combinations no operator accepts collapse to `Undefined` rather than
    /// failing; only locations can raise here (undefined names, bad list
    /// indices), because their type is the tag of a stored value.
    fn data_type(&self, expr: &Expression) -> Result<DataType, RuntimeError> {
        match expr {
            Expression::Number { .. } => Ok(DataType::Int),
            Expression::Bool { .. } => Ok(DataType::Bool),
            Expression::Location(location) => {
                self.eval_location(location).map(Value::data_type)
            }
            Expression::Unary { op, operand, .. } => {
                let operand = self.data_type(operand)?;
                Ok(match (op, operand) {
                    (UnaryOp::Not, DataType::Bool) => DataType::Bool,
                    (UnaryOp::Neg, DataType::Int) => DataType::Int,
                    _ => DataType::Undefined,
                })
            }
            Expression::Binary {
                op, left, right, ..
            } => {
                let left = self.data_type(left)?;
                let right = self.data_type(right)?;
                Ok(match op {
                    BinaryOp::Or | BinaryOp::And => {
                        if left == DataType::Bool && right == DataType::Bool {
                            DataType::Bool
                        } else {
                            DataType::Undefined
                        }
                    }
                    BinaryOp::Eq | BinaryOp::Ne => {
                        if left != DataType::Undefined && left == right {
                            DataType::Bool
                        } else {
                            DataType::Undefined
                        }
                    }
                    BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                        if left == DataType::Int && right == DataType::Int {
                            DataType::Bool
                        } else {
                            DataType::Undefined
                        }
                    }
                    BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::FloorDiv => {
                        if left == DataType::Int && right == DataType::Int {
                            DataType::Int
                        } else {
                            DataType::Undefined
                        }
                    }
                })
            }
        }
    }

    fn branch_taken(&self, span: Span) -> Result<bool, RuntimeError> {
        self.condition_met
            .last()
            .copied()
            .ok_or_else(|| RuntimeError::Internal {
                message: "condition-met stack is empty".to_string(),
                span,
            })
    }

    fn mark_branch_taken(&mut self, span: Span) -> Result<(), RuntimeError> {
        match self.condition_met.last_mut() {
            Some(top) => {
                *top = true;
                Ok(())
            }
            None => Err(RuntimeError::Internal {
                message: "condition-met stack is empty".to_string(),
                span,
            }),
        }
    }
}
