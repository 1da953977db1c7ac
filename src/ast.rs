//! Syntax tree produced by the parser and walked by the interpreter.
//!
//! Nodes own their children by value and carry the source span of the token
//! that introduced them. `Display` renders canonical source text (4-space
//! indents, minimal parentheses), which round-trips through the parser.

use std::fmt;

use crate::token::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    FloorDiv,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::FloorDiv => "//",
        }
    }

    /// Grammar level of the operator, loosest binding first.
    fn level(self) -> u8 {
        match self {
            BinaryOp::Or => 0,
            BinaryOp::And => 1,
            BinaryOp::Eq | BinaryOp::Ne => 2,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::FloorDiv => 5,
        }
    }

    /// Whether the grammar lets the operator recurse at its own level on the
    /// right-hand side (`a or b or c`); equality and comparison do not chain.
    fn chains(self) -> bool {
        !matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Id {
        name: String,
        span: Span,
    },
    ListElement {
        name: String,
        index: Box<Expression>,
        span: Span,
    },
}

impl Location {
    pub fn span(&self) -> Span {
        match self {
            Location::Id { span, .. } | Location::ListElement { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number {
        value: i64,
        span: Span,
    },
    Bool {
        value: bool,
        span: Span,
    },
    Location(Location),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Number { span, .. }
            | Expression::Bool { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. } => *span,
            Expression::Location(location) => location.span(),
        }
    }

    fn level(&self) -> u8 {
        match self {
            Expression::Binary { op, .. } => op.level(),
            Expression::Unary { .. } => 6,
            Expression::Number { .. } | Expression::Bool { .. } | Expression::Location(_) => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifBlock {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign {
        target: Location,
        value: Expression,
    },
    ListDecl {
        name: String,
        span: Span,
    },
    ListAppend {
        name: String,
        value: Expression,
        span: Span,
    },
    Print {
        value: Expression,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    If {
        condition: Expression,
        then_block: Vec<Statement>,
        elif_blocks: Vec<ElifBlock>,
        else_block: Option<Vec<Statement>>,
        span: Span,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign { target, .. } => target.span(),
            Statement::ListDecl { span, .. }
            | Statement::ListAppend { span, .. }
            | Statement::Print { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::If { span, .. }
            | Statement::While { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

// Canonical rendering below. Expressions print with the fewest parentheses
// that survive a re-parse: the left operand of a binary node must bind
// tighter than the node, the right operand at least as tight (exactly
// tighter for the non-chaining operators).

fn fmt_expression(f: &mut fmt::Formatter<'_>, expr: &Expression, min_level: u8) -> fmt::Result {
    let parenthesize = expr.level() < min_level;
    if parenthesize {
        write!(f, "(")?;
    }
    match expr {
        Expression::Number { value, .. } => write!(f, "{value}")?,
        Expression::Bool { value, .. } => write!(f, "{}", if *value { "True" } else { "False" })?,
        Expression::Location(location) => write!(f, "{location}")?,
        Expression::Unary { op, operand, .. } => {
            match op {
                UnaryOp::Not => write!(f, "not ")?,
                UnaryOp::Neg => write!(f, "-")?,
            }
            fmt_expression(f, operand, 6)?;
        }
        Expression::Binary {
            op, left, right, ..
        } => {
            fmt_expression(f, left, op.level() + 1)?;
            write!(f, " {} ", op.symbol())?;
            let right_min = if op.chains() {
                op.level()
            } else {
                op.level() + 1
            };
            fmt_expression(f, right, right_min)?;
        }
    }
    if parenthesize {
        write!(f, ")")?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_expression(f, self, 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Id { name, .. } => write!(f, "{name}"),
            Location::ListElement { name, index, .. } => write!(f, "{name}[{index}]"),
        }
    }
}

fn fmt_block(f: &mut fmt::Formatter<'_>, block: &[Statement], level: usize) -> fmt::Result {
    for statement in block {
        fmt_statement(f, statement, level)?;
    }
    Ok(())
}

fn fmt_statement(f: &mut fmt::Formatter<'_>, statement: &Statement, level: usize) -> fmt::Result {
    for _ in 0..level {
        write!(f, "    ")?;
    }
    match statement {
        Statement::Assign { target, value } => writeln!(f, "{target} = {value}"),
        Statement::ListDecl { name, .. } => writeln!(f, "{name} = list()"),
        Statement::ListAppend { name, value, .. } => writeln!(f, "{name}.append({value})"),
        Statement::Print { value, .. } => writeln!(f, "print({value})"),
        Statement::Break { .. } => writeln!(f, "break"),
        Statement::Continue { .. } => writeln!(f, "continue"),
        Statement::If {
            condition,
            then_block,
            elif_blocks,
            else_block,
            ..
        } => {
            writeln!(f, "if {condition}:")?;
            fmt_block(f, then_block, level + 1)?;
            for elif in elif_blocks {
                for _ in 0..level {
                    write!(f, "    ")?;
                }
                writeln!(f, "elif {}:", elif.condition)?;
                fmt_block(f, &elif.body, level + 1)?;
            }
            if let Some(block) = else_block {
                for _ in 0..level {
                    write!(f, "    ")?;
                }
                writeln!(f, "else:")?;
                fmt_block(f, block, level + 1)?;
            }
            Ok(())
        }
        Statement::While {
            condition, body, ..
        } => {
            writeln!(f, "while {condition}:")?;
            fmt_block(f, body, level + 1)
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_statement(f, self, 0)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_block(f, &self.statements, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(value: i64) -> Expression {
        Expression::Number {
            value,
            span: Span::default(),
        }
    }

    fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: Span::default(),
        }
    }

    #[test]
    fn renders_right_leaning_chain_without_parentheses() {
        let expr = binary(BinaryOp::Sub, number(1), binary(BinaryOp::Sub, number(2), number(3)));
        assert_eq!(expr.to_string(), "1 - 2 - 3");
    }

    #[test]
    fn parenthesizes_left_leaning_chain() {
        let expr = binary(BinaryOp::Sub, binary(BinaryOp::Sub, number(1), number(2)), number(3));
        assert_eq!(expr.to_string(), "(1 - 2) - 3");
    }

    #[test]
    fn parenthesizes_looser_operand_under_tighter_operator() {
        let expr = binary(BinaryOp::Mul, number(2), binary(BinaryOp::Add, number(1), number(3)));
        assert_eq!(expr.to_string(), "2 * (1 + 3)");
    }

    #[test]
    fn parenthesizes_nested_equality() {
        let inner = binary(BinaryOp::Eq, number(1), number(2));
        let expr = binary(BinaryOp::Eq, inner, number(3));
        assert_eq!(expr.to_string(), "(1 == 2) == 3");
    }

    #[test]
    fn renders_unary_operators() {
        let neg = Expression::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(binary(BinaryOp::Add, number(1), number(2))),
            span: Span::default(),
        };
        assert_eq!(neg.to_string(), "-(1 + 2)");

        let not = Expression::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expression::Bool {
                value: true,
                span: Span::default(),
            }),
            span: Span::default(),
        };
        assert_eq!(not.to_string(), "not True");
    }

    #[test]
    fn renders_statements_with_indentation() {
        let program = Program {
            statements: vec![Statement::While {
                condition: binary(
                    BinaryOp::Lt,
                    Expression::Location(Location::Id {
                        name: "i".to_string(),
                        span: Span::default(),
                    }),
                    number(3),
                ),
                body: vec![Statement::Print {
                    value: Expression::Location(Location::Id {
                        name: "i".to_string(),
                        span: Span::default(),
                    }),
                    span: Span::default(),
                }],
                span: Span::default(),
            }],
        };
        assert_eq!(program.to_string(), "while i < 3:\n    print(i)\n");
    }
}
