//! Recursive-descent parser.
//!
//! Statements dispatch on up to three tokens of lookahead (enough to tell
//! `xs.append(1)` and `xs = list()` apart from a plain assignment). The
//! expression grammar is a ladder of one method per precedence level; every
//! binary operator is checked before it is consumed and recurses at its own
//! level on the right, so `a or b or c` groups as `a or (b or c)` while
//! `a == b == c` fails at the statement boundary.

use thiserror::Error;

use crate::ast::{
    BinaryOp, ElifBlock, Expression, Location, Program, Statement, UnaryOp,
};
use crate::token::{ArithmeticOp, BoolOp, Keyword, RelationalOp, Span, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expected {expected} in {context}")]
    Expected {
        expected: &'static str,
        context: &'static str,
        span: Span,
    },
    #[error("Expected newline at the end of {context}")]
    MissingNewline { context: &'static str, span: Span },
    #[error("Expected indentation in block")]
    MissingIndent { span: Span },
    #[error("Expected dedentation in block")]
    MissingDedent { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Expected { span, .. }
            | ParseError::MissingNewline { span, .. }
            | ParseError::MissingIndent { span }
            | ParseError::MissingDedent { span } => *span,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    current: Token<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new(TokenKind::Eof, Span::default()));
        }
        let current = tokens[0];
        Self {
            tokens,
            pos: 0,
            current,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while !matches!(self.current.kind, TokenKind::Eof) {
            match self.parse_statement()? {
                Some(statement) => statements.push(statement),
                // Tokens that open no statement are skipped; the cursor must
                // always advance here or the loop would never end.
                None => {
                    self.advance();
                }
            }
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Print) => self.parse_print().map(Some),
            TokenKind::Keyword(Keyword::Break) => self.parse_break().map(Some),
            TokenKind::Keyword(Keyword::Continue) => self.parse_continue().map(Some),
            TokenKind::Keyword(Keyword::If) => self.parse_if().map(Some),
            TokenKind::Keyword(Keyword::While) => self.parse_while().map(Some),
            TokenKind::Identifier(_) => {
                if matches!(self.peek_kind(1), TokenKind::Dot)
                    && matches!(self.peek_kind(2), TokenKind::Keyword(Keyword::Append))
                {
                    self.parse_list_append().map(Some)
                } else if matches!(self.peek_kind(1), TokenKind::Assign)
                    && matches!(self.peek_kind(2), TokenKind::Keyword(Keyword::List))
                {
                    self.parse_list_declaration().map(Some)
                } else {
                    self.parse_assignment().map(Some)
                }
            }
            _ => Ok(None),
        }
    }

    fn parse_print(&mut self) -> ParseResult<Statement> {
        const CONTEXT: &str = "print statement";
        let span = self.current.span;
        self.advance();
        self.expect_lparen(CONTEXT)?;
        let value = self.parse_expression()?;
        self.expect_rparen(CONTEXT)?;
        self.expect_statement_end(CONTEXT)?;
        Ok(Statement::Print { value, span })
    }

    fn parse_break(&mut self) -> ParseResult<Statement> {
        let span = self.current.span;
        self.advance();
        self.expect_statement_end("break statement")?;
        Ok(Statement::Break { span })
    }

    fn parse_continue(&mut self) -> ParseResult<Statement> {
        let span = self.current.span;
        self.advance();
        self.expect_statement_end("continue statement")?;
        Ok(Statement::Continue { span })
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        const CONTEXT: &str = "assignment statement";
        let target = self.parse_location()?;
        self.expect_assign(CONTEXT)?;
        let value = self.parse_expression()?;
        self.expect_statement_end(CONTEXT)?;
        Ok(Statement::Assign { target, value })
    }

    fn parse_list_declaration(&mut self) -> ParseResult<Statement> {
        const CONTEXT: &str = "list declaration statement";
        let (name, span) = self.expect_identifier(CONTEXT)?;
        self.expect_assign(CONTEXT)?;
        self.expect_keyword(Keyword::List, "'list'", CONTEXT)?;
        self.expect_lparen(CONTEXT)?;
        self.expect_rparen(CONTEXT)?;
        self.expect_statement_end(CONTEXT)?;
        Ok(Statement::ListDecl { name, span })
    }

    fn parse_list_append(&mut self) -> ParseResult<Statement> {
        const CONTEXT: &str = "list append statement";
        let (name, span) = self.expect_identifier(CONTEXT)?;
        self.expect_dot(CONTEXT)?;
        self.expect_keyword(Keyword::Append, "'append'", CONTEXT)?;
        self.expect_lparen(CONTEXT)?;
        let value = self.parse_expression()?;
        self.expect_rparen(CONTEXT)?;
        self.expect_statement_end(CONTEXT)?;
        Ok(Statement::ListAppend { name, value, span })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let span = self.current.span;
        self.advance();
        let condition = self.parse_expression()?;
        self.expect_colon("compound statement")?;
        let then_block = self.parse_block()?;

        let mut elif_blocks = Vec::new();
        while matches!(self.current.kind, TokenKind::Keyword(Keyword::Elif)) {
            let elif_span = self.current.span;
            self.advance();
            let condition = self.parse_expression()?;
            self.expect_colon("elif block")?;
            let body = self.parse_block()?;
            elif_blocks.push(ElifBlock {
                condition,
                body,
                span: elif_span,
            });
        }

        let mut else_block = None;
        if matches!(self.current.kind, TokenKind::Keyword(Keyword::Else)) {
            self.advance();
            self.expect_colon("else block")?;
            else_block = Some(self.parse_block()?);
        }

        Ok(Statement::If {
            condition,
            then_block,
            elif_blocks,
            else_block,
            span,
        })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let span = self.current.span;
        self.advance();
        let condition = self.parse_expression()?;
        self.expect_colon("compound statement")?;
        let body = self.parse_block()?;
        Ok(Statement::While {
            condition,
            body,
            span,
        })
    }

    /// `block ::= NEWLINE INDENT statement+ DEDENT`. Reaching `Eof` ends the
    /// statement scan and is reported as the missing dedent.
    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        if !matches!(self.current.kind, TokenKind::Newline) {
            return Err(ParseError::Expected {
                expected: "newline",
                context: "block",
                span: self.current.span,
            });
        }
        self.advance();

        if !matches!(self.current.kind, TokenKind::Indent) {
            return Err(ParseError::MissingIndent {
                span: self.current.span,
            });
        }
        self.advance();

        let mut statements = Vec::new();
        while !matches!(self.current.kind, TokenKind::Dedent | TokenKind::Eof) {
            match self.parse_statement()? {
                Some(statement) => statements.push(statement),
                None => {
                    self.advance();
                }
            }
        }

        if !matches!(self.current.kind, TokenKind::Dedent) {
            return Err(ParseError::MissingDedent {
                span: self.current.span,
            });
        }
        self.advance();

        Ok(statements)
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let left = self.parse_join()?;
        if matches!(self.current.kind, TokenKind::BoolOp(BoolOp::Or)) {
            let span = self.current.span;
            self.advance();
            let right = self.parse_expression()?;
            return Ok(binary(BinaryOp::Or, left, right, span));
        }
        Ok(left)
    }

    fn parse_join(&mut self) -> ParseResult<Expression> {
        let left = self.parse_equality()?;
        if matches!(self.current.kind, TokenKind::BoolOp(BoolOp::And)) {
            let span = self.current.span;
            self.advance();
            let right = self.parse_join()?;
            return Ok(binary(BinaryOp::And, left, right, span));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expression> {
        let left = self.parse_relation()?;
        if let TokenKind::Relational(op @ (RelationalOp::Eq | RelationalOp::Ne)) = self.current.kind
        {
            let span = self.current.span;
            self.advance();
            let right = self.parse_relation()?;
            let op = match op {
                RelationalOp::Eq => BinaryOp::Eq,
                _ => BinaryOp::Ne,
            };
            return Ok(binary(op, left, right, span));
        }
        Ok(left)
    }

    fn parse_relation(&mut self) -> ParseResult<Expression> {
        let left = self.parse_num_expr()?;
        if let TokenKind::Relational(
            op @ (RelationalOp::Lt | RelationalOp::Le | RelationalOp::Gt | RelationalOp::Ge),
        ) = self.current.kind
        {
            let span = self.current.span;
            self.advance();
            let right = self.parse_num_expr()?;
            let op = match op {
                RelationalOp::Lt => BinaryOp::Lt,
                RelationalOp::Le => BinaryOp::Le,
                RelationalOp::Gt => BinaryOp::Gt,
                _ => BinaryOp::Ge,
            };
            return Ok(binary(op, left, right, span));
        }
        Ok(left)
    }

    fn parse_num_expr(&mut self) -> ParseResult<Expression> {
        let left = self.parse_term()?;
        if let TokenKind::Arithmetic(op @ (ArithmeticOp::Add | ArithmeticOp::Sub)) =
            self.current.kind
        {
            let span = self.current.span;
            self.advance();
            let right = self.parse_num_expr()?;
            let op = match op {
                ArithmeticOp::Add => BinaryOp::Add,
                _ => BinaryOp::Sub,
            };
            return Ok(binary(op, left, right, span));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<Expression> {
        let left = self.parse_unary()?;
        if let TokenKind::Arithmetic(op @ (ArithmeticOp::Mul | ArithmeticOp::FloorDiv)) =
            self.current.kind
        {
            let span = self.current.span;
            self.advance();
            let right = self.parse_term()?;
            let op = match op {
                ArithmeticOp::Mul => BinaryOp::Mul,
                _ => BinaryOp::FloorDiv,
            };
            return Ok(binary(op, left, right, span));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::BoolOp(BoolOp::Not) => {
                let span = self.current.span;
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Arithmetic(ArithmeticOp::Sub) => {
                let span = self.current.span;
                self.advance();
                let operand = self.parse_unary()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_factor(),
        }
    }

    fn parse_factor(&mut self) -> ParseResult<Expression> {
        match self.current.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("expression factor")?;
                Ok(expr)
            }
            TokenKind::Number(value) => {
                let span = self.current.span;
                self.advance();
                Ok(Expression::Number { value, span })
            }
            TokenKind::Bool(value) => {
                let span = self.current.span;
                self.advance();
                Ok(Expression::Bool { value, span })
            }
            TokenKind::Identifier(_) => Ok(Expression::Location(self.parse_location()?)),
            _ => Err(ParseError::Expected {
                expected: "factor",
                context: "expression",
                span: self.current.span,
            }),
        }
    }

    fn parse_location(&mut self) -> ParseResult<Location> {
        let (name, span) = self.expect_identifier("location")?;
        if matches!(self.current.kind, TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect_token(TokenKind::RBracket, "']'", "list element location")?;
            return Ok(Location::ListElement {
                name,
                index: Box::new(index),
                span,
            });
        }
        Ok(Location::Id { name, span })
    }

    fn expect_identifier(&mut self, context: &'static str) -> ParseResult<(String, Span)> {
        if let TokenKind::Identifier(name) = self.current.kind {
            let span = self.current.span;
            self.advance();
            Ok((name.to_string(), span))
        } else {
            Err(ParseError::Expected {
                expected: "identifier",
                context,
                span: self.current.span,
            })
        }
    }

    fn expect_keyword(
        &mut self,
        keyword: Keyword,
        expected: &'static str,
        context: &'static str,
    ) -> ParseResult<()> {
        if self.current.kind == TokenKind::Keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                context,
                span: self.current.span,
            })
        }
    }

    fn expect_assign(&mut self, context: &'static str) -> ParseResult<()> {
        self.expect_token(TokenKind::Assign, "'='", context)
    }

    fn expect_colon(&mut self, context: &'static str) -> ParseResult<()> {
        self.expect_token(TokenKind::Colon, "':'", context)
    }

    fn expect_dot(&mut self, context: &'static str) -> ParseResult<()> {
        self.expect_token(TokenKind::Dot, "'.'", context)
    }

    fn expect_lparen(&mut self, context: &'static str) -> ParseResult<()> {
        self.expect_token(TokenKind::LParen, "'('", context)
    }

    fn expect_rparen(&mut self, context: &'static str) -> ParseResult<()> {
        self.expect_token(TokenKind::RParen, "')'", context)
    }

    fn expect_token(
        &mut self,
        kind: TokenKind<'static>,
        expected: &'static str,
        context: &'static str,
    ) -> ParseResult<()> {
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                context,
                span: self.current.span,
            })
        }
    }

    /// A statement may end at a newline or directly at the end of the file.
    fn expect_statement_end(&mut self, context: &'static str) -> ParseResult<()> {
        match self.current.kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(ParseError::MissingNewline {
                context,
                span: self.current.span,
            }),
        }
    }

    fn advance(&mut self) {
        self.pos = self.pos.saturating_add(1);
        self.current = self
            .tokens
            .get(self.pos)
            .copied()
            .unwrap_or(Token::new(TokenKind::Eof, Span::default()));
    }

    fn peek_kind(&self, offset: usize) -> TokenKind<'a> {
        self.tokens
            .get(self.pos + offset)
            .map(|token| token.kind)
            .unwrap_or(TokenKind::Eof)
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression, span: Span) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn parse(source: &str) -> Program {
        let tokens = crate::lexer::tokenize(source).expect("tokenize should succeed");
        parse_tokens(tokens).expect("parse should succeed")
    }

    fn parse_err(source: &str) -> ParseError {
        let tokens = crate::lexer::tokenize(source).expect("tokenize should succeed");
        parse_tokens(tokens).expect_err("expected parse failure")
    }

    fn first_expression(program: &Program) -> &Expression {
        match &program.statements[0] {
            Statement::Print { value, .. } => value,
            Statement::Assign { value, .. } => value,
            other => panic!("unexpected first statement: {other:?}"),
        }
    }

    #[test]
    fn parses_simple_program() {
        let program = parse(indoc! {"
            x = 1
            x = x + 2
            print(x)
        "});
        assert_eq!(program.statements.len(), 3);
        assert!(matches!(
            &program.statements[0],
            Statement::Assign {
                target: Location::Id { name, .. },
                value: Expression::Number { value: 1, .. },
            } if name == "x"
        ));
        assert!(matches!(&program.statements[2], Statement::Print { .. }));
    }

    #[test]
    fn distinguishes_list_forms_from_assignment() {
        let program = parse(indoc! {"
            xs = list()
            xs.append(10)
            xs[0] = 20
            ys = xs[0]
        "});
        assert!(matches!(&program.statements[0], Statement::ListDecl { name, .. } if name == "xs"));
        assert!(
            matches!(&program.statements[1], Statement::ListAppend { name, .. } if name == "xs")
        );
        assert!(matches!(
            &program.statements[2],
            Statement::Assign {
                target: Location::ListElement { .. },
                ..
            }
        ));
        assert!(matches!(
            &program.statements[3],
            Statement::Assign {
                value: Expression::Location(Location::ListElement { .. }),
                ..
            }
        ));
    }

    #[test]
    fn or_and_chains_group_to_the_right() {
        let program = parse("x = a or b or c\n");
        let expr = first_expression(&program);
        match expr {
            Expression::Binary {
                op: BinaryOp::Or,
                right,
                ..
            } => {
                assert!(matches!(
                    &**right,
                    Expression::Binary {
                        op: BinaryOp::Or,
                        ..
                    }
                ));
            }
            other => panic!("expected or-chain, got {other:?}"),
        }

        let program = parse("x = a and b and c\n");
        match first_expression(&program) {
            Expression::Binary {
                op: BinaryOp::And,
                right,
                ..
            } => {
                assert!(matches!(
                    &**right,
                    Expression::Binary {
                        op: BinaryOp::And,
                        ..
                    }
                ));
            }
            other => panic!("expected and-chain, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_chains_group_to_the_right() {
        let program = parse("x = 1 - 2 - 3\n");
        match first_expression(&program) {
            Expression::Binary {
                op: BinaryOp::Sub,
                left,
                right,
                ..
            } => {
                assert!(matches!(&**left, Expression::Number { value: 1, .. }));
                assert!(matches!(
                    &**right,
                    Expression::Binary {
                        op: BinaryOp::Sub,
                        ..
                    }
                ));
            }
            other => panic!("expected subtraction chain, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let program = parse("x = 1 + 2 * 3\n");
        match first_expression(&program) {
            Expression::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => {
                assert!(matches!(
                    &**right,
                    Expression::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected addition of product, got {other:?}"),
        }
    }

    #[test]
    fn rejects_chained_equality() {
        let err = parse_err("print(a == b == c)\n");
        assert_eq!(
            err,
            ParseError::Expected {
                expected: "')'",
                context: "print statement",
                span: Span::new(1, 13),
            }
        );
    }

    #[test]
    fn rejects_chained_comparison() {
        let err = parse_err("x = a < b < c\n");
        assert!(matches!(err, ParseError::MissingNewline { .. }));
    }

    #[test]
    fn parses_if_elif_else_chain() {
        let program = parse(indoc! {"
            if a:
                print(1)
            elif b:
                print(2)
            elif c:
                print(3)
            else:
                print(4)
        "});
        match &program.statements[0] {
            Statement::If {
                elif_blocks,
                else_block,
                ..
            } => {
                assert_eq!(elif_blocks.len(), 2);
                assert!(else_block.is_some());
            }
            other => panic!("expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_blocks() {
        let program = parse(indoc! {"
            while a:
                if b:
                    break
                continue
        "});
        match &program.statements[0] {
            Statement::While { body, .. } => {
                assert_eq!(body.len(), 2);
                assert!(matches!(&body[0], Statement::If { .. }));
                assert!(matches!(&body[1], Statement::Continue { .. }));
            }
            other => panic!("expected while statement, got {other:?}"),
        }
    }

    #[test]
    fn tolerates_missing_trailing_newline() {
        let program = parse("print(1)");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn errors_on_missing_colon() {
        let err = parse_err("if True\n    print(1)\n");
        assert_eq!(
            err,
            ParseError::Expected {
                expected: "':'",
                context: "compound statement",
                span: Span::new(1, 7),
            }
        );
    }

    #[test]
    fn errors_on_missing_block_indent() {
        let err = parse_err("if True:\nprint(1)\n");
        assert!(matches!(err, ParseError::MissingIndent { .. }));
    }

    #[test]
    fn errors_on_malformed_list_declaration() {
        let err = parse_err("xs = list[1]\n");
        assert!(matches!(
            err,
            ParseError::Expected {
                expected: "'('",
                ..
            }
        ));
    }

    #[test]
    fn errors_on_missing_assignment_value() {
        let err = parse_err("x =\n");
        assert_eq!(
            err,
            ParseError::Expected {
                expected: "factor",
                context: "expression",
                span: Span::new(1, 3),
            }
        );
    }

    #[test]
    fn canonical_rendering_is_a_parse_fixed_point() {
        let sources = [
            indoc! {"
                x = 1 - 2 - 3
                y = (1 - 2) - 3
                z = not (x == y) and True or False
            "},
            indoc! {"
                xs = list()
                xs.append(2 * (3 + 4))
                while xs[0] > 0:
                    xs[0] = xs[0] - 1
                    if xs[0] == 1:
                        break
                    elif xs[0] == 2:
                        continue
                    else:
                        print(-xs[0])
            "},
        ];
        for source in sources {
            let first = parse(source).to_string();
            let second = parse(&first).to_string();
            assert_eq!(first, second);
        }
    }
}
