//! Indentation-sensitive scanner.
//!
//! Tokens are produced one at a time from a two-state machine: at the start
//! of every source line the leading whitespace is measured against the indent
//! stack (one tab counts as four spaces) and synthetic `Indent`/`Dedent`
//! markers are emitted; afterwards ordinary tokens are read until the line
//! ends. Bracket pairing is checked while scanning so the parser never sees a
//! stream with mismatched `()` / `[]`.

use thiserror::Error;

use crate::token::{ArithmeticOp, BoolOp, Keyword, RelationalOp, Span, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    LineBegin,
    TokenStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Paren,
    Square,
}

enum StepOutcome<'a> {
    Emit(Token<'a>),
    Continue,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid character '{character}'")]
    UnexpectedCharacter { character: char, span: Span },
    #[error("Invalid integer value: leading zeros are not allowed")]
    LeadingZero { span: Span },
    #[error("Invalid integer literal '{literal}'")]
    IntegerOutOfRange { literal: String, span: Span },
    #[error("Invalid character '/' (did you mean '//' for integer division?)")]
    LoneSlash { span: Span },
    #[error("Mismatched parenthesis")]
    MismatchedParenthesis { span: Span },
    #[error("Mismatched brackets")]
    MismatchedBrackets { span: Span },
    #[error("Mismatched parenthesis or brackets")]
    UnclosedBrackets { span: Span },
    #[error("Invalid indentation level")]
    InvalidDedent { span: Span },
    #[error("Lexer invariant violated: {message}")]
    InvariantViolation { message: &'static str, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::LeadingZero { span }
            | LexError::IntegerOutOfRange { span, .. }
            | LexError::LoneSlash { span }
            | LexError::MismatchedParenthesis { span }
            | LexError::MismatchedBrackets { span }
            | LexError::UnclosedBrackets { span }
            | LexError::InvalidDedent { span }
            | LexError::InvariantViolation { span, .. } => *span,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    indent_stack: Vec<usize>,
    bracket_stack: Vec<BracketKind>,
    pending_tokens: Vec<Token<'a>>,
    state: LexerState,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 0,
            indent_stack: vec![0],
            bracket_stack: Vec::new(),
            pending_tokens: Vec::new(),
            state: LexerState::LineBegin,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        loop {
            if let Some(token) = self.pending_tokens.pop() {
                return Ok(token);
            }

            match self.step_state()? {
                StepOutcome::Emit(token) => return Ok(token),
                StepOutcome::Continue => continue,
            }
        }
    }

    fn step_state(&mut self) -> LexResult<StepOutcome<'a>> {
        match self.state {
            LexerState::LineBegin => self.measure_indentation(),
            LexerState::TokenStart => {
                self.skip_spaces();

                if self.peek_char().is_none() {
                    return self.handle_eof();
                }

                Ok(StepOutcome::Emit(self.read_token()?))
            }
        }
    }

    /// Compares the leading-whitespace count of the line against the indent
    /// stack and queues `Indent`/`Dedent` tokens as needed. Blank lines are
    /// swallowed entirely.
    fn measure_indentation(&mut self) -> LexResult<StepOutcome<'a>> {
        let mut indent_level = 0;
        loop {
            match self.peek_char() {
                Some(' ') => {
                    indent_level += 1;
                    self.consume_char();
                }
                Some('\t') => {
                    indent_level += 4;
                    self.consume_char();
                }
                Some('\n') | Some('\r') => {
                    // Whitespace-only line: no Newline token, no indent change.
                    self.consume_char();
                    indent_level = 0;
                }
                Some(_) => break,
                None => {
                    self.state = LexerState::TokenStart;
                    return Ok(StepOutcome::Continue);
                }
            }
        }

        let span = self.span_here();
        let current_indent = self.current_indent(span)?;
        self.state = LexerState::TokenStart;

        if indent_level > current_indent {
            self.indent_stack.push(indent_level);
            return Ok(StepOutcome::Emit(Token::new(TokenKind::Indent, span)));
        }

        if indent_level < current_indent {
            while self.current_indent(span)? > indent_level {
                self.indent_stack.pop();
                self.pending_tokens
                    .push(Token::new(TokenKind::Dedent, span));
            }
            if self.current_indent(span)? != indent_level {
                return Err(LexError::InvalidDedent { span });
            }
        }

        Ok(StepOutcome::Continue)
    }

    fn handle_eof(&mut self) -> LexResult<StepOutcome<'a>> {
        let span = self.span_here();
        if !self.bracket_stack.is_empty() {
            return Err(LexError::UnclosedBrackets { span });
        }

        // Close every open indentation level before the final Eof.
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.pending_tokens.push(Token::new(TokenKind::Dedent, span));
        }
        if !self.pending_tokens.is_empty() {
            return Ok(StepOutcome::Continue);
        }

        Ok(StepOutcome::Emit(Token::new(TokenKind::Eof, span)))
    }

    fn read_token(&mut self) -> LexResult<Token<'a>> {
        let span = self.span_here();
        let start_idx = self.pos;
        let ch = self.consume_char().ok_or(LexError::InvariantViolation {
            message: "read_token called at end of input",
            span,
        })?;

        let kind = match ch {
            '\n' | '\r' => {
                self.state = LexerState::LineBegin;
                TokenKind::Newline
            }
            c if c.is_ascii_alphabetic() => return Ok(self.read_word(start_idx, span)),
            c if c.is_ascii_digit() => return self.read_number(start_idx, span),
            '=' => {
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    TokenKind::Relational(RelationalOp::Eq)
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    TokenKind::Relational(RelationalOp::Ne)
                } else {
                    return Err(LexError::UnexpectedCharacter {
                        character: '!',
                        span,
                    });
                }
            }
            '<' => {
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    TokenKind::Relational(RelationalOp::Le)
                } else {
                    TokenKind::Relational(RelationalOp::Lt)
                }
            }
            '>' => {
                if self.peek_char() == Some('=') {
                    self.consume_char();
                    TokenKind::Relational(RelationalOp::Ge)
                } else {
                    TokenKind::Relational(RelationalOp::Gt)
                }
            }
            '+' => TokenKind::Arithmetic(ArithmeticOp::Add),
            '-' => TokenKind::Arithmetic(ArithmeticOp::Sub),
            '*' => TokenKind::Arithmetic(ArithmeticOp::Mul),
            '/' => {
                if self.peek_char() == Some('/') {
                    self.consume_char();
                    TokenKind::Arithmetic(ArithmeticOp::FloorDiv)
                } else {
                    return Err(LexError::LoneSlash { span });
                }
            }
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '(' => {
                self.bracket_stack.push(BracketKind::Paren);
                TokenKind::LParen
            }
            ')' => {
                if self.bracket_stack.pop() != Some(BracketKind::Paren) {
                    return Err(LexError::MismatchedParenthesis { span });
                }
                TokenKind::RParen
            }
            '[' => {
                self.bracket_stack.push(BracketKind::Square);
                TokenKind::LBracket
            }
            ']' => {
                if self.bracket_stack.pop() != Some(BracketKind::Square) {
                    return Err(LexError::MismatchedBrackets { span });
                }
                TokenKind::RBracket
            }
            other => {
                return Err(LexError::UnexpectedCharacter {
                    character: other,
                    span,
                });
            }
        };

        Ok(Token::new(kind, span))
    }

    /// Reads a maximal letter/digit run and resolves it against the keyword,
    /// boolean-operator and boolean-literal tables, in that order.
    fn read_word(&mut self, start_idx: usize, span: Span) -> Token<'a> {
        self.consume_while(|c| c.is_ascii_alphanumeric());
        let word = &self.input[start_idx..self.pos];

        let kind = match word {
            "if" => TokenKind::Keyword(Keyword::If),
            "elif" => TokenKind::Keyword(Keyword::Elif),
            "else" => TokenKind::Keyword(Keyword::Else),
            "while" => TokenKind::Keyword(Keyword::While),
            "continue" => TokenKind::Keyword(Keyword::Continue),
            "break" => TokenKind::Keyword(Keyword::Break),
            "list" => TokenKind::Keyword(Keyword::List),
            "append" => TokenKind::Keyword(Keyword::Append),
            "print" => TokenKind::Keyword(Keyword::Print),
            "and" => TokenKind::BoolOp(BoolOp::And),
            "or" => TokenKind::BoolOp(BoolOp::Or),
            "not" => TokenKind::BoolOp(BoolOp::Not),
            "True" => TokenKind::Bool(true),
            "False" => TokenKind::Bool(false),
            _ => TokenKind::Identifier(word),
        };
        Token::new(kind, span)
    }

    fn read_number(&mut self, start_idx: usize, span: Span) -> LexResult<Token<'a>> {
        let first = &self.input[start_idx..self.pos];
        if first == "0" {
            if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                return Err(LexError::LeadingZero { span });
            }
            return Ok(Token::new(TokenKind::Number(0), span));
        }

        self.consume_while(|c| c.is_ascii_digit());
        let literal = &self.input[start_idx..self.pos];
        let value = literal
            .parse::<i64>()
            .map_err(|_| LexError::IntegerOutOfRange {
                literal: literal.to_string(),
                span,
            })?;
        Ok(Token::new(TokenKind::Number(value), span))
    }

    fn skip_spaces(&mut self) {
        self.consume_while(|c| c == ' ');
    }

    fn consume_while<P>(&mut self, keep: P)
    where
        P: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if !keep(c) {
                break;
            }
            self.consume_char();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn span_here(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn current_indent(&self, span: Span) -> LexResult<usize> {
        self.indent_stack
            .last()
            .copied()
            .ok_or(LexError::InvariantViolation {
                message: "indent stack is empty",
                span,
            })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_token())
    }
}

/// Tokenizes the whole input, ending with a single `Eof` token.
pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
