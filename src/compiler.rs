use crate::chunk::{Chunk, JumpError, Opcode};
use crate::heap::HeapManager;
use crate::scanner::{ScanError, ScanResult, Token, TokenContents};
use crate::value::Value;
use arrayvec::ArrayVec;
use log::{debug, trace};
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use thiserror::Error;

pub type CompileResult<A> = Result<A, CompileErrors>;
type ParseResult<A> = Result<A, CompileError>;

pub const MAX_LOCALS: usize = 256;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Ord, Eq)]
enum BindingPower {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl BindingPower {
    /// One level tighter, so that binary operators associate to the left.
    fn next(self) -> Self {
        use BindingPower::*;
        match self {
            None => Assignment,
            Assignment => Or,
            Or => And,
            And => Equality,
            Equality => Comparison,
            Comparison => Term,
            Term => Factor,
            Factor => Unary,
            Unary => Call,
            Call => Primary,
            Primary => Primary,
        }
    }
}

/// Compiles a whole token stream into one chunk. Every error found along the way is
/// collected; if there was any, the chunk is discarded.
pub fn compile<'a>(
    tokens: impl Iterator<Item = ScanResult<Token<'a>>>,
    heap: &mut HeapManager,
) -> CompileResult<Chunk> {
    Compiler::new(tokens, Chunk::new("script"), heap).compile()
}

type ParseFn<'a, 'h, I> = fn(&mut Compiler<'a, 'h, I>, bool) -> ParseResult<()>;

struct ParseRule<'a, 'h, I> {
    prefix: Option<ParseFn<'a, 'h, I>>,
    infix: Option<ParseFn<'a, 'h, I>>,
    binding_power: BindingPower,
}

#[derive(Debug)]
struct Local<'a> {
    name: &'a str,
    /// `None` until the initializer has been compiled.
    depth: Option<NonZeroUsize>,
}

struct Compiler<'a, 'h, I> {
    tokens: I,
    current: Token<'a>,
    previous: Token<'a>,
    chunk: Chunk,
    heap: &'h mut HeapManager,
    errors: CompileErrors,
    panic_mode: bool,
    locals: ArrayVec<Local<'a>, MAX_LOCALS>,
    scope_depth: usize,
}

impl<'a, 'h, I> Compiler<'a, 'h, I>
where
    I: Iterator<Item = ScanResult<Token<'a>>>,
{
    fn new(tokens: I, chunk: Chunk, heap: &'h mut HeapManager) -> Self {
        Self {
            tokens,
            current: Token::eof(1),
            previous: Token::eof(1),
            chunk,
            heap,
            errors: CompileErrors::default(),
            panic_mode: false,
            locals: ArrayVec::new(),
            scope_depth: 0,
        }
    }

    fn compile(mut self) -> CompileResult<Chunk> {
        self.advance();
        while !self.match_token(TokenContents::Eof) {
            self.declaration();
        }
        self.emit(Opcode::Return);

        if self.errors.is_empty() {
            trace!(
                "Emitting chunk {}:\n{}",
                self.chunk.name(),
                self.chunk.disassemble(self.heap)
            );
            Ok(self.chunk)
        } else {
            debug!("Discarding chunk after {} errors", self.errors.len());
            Err(self.errors)
        }
    }

    // Token cursor

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            match self.tokens.next() {
                Some(Ok(token)) => {
                    self.current = token;
                    break;
                }
                Some(Err(e)) => self.report(e.into()),
                None => {
                    self.current = Token::eof(self.previous.line);
                    break;
                }
            }
        }
    }

    fn check(&self, contents: TokenContents) -> bool {
        self.current.contents == contents
    }

    fn match_token(&mut self, contents: TokenContents) -> bool {
        if self.check(contents) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, contents: TokenContents, message: &'static str) -> ParseResult<()> {
        if self.check(contents) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_at_current(ParseErrorReason::Expected(message)))
        }
    }

    // Errors

    fn error_at(token: &Token, reason: ParseErrorReason) -> CompileError {
        let location = if token.is_eof() {
            Location::End
        } else {
            Location::At(token.lexeme.to_string())
        };
        ParseError {
            line: token.line,
            location,
            reason,
        }
        .into()
    }

    fn error_at_current(&self, reason: ParseErrorReason) -> CompileError {
        Self::error_at(&self.current, reason)
    }

    fn error_at_previous(&self, reason: ParseErrorReason) -> CompileError {
        Self::error_at(&self.previous, reason)
    }

    /// Records an error unless one was already recorded since the last synchronization.
    fn report(&mut self, error: CompileError) {
        if self.panic_mode {
            trace!("Suppressed error while panicking: {error}");
            return;
        }
        self.panic_mode = true;
        debug!("Compile error: {error}");
        self.errors.push(error);
    }

    /// Skips tokens until a statement boundary.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.current.is_eof() {
            if self.previous.contents == TokenContents::Semicolon {
                return;
            }
            match self.current.contents {
                TokenContents::Class
                | TokenContents::Fun
                | TokenContents::Var
                | TokenContents::For
                | TokenContents::If
                | TokenContents::While
                | TokenContents::Print
                | TokenContents::Return => return,
                _ => self.advance(),
            }
        }
    }

    // Emitting

    fn emit(&mut self, opcode: Opcode) {
        self.chunk.add_opcode(opcode, self.previous.line)
    }

    fn emit_with_operand(&mut self, opcode: Opcode, operand: u8) {
        self.chunk
            .add_opcode_and_operand(opcode, operand, self.previous.line)
    }

    fn make_constant(&mut self, value: Value) -> ParseResult<u8> {
        match self.chunk.add_constant(value) {
            Some(idx) => Ok(idx),
            None => Err(self.error_at_previous(ParseErrorReason::TooManyConstants)),
        }
    }

    fn emit_constant(&mut self, value: Value) -> ParseResult<()> {
        let idx = self.make_constant(value)?;
        self.emit_with_operand(Opcode::Constant, idx);
        Ok(())
    }

    fn emit_jump(&mut self, opcode: Opcode) -> usize {
        self.chunk.add_dummy_jump(opcode, self.previous.line)
    }

    fn patch_jump(&mut self, offset: usize) -> ParseResult<()> {
        self.chunk
            .patch_jump(offset)
            .map_err(|e| self.error_at_previous(e.into()))
    }

    fn emit_loop(&mut self, loop_start: usize) -> ParseResult<()> {
        let line = self.previous.line;
        self.chunk
            .emit_loop(loop_start, line)
            .map_err(|e| self.error_at_previous(e.into()))
    }

    // Declarations and statements

    fn declaration(&mut self) {
        let result = if self.match_token(TokenContents::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };
        if let Err(e) = result {
            self.report(e);
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) -> ParseResult<()> {
        let global = self.parse_variable()?;
        let res = self.variable_initializer();
        // Defined even when the initializer failed, so later reads don't cascade.
        self.define_variable(global);
        res
    }

    fn variable_initializer(&mut self) -> ParseResult<()> {
        if self.match_token(TokenContents::Equal) {
            self.expression()?;
        } else {
            self.emit(Opcode::Nil);
        }
        self.consume(
            TokenContents::Semicolon,
            "Expect ';' after variable declaration.",
        )
    }

    /// Declares the variable named by the next token. Globals yield the constant index of
    /// their name; locals live in a stack slot and yield `None`.
    fn parse_variable(&mut self) -> ParseResult<Option<u8>> {
        let name = match self.current.contents {
            TokenContents::Identifier(name) => name,
            _ => {
                return Err(
                    self.error_at_current(ParseErrorReason::Expected("Expect variable name."))
                )
            }
        };
        self.advance();

        self.declare_variable(name)?;
        if self.scope_depth > 0 {
            Ok(None)
        } else {
            self.identifier_constant(name).map(Some)
        }
    }

    fn identifier_constant(&mut self, name: &str) -> ParseResult<u8> {
        let value = Value::Obj(self.heap.create_string_copied(name));
        self.make_constant(value)
    }

    fn declare_variable(&mut self, name: &'a str) -> ParseResult<()> {
        if self.scope_depth == 0 {
            return Ok(());
        }
        for local in self.locals.iter().rev() {
            if matches!(local.depth, Some(depth) if depth.get() < self.scope_depth) {
                break;
            }
            if local.name == name {
                return Err(self.error_at_previous(ParseErrorReason::DuplicateLocal));
            }
        }
        self.add_local(name)
    }

    fn add_local(&mut self, name: &'a str) -> ParseResult<()> {
        if self.locals.try_push(Local { name, depth: None }).is_err() {
            return Err(self.error_at_previous(ParseErrorReason::TooManyLocals));
        }
        Ok(())
    }

    fn define_variable(&mut self, global: Option<u8>) {
        match global {
            Some(idx) => self.emit_with_operand(Opcode::DefineGlobal, idx),
            None => {
                let depth = NonZeroUsize::new(self.scope_depth);
                if let Some(local) = self.locals.last_mut() {
                    local.depth = depth;
                }
            }
        }
    }

    fn statement(&mut self) -> ParseResult<()> {
        match self.current.contents {
            TokenContents::Print => {
                self.advance();
                self.print_statement()
            }
            TokenContents::LeftBrace => {
                self.advance();
                self.scoped(|s| s.block())
            }
            TokenContents::If => {
                self.advance();
                self.if_statement()
            }
            TokenContents::While => {
                self.advance();
                self.while_statement()
            }
            TokenContents::For => {
                self.advance();
                self.for_statement()
            }
            _ => self.expression_statement(),
        }
    }

    /// Runs `f` one scope deeper, then pops every local declared inside it.
    fn scoped(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<()>) -> ParseResult<()> {
        self.scope_depth += 1;
        let res = f(self);
        self.scope_depth -= 1;
        while let Some(last) = self.locals.last() {
            let out_of_scope = last
                .depth
                .map_or(true, |depth| depth.get() > self.scope_depth);
            if !out_of_scope {
                break;
            }
            self.emit(Opcode::Pop);
            let _ = self.locals.pop();
        }
        res
    }

    fn block(&mut self) -> ParseResult<()> {
        while !self.check(TokenContents::RightBrace) && !self.check(TokenContents::Eof) {
            self.declaration();
        }
        self.consume(TokenContents::RightBrace, "Expect '}' after block.")
    }

    fn print_statement(&mut self) -> ParseResult<()> {
        self.expression()?;
        self.consume(TokenContents::Semicolon, "Expect ';' after value.")?;
        self.emit(Opcode::Print);
        Ok(())
    }

    fn expression_statement(&mut self) -> ParseResult<()> {
        self.expression()?;
        self.consume(TokenContents::Semicolon, "Expect ';' after expression.")?;
        self.emit(Opcode::Pop);
        Ok(())
    }

    fn if_statement(&mut self) -> ParseResult<()> {
        self.consume(TokenContents::LeftParen, "Expect '(' after 'if'.")?;
        self.expression()?;
        self.consume(TokenContents::RightParen, "Expect ')' after condition.")?;

        let then_jump = self.emit_jump(Opcode::JumpIfFalse);
        self.emit(Opcode::Pop);
        self.statement()?;
        let else_jump = self.emit_jump(Opcode::Jump);

        self.patch_jump(then_jump)?;
        self.emit(Opcode::Pop);
        if self.match_token(TokenContents::Else) {
            self.statement()?;
        }
        self.patch_jump(else_jump)
    }

    fn while_statement(&mut self) -> ParseResult<()> {
        let loop_start = self.chunk.get_loop_start();
        self.consume(TokenContents::LeftParen, "Expect '(' after 'while'.")?;
        self.expression()?;
        self.consume(TokenContents::RightParen, "Expect ')' after condition.")?;

        let exit_jump = self.emit_jump(Opcode::JumpIfFalse);
        self.emit(Opcode::Pop);
        self.statement()?;
        self.emit_loop(loop_start)?;

        self.patch_jump(exit_jump)?;
        self.emit(Opcode::Pop);
        Ok(())
    }

    fn for_statement(&mut self) -> ParseResult<()> {
        self.scoped(|s| {
            s.consume(TokenContents::LeftParen, "Expect '(' after 'for'.")?;
            if s.match_token(TokenContents::Semicolon) {
                // No initializer.
            } else if s.match_token(TokenContents::Var) {
                s.var_declaration()?;
            } else {
                s.expression_statement()?;
            }

            let mut loop_start = s.chunk.get_loop_start();
            let exit_jump = if s.match_token(TokenContents::Semicolon) {
                None
            } else {
                s.expression()?;
                s.consume(TokenContents::Semicolon, "Expect ';' after loop condition.")?;
                let exit_jump = s.emit_jump(Opcode::JumpIfFalse);
                s.emit(Opcode::Pop);
                Some(exit_jump)
            };

            if !s.match_token(TokenContents::RightParen) {
                let body_jump = s.emit_jump(Opcode::Jump);
                let increment_start = s.chunk.get_loop_start();
                s.expression()?;
                s.emit(Opcode::Pop);
                s.consume(TokenContents::RightParen, "Expect ')' after for clauses.")?;

                s.emit_loop(loop_start)?;
                loop_start = increment_start;
                s.patch_jump(body_jump)?;
            }

            s.statement()?;
            s.emit_loop(loop_start)?;

            if let Some(exit_jump) = exit_jump {
                s.patch_jump(exit_jump)?;
                s.emit(Opcode::Pop);
            }
            Ok(())
        })
    }

    // Expressions

    fn expression(&mut self) -> ParseResult<()> {
        self.parse_precedence(BindingPower::Assignment)
    }

    fn parse_precedence(&mut self, min_bp: BindingPower) -> ParseResult<()> {
        self.advance();
        let prefix_rule = match Self::get_rule(&self.previous.contents).prefix {
            Some(rule) => rule,
            None => return Err(self.error_at_previous(ParseErrorReason::ExpectExpression)),
        };
        let can_assign = min_bp <= BindingPower::Assignment;
        prefix_rule(self, can_assign)?;

        while min_bp <= Self::get_rule(&self.current.contents).binding_power {
            self.advance();
            if let Some(infix_rule) = Self::get_rule(&self.previous.contents).infix {
                infix_rule(self, can_assign)?;
            }
        }

        if can_assign && self.match_token(TokenContents::Equal) {
            return Err(self.error_at_previous(ParseErrorReason::InvalidAssignmentTarget));
        }
        Ok(())
    }

    fn get_rule(contents: &TokenContents) -> ParseRule<'a, 'h, I> {
        match contents {
            TokenContents::LeftParen => ParseRule {
                prefix: Some(Self::parse_grouping),
                infix: None,
                binding_power: BindingPower::None,
            },
            TokenContents::Minus => ParseRule {
                prefix: Some(Self::parse_unary),
                infix: Some(Self::parse_binary),
                binding_power: BindingPower::Term,
            },
            TokenContents::Plus => ParseRule {
                prefix: None,
                infix: Some(Self::parse_binary),
                binding_power: BindingPower::Term,
            },
            TokenContents::Slash | TokenContents::Asterisk => ParseRule {
                prefix: None,
                infix: Some(Self::parse_binary),
                binding_power: BindingPower::Factor,
            },
            TokenContents::Bang => ParseRule {
                prefix: Some(Self::parse_unary),
                infix: None,
                binding_power: BindingPower::None,
            },
            TokenContents::BangEqual | TokenContents::EqualEqual => ParseRule {
                prefix: None,
                infix: Some(Self::parse_binary),
                binding_power: BindingPower::Equality,
            },
            TokenContents::Greater
            | TokenContents::GreaterEqual
            | TokenContents::Less
            | TokenContents::LessEqual => ParseRule {
                prefix: None,
                infix: Some(Self::parse_binary),
                binding_power: BindingPower::Comparison,
            },
            TokenContents::Identifier(_) => ParseRule {
                prefix: Some(Self::parse_identifier),
                infix: None,
                binding_power: BindingPower::None,
            },
            TokenContents::String(_) => ParseRule {
                prefix: Some(Self::parse_string),
                infix: None,
                binding_power: BindingPower::None,
            },
            TokenContents::Number(_) => ParseRule {
                prefix: Some(Self::parse_number),
                infix: None,
                binding_power: BindingPower::None,
            },
            TokenContents::And => ParseRule {
                prefix: None,
                infix: Some(Self::parse_and),
                binding_power: BindingPower::And,
            },
            TokenContents::Or => ParseRule {
                prefix: None,
                infix: Some(Self::parse_or),
                binding_power: BindingPower::Or,
            },
            TokenContents::True | TokenContents::False | TokenContents::Nil => ParseRule {
                prefix: Some(Self::parse_literal),
                infix: None,
                binding_power: BindingPower::None,
            },
            _ => ParseRule {
                prefix: None,
                infix: None,
                binding_power: BindingPower::None,
            },
        }
    }

    fn parse_grouping(&mut self, _can_assign: bool) -> ParseResult<()> {
        self.expression()?;
        self.consume(TokenContents::RightParen, "Expect ')' after expression.")
    }

    fn parse_number(&mut self, _can_assign: bool) -> ParseResult<()> {
        let number: f64 = match self.previous.contents {
            TokenContents::Number(number) => number
                .parse()
                .map_err(|_| self.error_at_previous(ParseErrorReason::InvalidNumber))?,
            _ => return Err(self.error_at_previous(ParseErrorReason::ExpectExpression)),
        };
        self.emit_constant(Value::Number(number))
    }

    fn parse_string(&mut self, _can_assign: bool) -> ParseResult<()> {
        match self.previous.contents {
            TokenContents::String(s) => {
                let value = Value::Obj(self.heap.create_string_copied(s));
                self.emit_constant(value)
            }
            _ => Err(self.error_at_previous(ParseErrorReason::ExpectExpression)),
        }
    }

    fn parse_literal(&mut self, _can_assign: bool) -> ParseResult<()> {
        match self.previous.contents {
            TokenContents::True => self.emit(Opcode::True),
            TokenContents::False => self.emit(Opcode::False),
            TokenContents::Nil => self.emit(Opcode::Nil),
            _ => return Err(self.error_at_previous(ParseErrorReason::ExpectExpression)),
        }
        Ok(())
    }

    fn parse_unary(&mut self, _can_assign: bool) -> ParseResult<()> {
        let operator = self.previous;
        self.parse_precedence(BindingPower::Unary)?;
        let opcode = match operator.contents {
            TokenContents::Minus => Opcode::Negate,
            _ => Opcode::Not,
        };
        self.chunk.add_opcode(opcode, operator.line);
        Ok(())
    }

    fn parse_binary(&mut self, _can_assign: bool) -> ParseResult<()> {
        let operator = self.previous;
        let binding_power = Self::get_rule(&operator.contents).binding_power;
        self.parse_precedence(binding_power.next())?;

        let line = operator.line;
        match operator.contents {
            TokenContents::Plus => self.chunk.add_opcode(Opcode::Add, line),
            TokenContents::Minus => self.chunk.add_opcode(Opcode::Subtract, line),
            TokenContents::Asterisk => self.chunk.add_opcode(Opcode::Multiply, line),
            TokenContents::Slash => self.chunk.add_opcode(Opcode::Divide, line),
            TokenContents::EqualEqual => self.chunk.add_opcode(Opcode::Equal, line),
            TokenContents::BangEqual => {
                self.chunk.add_opcode(Opcode::Equal, line);
                self.chunk.add_opcode(Opcode::Not, line);
            }
            TokenContents::Greater => self.chunk.add_opcode(Opcode::Greater, line),
            TokenContents::GreaterEqual => {
                self.chunk.add_opcode(Opcode::Less, line);
                self.chunk.add_opcode(Opcode::Not, line);
            }
            TokenContents::Less => self.chunk.add_opcode(Opcode::Less, line),
            TokenContents::LessEqual => {
                self.chunk.add_opcode(Opcode::Greater, line);
                self.chunk.add_opcode(Opcode::Not, line);
            }
            _ => return Err(Self::error_at(&operator, ParseErrorReason::ExpectExpression)),
        }
        Ok(())
    }

    fn parse_and(&mut self, _can_assign: bool) -> ParseResult<()> {
        let end_jump = self.emit_jump(Opcode::JumpIfFalse);
        self.emit(Opcode::Pop);
        self.parse_precedence(BindingPower::And)?;
        self.patch_jump(end_jump)
    }

    fn parse_or(&mut self, _can_assign: bool) -> ParseResult<()> {
        let else_jump = self.emit_jump(Opcode::JumpIfFalse);
        let end_jump = self.emit_jump(Opcode::Jump);
        self.patch_jump(else_jump)?;
        self.emit(Opcode::Pop);
        self.parse_precedence(BindingPower::Or)?;
        self.patch_jump(end_jump)
    }

    fn parse_identifier(&mut self, can_assign: bool) -> ParseResult<()> {
        let name = self.previous.lexeme;
        let (get_op, set_op, idx) = match self.resolve_local(name)? {
            Some(slot) => (Opcode::GetLocal, Opcode::SetLocal, slot),
            None => {
                let idx = self.identifier_constant(name)?;
                (Opcode::GetGlobal, Opcode::SetGlobal, idx)
            }
        };

        if can_assign && self.match_token(TokenContents::Equal) {
            self.expression()?;
            self.emit_with_operand(set_op, idx);
        } else {
            self.emit_with_operand(get_op, idx);
        }
        Ok(())
    }

    /// Stack slot of the innermost local called `name`, if any.
    fn resolve_local(&self, name: &str) -> ParseResult<Option<u8>> {
        for (idx, local) in self.locals.iter().enumerate().rev() {
            if local.name == name {
                if local.depth.is_none() {
                    return Err(self.error_at_previous(ParseErrorReason::LocalInOwnInitializer));
                }
                // MAX_LOCALS keeps every slot within a byte.
                return Ok(Some(idx as u8));
            }
        }
        Ok(None)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub struct CompileErrors {
    errors: Vec<CompileError>,
}

impl Display for CompileErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} compilation error{}",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" }
        )?;
        for e in self.errors.iter() {
            writeln!(f, "{e}")?;
        }
        Ok(())
    }
}

impl CompileErrors {
    pub fn new() -> Self {
        Self {
            errors: Vec::with_capacity(4),
        }
    }

    fn push(&mut self, e: CompileError) {
        self.errors.push(e)
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Default for CompileErrors {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    ScanError(#[from] ScanError),
    #[error(transparent)]
    ParseError(#[from] ParseError),
}

impl CompileError {
    pub fn line(&self) -> usize {
        match self {
            CompileError::ScanError(e) => e.line(),
            CompileError::ParseError(e) => e.line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    At(String),
    End,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
            Location::End => write!(f, " at end"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[line {line}] Error{location}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub location: Location,
    pub reason: ParseErrorReason,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorReason {
    #[error("{0}")]
    Expected(&'static str),
    #[error("Expect expression.")]
    ExpectExpression,
    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,
    #[error("Cannot read local variable in its own initializer.")]
    LocalInOwnInitializer,
    #[error("Already a variable with this name in this scope.")]
    DuplicateLocal,
    #[error("Too many local variables in function.")]
    TooManyLocals,
    #[error("Too many constants in one chunk.")]
    TooManyConstants,
    #[error("Too much code to jump over.")]
    JumpTooLarge,
    #[error("Loop body too large.")]
    LoopTooLarge,
    #[error("Invalid number literal.")]
    InvalidNumber,
}

impl From<JumpError> for ParseErrorReason {
    fn from(value: JumpError) -> Self {
        match value {
            JumpError::TooFar => ParseErrorReason::JumpTooLarge,
            JumpError::LoopTooLarge => ParseErrorReason::LoopTooLarge,
        }
    }
}
