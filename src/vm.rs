use crate::chunk::{Chunk, Opcode};
use crate::compiler::compile;
use crate::hash_table::HashTable;
use crate::heap::{HeapManager, ObjRef, StringKey};
use crate::scanner::Scanner;
use crate::value::Value;
use crate::InterpretError;
use arrayvec::ArrayVec;
use log::{error, trace};
use num_enum::TryFromPrimitiveError;
use std::io::Write;
use thiserror::Error;

type ExecResult<A> = Result<A, ExecutionError>;

pub const STACK_SIZE: usize = 1024;

/// Executes chunks against one heap and one set of globals. Both outlive a single
/// `interpret` call, so a REPL keeps its variables and interned strings.
#[derive(Debug)]
pub struct VM<'a, W: Write> {
    write: &'a mut W,
    ip: usize,
    stack: ArrayVec<Value, STACK_SIZE>,
    heap_manager: HeapManager,
    globals: HashTable<StringKey, Value>,
}

impl<'a, W: Write> VM<'a, W> {
    pub fn new(write: &'a mut W) -> Self {
        Self {
            write,
            ip: 0,
            stack: ArrayVec::new(),
            heap_manager: HeapManager::new(),
            globals: HashTable::new(),
        }
    }

    pub fn heap(&self) -> &HeapManager {
        &self.heap_manager
    }

    pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
        trace!("Got input string: {source}");
        let scanner = Scanner::new(source);
        let chunk = compile(scanner.iter(), &mut self.heap_manager)?;
        self.run(&chunk)?;
        Ok(())
    }

    /// Runs `chunk` to its `Return`. A runtime error aborts the run and clears the stack.
    pub fn run(&mut self, chunk: &Chunk) -> Result<(), VMError> {
        self.ip = 0;
        loop {
            let instruction_start = self.ip;
            match self.step(chunk) {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(error) => {
                    self.stack.clear();
                    let line = chunk.line_at(instruction_start).unwrap_or(0);
                    return Err(VMError { error, line });
                }
            }
        }
    }

    /// Executes one instruction; `false` once the chunk has returned.
    fn step(&mut self, chunk: &Chunk) -> ExecResult<bool> {
        trace!("Stack: {stack:?}", stack = self.stack);
        trace!(
            "{instruction}",
            instruction = chunk.disassemble_instruction_at(self.ip, &self.heap_manager)
        );
        let opcode =
            Opcode::try_from(self.read_byte(chunk)?).map_err(IncorrectInvariantError::from)?;
        match opcode {
            Opcode::Constant => {
                let constant = *self.read_constant(chunk)?;
                self.push(constant)?;
            }
            Opcode::Nil => self.push(Value::Nil)?,
            Opcode::True => self.push(Value::Boolean(true))?,
            Opcode::False => self.push(Value::Boolean(false))?,
            Opcode::Pop => {
                let _ = self.pop()?;
            }
            Opcode::GetLocal => {
                let slot = self.read_byte(chunk)? as usize;
                let value = *self
                    .stack
                    .get(slot)
                    .ok_or(IncorrectInvariantError::InvalidSlot { slot })?;
                self.push(value)?;
            }
            Opcode::SetLocal => {
                let slot = self.read_byte(chunk)? as usize;
                let value = *self.peek(0)?;
                *self
                    .stack
                    .get_mut(slot)
                    .ok_or(IncorrectInvariantError::InvalidSlot { slot })? = value;
            }
            Opcode::GetGlobal => {
                let key = self.read_name(chunk)?;
                match self.globals.get(&key).copied() {
                    Some(value) => self.push(value)?,
                    None => return Err(self.undefined_variable(key.obj())),
                }
            }
            Opcode::DefineGlobal => {
                let key = self.read_name(chunk)?;
                let value = *self.peek(0)?;
                self.globals.insert(key, value);
                let _ = self.pop()?;
            }
            Opcode::SetGlobal => {
                let key = self.read_name(chunk)?;
                let value = *self.peek(0)?;
                if self.globals.insert(key, value) {
                    // Assignment never creates a variable.
                    self.globals.delete(&key);
                    return Err(self.undefined_variable(key.obj()));
                }
            }
            Opcode::Equal => {
                let b = self.pop()?;
                let a = self.pop()?;
                self.push(Value::Boolean(a == b))?
            }
            Opcode::Greater => self.binary_op(|a, b| a > b, Value::Boolean)?,
            Opcode::Less => self.binary_op(|a, b| a < b, Value::Boolean)?,
            Opcode::Add => match (*self.peek(1)?, *self.peek(0)?) {
                (Value::Number(_), Value::Number(_)) => {
                    self.binary_op(|a, b| a + b, Value::Number)?
                }
                (Value::Obj(a), Value::Obj(b)) => self.concatenate(a, b)?,
                _ => return Err(RuntimeError::InvalidAddOperands.into()),
            },
            Opcode::Subtract => self.binary_op(|a, b| a - b, Value::Number)?,
            Opcode::Multiply => self.binary_op(|a, b| a * b, Value::Number)?,
            Opcode::Divide => self.binary_op(|a, b| a / b, Value::Number)?,
            Opcode::Not => {
                let value = self.pop()?;
                self.push(Value::Boolean(value.is_falsey()))?
            }
            Opcode::Negate => match *self.peek(0)? {
                Value::Number(num) => {
                    let _ = self.pop()?;
                    self.push(Value::Number(-num))?
                }
                _ => return Err(RuntimeError::OperandMustBeNumber.into()),
            },
            Opcode::Print => {
                let value = self.pop()?;
                self.print_value(value);
            }
            Opcode::Jump => {
                let offset = self.read_short(chunk)?;
                self.ip += offset as usize;
            }
            Opcode::JumpIfFalse => {
                let offset = self.read_short(chunk)?;
                if self.peek(0)?.is_falsey() {
                    self.ip += offset as usize;
                }
            }
            Opcode::Loop => {
                let offset = self.read_short(chunk)?;
                self.ip = self.ip.checked_sub(offset as usize).ok_or(
                    IncorrectInvariantError::InvalidInstructionPointer {
                        pointer: self.ip,
                        chunk_length: chunk.len(),
                    },
                )?;
            }
            Opcode::Return => return Ok(false),
        }

        Ok(true)
    }

    fn print_value(&mut self, value: Value) {
        if let Err(e) = writeln!(self.write, "{}", value.display(&self.heap_manager)) {
            error!("Error writing output value: {e}")
        }
    }

    fn read_byte(&mut self, chunk: &Chunk) -> ExecResult<u8> {
        let byte = chunk.get(self.ip).copied().ok_or(
            IncorrectInvariantError::InvalidInstructionPointer {
                pointer: self.ip,
                chunk_length: chunk.len(),
            },
        )?;
        self.ip += 1;
        Ok(byte)
    }

    fn read_short(&mut self, chunk: &Chunk) -> ExecResult<u16> {
        let hi = self.read_byte(chunk)?;
        let lo = self.read_byte(chunk)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    fn read_constant<'c>(&mut self, chunk: &'c Chunk) -> ExecResult<&'c Value> {
        let byte = self.read_byte(chunk)?;
        let constant = chunk
            .get_constant(byte)
            .ok_or(IncorrectInvariantError::InvalidConstant { index: byte })?;
        Ok(constant)
    }

    /// Reads a constant that must be an interned variable name.
    fn read_name(&mut self, chunk: &Chunk) -> ExecResult<StringKey> {
        match *self.read_constant(chunk)? {
            Value::Obj(obj) => self
                .heap_manager
                .string_key(obj)
                .ok_or_else(|| IncorrectInvariantError::InvalidTypes.into()),
            _ => Err(IncorrectInvariantError::InvalidTypes.into()),
        }
    }

    fn undefined_variable(&self, name: ObjRef) -> ExecutionError {
        let name = self
            .heap_manager
            .as_objstring(name)
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        RuntimeError::UndefinedVariable(name).into()
    }

    fn push(&mut self, value: Value) -> ExecResult<()> {
        self.stack
            .try_push(value)
            .map_err(|_| RuntimeError::StackOverflow.into())
    }

    fn pop(&mut self) -> ExecResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| IncorrectInvariantError::StackUnderflow.into())
    }

    fn peek(&self, distance: usize) -> ExecResult<&Value> {
        self.stack
            .len()
            .checked_sub(distance + 1)
            .and_then(|idx| self.stack.get(idx))
            .ok_or_else(|| IncorrectInvariantError::StackUnderflow.into())
    }

    /// Both operands must be numbers; they are only popped once that is known.
    fn binary_op<T>(&mut self, f: impl Fn(f64, f64) -> T, v: fn(T) -> Value) -> ExecResult<()> {
        let (a, b) = match (*self.peek(1)?, *self.peek(0)?) {
            (Value::Number(a), Value::Number(b)) => (a, b),
            _ => return Err(RuntimeError::OperandsMustBeNumbers.into()),
        };
        let _ = self.pop()?;
        let _ = self.pop()?;
        self.push(v(f(a, b)))
    }

    fn concatenate(&mut self, a: ObjRef, b: ObjRef) -> ExecResult<()> {
        let value = self
            .heap_manager
            .create_string_concat(a, b)
            .ok_or(RuntimeError::InvalidAddOperands)?;
        let _ = self.pop()?;
        let _ = self.pop()?;
        self.push(Value::Obj(value))
    }
}

/// A failed run, tagged with the source line of the failing instruction.
#[derive(Error, Debug, Clone)]
#[error("{error}\n[line {line}] in script")]
pub struct VMError {
    pub error: ExecutionError,
    pub line: usize,
}

#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error(transparent)]
    RuntimeError(#[from] RuntimeError),
    #[error("Corrupt bytecode: {0}")]
    IncorrectInvariantError(#[from] IncorrectInvariantError),
}

#[derive(Error, Debug, Clone)]
pub enum IncorrectInvariantError {
    #[error("invalid opcode? {0}")]
    InvalidOpcode(#[from] TryFromPrimitiveError<Opcode>),
    #[error("invalid constant? {index}")]
    InvalidConstant { index: u8 },
    #[error("invalid local slot? {slot}")]
    InvalidSlot { slot: usize },
    #[error("invalid instruction pointer {pointer}, max length {chunk_length}")]
    InvalidInstructionPointer { pointer: usize, chunk_length: usize },
    #[error("stack underflow?")]
    StackUnderflow,
    #[error("invalid compile time types")]
    InvalidTypes,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Stack overflow.")]
    StackOverflow,
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    InvalidAddOperands,
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
}
