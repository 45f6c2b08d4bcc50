use crate::compiler::CompileErrors;
use crate::vm::{VMError, VM};
use std::io::Write;
use thiserror::Error;

pub mod chunk;
pub mod compiler;
pub mod hash_table;
pub mod heap;
pub mod scanner;
pub mod value;
pub mod vm;

/// Compiles and runs `source` on a fresh VM, printing to `write`.
pub fn interpret<W: Write>(source: &str, write: &mut W) -> Result<(), InterpretError> {
    let mut vm = VM::new(write);
    vm.interpret(source)
}

#[derive(Error, Debug, Clone)]
pub enum InterpretError {
    #[error(transparent)]
    CompileErrors(#[from] CompileErrors),
    #[error(transparent)]
    RuntimeError(#[from] VMError),
}
