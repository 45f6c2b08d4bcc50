use crate::heap::HeapManager;
use crate::value::Value;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use thiserror::Error;

/// Largest constant pool addressable by a one-byte operand.
pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Constant,
    Nil,
    True,
    False,
    Pop,
    GetLocal,
    SetLocal,
    GetGlobal,
    DefineGlobal,
    SetGlobal,
    Equal,
    Greater,
    Less,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Negate,
    Print,
    Jump,
    JumpIfFalse,
    Loop,
    Return,
}

impl Opcode {
    pub fn as_byte(self) -> u8 {
        self.into()
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            Opcode::Constant
            | Opcode::GetLocal
            | Opcode::SetLocal
            | Opcode::GetGlobal
            | Opcode::DefineGlobal
            | Opcode::SetGlobal => 1,
            Opcode::Jump | Opcode::JumpIfFalse | Opcode::Loop => 2,
            _ => 0,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpError {
    #[error("Too much code to jump over.")]
    TooFar,
    #[error("Loop body too large.")]
    LoopTooLarge,
}

/// Bytecode plus a parallel line table and the constant pool.
#[derive(Debug)]
pub struct Chunk {
    code: Vec<u8>,
    lines: Vec<usize>,
    constants: Vec<Value>,
    name: String,
}

impl Chunk {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            constants: Vec::new(),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_byte(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn add_opcode(&mut self, opcode: Opcode, line: usize) {
        self.add_byte(opcode.as_byte(), line)
    }

    pub fn add_opcode_and_operand(&mut self, opcode: Opcode, operand: u8, line: usize) {
        self.add_byte(opcode.as_byte(), line);
        self.add_byte(operand, line);
    }

    /// Appends to the constant pool, or `None` once the pool is full.
    pub fn add_constant(&mut self, value: Value) -> Option<u8> {
        let index = u8::try_from(self.constants.len()).ok()?;
        self.constants.push(value);
        Some(index)
    }

    pub fn get_constant(&self, index: u8) -> Option<&Value> {
        self.constants.get(index as usize)
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    /// Emits `opcode` with a placeholder offset and returns the position of that placeholder.
    pub fn add_dummy_jump(&mut self, opcode: Opcode, line: usize) -> usize {
        self.add_opcode(opcode, line);
        self.add_byte(0xff, line);
        self.add_byte(0xff, line);
        self.code.len() - 2
    }

    /// Overwrites the placeholder at `offset` with the distance to the current end of code.
    pub fn patch_jump(&mut self, offset: usize) -> Result<(), JumpError> {
        let jump = self.code.len() - offset - 2;
        let [hi, lo] = u16::try_from(jump)
            .map_err(|_| JumpError::TooFar)?
            .to_be_bytes();
        self.code[offset] = hi;
        self.code[offset + 1] = lo;
        Ok(())
    }

    pub fn get_loop_start(&self) -> usize {
        self.code.len()
    }

    pub fn emit_loop(&mut self, loop_start: usize, line: usize) -> Result<(), JumpError> {
        self.add_opcode(Opcode::Loop, line);
        // The operand itself is skipped too once read.
        let offset = self.code.len() - loop_start + 2;
        let [hi, lo] = u16::try_from(offset)
            .map_err(|_| JumpError::LoopTooLarge)?
            .to_be_bytes();
        self.add_byte(hi, line);
        self.add_byte(lo, line);
        Ok(())
    }

    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        let hi = *self.code.get(offset)?;
        let lo = *self.code.get(offset + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    pub fn disassemble<'c>(&'c self, heap: &'c HeapManager) -> Disassembly<'c> {
        Disassembly { chunk: self, heap }
    }

    pub fn disassemble_instruction_at<'c>(
        &'c self,
        offset: usize,
        heap: &'c HeapManager,
    ) -> Instruction<'c> {
        Instruction {
            chunk: self,
            heap,
            offset,
        }
    }

    /// Writes the instruction at `offset`, returning the offset of the next one.
    fn write_instruction(
        &self,
        f: &mut Formatter<'_>,
        offset: usize,
        heap: &HeapManager,
    ) -> Result<usize, fmt::Error> {
        write!(f, "{offset:04} ")?;
        match self.line_at(offset) {
            Some(line) if offset > 0 && self.line_at(offset - 1) == Some(line) => {
                write!(f, "   | ")?
            }
            Some(line) => write!(f, "{line:4} ")?,
            None => return Ok(offset + 1),
        }

        let byte = self.code[offset];
        let opcode = match Opcode::try_from(byte) {
            Ok(opcode) => opcode,
            Err(_) => {
                write!(f, "Unknown opcode 0x{byte:02x}")?;
                return Ok(offset + 1);
            }
        };
        let name = format!("{opcode:?}");
        match opcode {
            Opcode::Constant | Opcode::GetGlobal | Opcode::DefineGlobal | Opcode::SetGlobal => {
                match self.code.get(offset + 1) {
                    Some(&idx) => match self.get_constant(idx) {
                        Some(value) => {
                            write!(f, "{name:<16} {idx:4} '{}'", value.display(heap))?
                        }
                        None => write!(f, "{name:<16} {idx:4} (unknown constant)")?,
                    },
                    None => write!(f, "{name:<16} (missing operand)")?,
                }
            }
            Opcode::GetLocal | Opcode::SetLocal => match self.code.get(offset + 1) {
                Some(slot) => write!(f, "{name:<16} {slot:4}")?,
                None => write!(f, "{name:<16} (missing operand)")?,
            },
            Opcode::Jump | Opcode::JumpIfFalse | Opcode::Loop => {
                match self.read_u16(offset + 1) {
                    Some(jump) => {
                        let next = offset + 3;
                        let target = if opcode == Opcode::Loop {
                            next.wrapping_sub(jump as usize)
                        } else {
                            next + jump as usize
                        };
                        write!(f, "{name:<16} {offset:4} -> {target}")?
                    }
                    None => write!(f, "{name:<16} (missing operand)")?,
                }
            }
            _ => write!(f, "{name}")?,
        }
        Ok(offset + 1 + opcode.operand_len())
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.code
    }
}

pub struct Disassembly<'c> {
    chunk: &'c Chunk,
    heap: &'c HeapManager,
}

impl Display for Disassembly<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.chunk.name)?;
        let mut offset = 0;
        while offset < self.chunk.len() {
            offset = self.chunk.write_instruction(f, offset, self.heap)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct Instruction<'c> {
    chunk: &'c Chunk,
    heap: &'c HeapManager,
    offset: usize,
}

impl Display for Instruction<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.offset >= self.chunk.len() {
            return write!(f, "{:04} (end of chunk)", self.offset);
        }
        self.chunk
            .write_instruction(f, self.offset, self.heap)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_track_every_byte() {
        let mut chunk = Chunk::new("test");
        let idx = chunk.add_constant(Value::Number(1.2)).unwrap();
        chunk.add_opcode_and_operand(Opcode::Constant, idx, 1);
        chunk.add_opcode(Opcode::Return, 2);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.line_at(0), Some(1));
        assert_eq!(chunk.line_at(1), Some(1));
        assert_eq!(chunk.line_at(2), Some(2));
        assert_eq!(chunk.line_at(3), None);
    }

    #[test]
    fn constant_pool_is_bounded() {
        let mut chunk = Chunk::new("test");
        for i in 0..MAX_CONSTANTS {
            assert_eq!(chunk.add_constant(Value::Number(i as f64)), Some(i as u8));
        }
        assert_eq!(chunk.add_constant(Value::Nil), None);
        assert_eq!(chunk.constants().len(), MAX_CONSTANTS);
    }

    #[test]
    fn patch_jump_writes_big_endian_distance() {
        let mut chunk = Chunk::new("test");
        let jump = chunk.add_dummy_jump(Opcode::Jump, 1);
        for _ in 0..300 {
            chunk.add_opcode(Opcode::Nil, 1);
        }
        chunk.patch_jump(jump).unwrap();
        assert_eq!(chunk[jump], 0x01);
        assert_eq!(chunk[jump + 1], 0x2c);
        assert_eq!(chunk.read_u16(jump), Some(300));
    }

    #[test]
    fn patch_jump_rejects_oversized_bodies() {
        let mut chunk = Chunk::new("test");
        let jump = chunk.add_dummy_jump(Opcode::JumpIfFalse, 1);
        for _ in 0..=u16::MAX as usize {
            chunk.add_opcode(Opcode::Nil, 1);
        }
        assert_eq!(chunk.patch_jump(jump), Err(JumpError::TooFar));
    }

    #[test]
    fn loop_jumps_back_to_start() {
        let mut chunk = Chunk::new("test");
        chunk.add_opcode(Opcode::Nil, 1);
        let start = chunk.get_loop_start();
        chunk.add_opcode(Opcode::Pop, 1);
        chunk.emit_loop(start, 1).unwrap();
        let operand = chunk.len() - 2;
        let distance = chunk.read_u16(operand).unwrap() as usize;
        assert_eq!(chunk.len() - distance, start);
    }

    #[test]
    fn disassembly_marks_repeated_lines() {
        let heap = HeapManager::new();
        let mut chunk = Chunk::new("main");
        let idx = chunk.add_constant(Value::Number(1.5)).unwrap();
        chunk.add_opcode_and_operand(Opcode::Constant, idx, 7);
        chunk.add_opcode(Opcode::Negate, 7);
        chunk.add_opcode(Opcode::Return, 8);
        let text = chunk.disassemble(&heap).to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "== main ==");
        assert_eq!(lines[1], "0000    7 Constant            0 '1.5'");
        assert_eq!(lines[2], "0002    | Negate");
        assert_eq!(lines[3], "0003    8 Return");
    }
}
