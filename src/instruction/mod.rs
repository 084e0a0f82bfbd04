//! WebAssembly instruction representation and codec.
//!
//! An [`Instruction`] is the flat pair of an opcode byte and its decoded
//! immediates. Each [`Immediate`] carries its own wire type, so encoding and
//! sizing never consult the coding table; only decoding dispatches through
//! it to learn an opcode's immediate shape.

pub mod coding;
pub mod decode;

pub use coding::{get_codings, InstructionCoding, OperandLayout, OPCODE_PREFIX_FC};
pub use decode::{read_const_expr, read_instruction};

use std::fmt;

use fhex::ToHex;

use crate::cursor;
use crate::leb128;

/// The `end` opcode terminating blocks and constant expressions.
pub const OP_END: u8 = 0x0b;

/// A single decoded immediate.
///
/// The variant is the wire type: unsigned and signed LEB128 of the three
/// widths, plus raw bytes and little-endian floats.
#[derive(Debug, Clone, PartialEq)]
pub enum Immediate {
    U8(u8),
    U32(u32),
    I32(i32),
    I33(i64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Immediate {
    /// Appends this immediate's encoding to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        match *self {
            Immediate::U8(v) => buf.push(v),
            Immediate::U32(v) => leb128::write_vu32(buf, v),
            Immediate::I32(v) => leb128::write_vs32(buf, v),
            Immediate::I33(v) => leb128::write_vs33(buf, v),
            Immediate::I64(v) => leb128::write_vs64(buf, v),
            Immediate::F32(v) => cursor::write_f32(buf, v),
            Immediate::F64(v) => cursor::write_f64(buf, v),
        }
    }

    /// Byte length [`Immediate::write`] will produce.
    pub fn size(&self) -> usize {
        match *self {
            Immediate::U8(_) => 1,
            Immediate::U32(v) => leb128::size_vu32(v),
            Immediate::I32(v) => leb128::size_vs32(v),
            Immediate::I33(v) => leb128::size_vs33(v),
            Immediate::I64(v) => leb128::size_vs64(v),
            Immediate::F32(_) => 4,
            Immediate::F64(_) => 8,
        }
    }
}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Immediate::U8(v) => write!(f, "{v}"),
            Immediate::U32(v) => write!(f, "{v}"),
            Immediate::I32(v) => write!(f, "{v}"),
            Immediate::I33(v) => write!(f, "{v}"),
            Immediate::I64(v) => write!(f, "{v}"),
            Immediate::F32(v) => write!(f, "{}", v.to_hex()),
            Immediate::F64(v) => write!(f, "{}", v.to_hex()),
        }
    }
}

/// One decoded instruction: the opcode byte and its immediates in wire
/// order.
///
/// For `0xFC`-prefixed instructions the first operand is the `U32`
/// subopcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: u8,
    pub operands: Vec<Immediate>,
}

impl Instruction {
    pub fn new(opcode: u8, operands: Vec<Immediate>) -> Instruction {
        Instruction { opcode, operands }
    }

    /// An `end` (0x0B) instruction, the constant-expression terminator.
    pub fn end() -> Instruction {
        Instruction::new(OP_END, Vec::new())
    }

    pub fn is_end(&self) -> bool {
        self.opcode == OP_END
    }

    /// The mnemonic from the coding table, or `"<unknown>"` for an opcode
    /// the table does not list (only possible on hand-constructed values;
    /// the decoder rejects such opcodes).
    pub fn name(&self) -> &'static str {
        if self.opcode == OPCODE_PREFIX_FC {
            if let Some(&Immediate::U32(subopcode)) = self.operands.first() {
                if let Some(coding) = coding::get_codings_by_subopcode().get(&subopcode) {
                    return coding.name;
                }
            }
            return "<unknown>";
        }
        match coding::get_codings_by_opcode().get(&self.opcode) {
            Some(coding) => coding.name,
            None => "<unknown>",
        }
    }

    /// Appends the opcode byte and each immediate in declared order.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.opcode);
        for operand in &self.operands {
            operand.write(buf);
        }
    }

    /// Byte length [`Instruction::write`] will produce.
    pub fn size(&self) -> usize {
        1 + self.operands.iter().map(Immediate::size).sum::<usize>()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        // the subopcode is already covered by the mnemonic
        let skip = usize::from(self.opcode == OPCODE_PREFIX_FC);
        for operand in self.operands.iter().skip(skip) {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

/// Appends every instruction of an expression to `buf`.
///
/// The terminating `end` is part of the list, never implicit.
pub fn write_expr(buf: &mut Vec<u8>, instructions: &[Instruction]) {
    for instruction in instructions {
        instruction.write(buf);
    }
}

/// Byte length [`write_expr`] will produce.
pub fn size_expr(instructions: &[Instruction]) -> usize {
    instructions.iter().map(Instruction::size).sum()
}
