//! Instruction decoding from binary format.

use super::coding::{
    get_codings_by_opcode, get_codings_by_subopcode, OperandLayout, OPCODE_PREFIX_FC,
};
use super::{Immediate, Instruction};
use crate::cursor::Reader;
use crate::error::DecodeError;
use crate::leb128;

/// Reads one instruction: an opcode byte, dispatched through the coding
/// table to its immediate list.
///
/// Unknown primary opcodes and unknown `0xFC` subopcodes fail with
/// [`DecodeError::UnknownOpcode`] / [`DecodeError::UnknownSubopcode`].
pub fn read_instruction(reader: &mut Reader) -> Result<Instruction, DecodeError> {
    let opcode = reader.read_u8()?;
    let mut operands = Vec::new();

    let layout = if opcode == OPCODE_PREFIX_FC {
        let subopcode = leb128::read_vu32(reader)?;
        let coding = get_codings_by_subopcode()
            .get(&subopcode)
            .ok_or(DecodeError::UnknownSubopcode(opcode, subopcode))?;
        operands.push(Immediate::U32(subopcode));
        coding.layout
    } else {
        get_codings_by_opcode()
            .get(&opcode)
            .ok_or(DecodeError::UnknownOpcode(opcode))?
            .layout
    };

    read_operands(layout, reader, &mut operands)?;
    Ok(Instruction::new(opcode, operands))
}

fn read_operands(
    layout: OperandLayout,
    reader: &mut Reader,
    operands: &mut Vec<Immediate>,
) -> Result<(), DecodeError> {
    match layout {
        OperandLayout::None => {}
        OperandLayout::BlockType | OperandLayout::HeapType => {
            operands.push(Immediate::I33(leb128::read_vs33(reader)?));
        }
        OperandLayout::Index => {
            operands.push(Immediate::U32(leb128::read_vu32(reader)?));
        }
        OperandLayout::IndexPair | OperandLayout::MemArg => {
            operands.push(Immediate::U32(leb128::read_vu32(reader)?));
            operands.push(Immediate::U32(leb128::read_vu32(reader)?));
        }
        OperandLayout::BrTable => {
            let count = leb128::read_vu32(reader)?;
            operands.push(Immediate::U32(count));
            for _ in 0..count {
                operands.push(Immediate::U32(leb128::read_vu32(reader)?));
            }
            // fallback label
            operands.push(Immediate::U32(leb128::read_vu32(reader)?));
        }
        OperandLayout::SelectTypes => {
            let count = leb128::read_vu32(reader)?;
            operands.push(Immediate::U32(count));
            for _ in 0..count {
                operands.push(Immediate::U32(leb128::read_vu32(reader)?));
            }
        }
        OperandLayout::TryTable => {
            operands.push(Immediate::I33(leb128::read_vs33(reader)?));
            let count = leb128::read_vu32(reader)?;
            operands.push(Immediate::U32(count));
            for _ in 0..count {
                let kind = reader.read_u8()?;
                operands.push(Immediate::U8(kind));
                // catch / catch_ref carry a tag index, catch_all forms do not
                if kind < 2 {
                    operands.push(Immediate::U32(leb128::read_vu32(reader)?));
                }
                operands.push(Immediate::U32(leb128::read_vu32(reader)?));
            }
        }
        OperandLayout::ConstI32 => {
            operands.push(Immediate::I32(leb128::read_vs32(reader)?));
        }
        OperandLayout::ConstI64 => {
            operands.push(Immediate::I64(leb128::read_vs64(reader)?));
        }
        OperandLayout::ConstF32 => {
            operands.push(Immediate::F32(reader.read_f32()?));
        }
        OperandLayout::ConstF64 => {
            operands.push(Immediate::F64(reader.read_f64()?));
        }
    }
    Ok(())
}

/// Reads a constant expression: repeated single-instruction decode up to
/// and including the first `end` (0x0B).
///
/// Used for global initialisers, element offsets and initialisers, and data
/// offsets. The returned list always ends with the `end` instruction.
/// Nesting is not tracked; structured control flow is not this codec's
/// concern.
pub fn read_const_expr(reader: &mut Reader) -> Result<Vec<Instruction>, DecodeError> {
    let mut instructions = Vec::new();
    loop {
        let instruction = read_instruction(reader)?;
        let done = instruction.is_end();
        instructions.push(instruction);
        if done {
            return Ok(instructions);
        }
    }
}
