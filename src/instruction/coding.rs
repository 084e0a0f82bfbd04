//! Static instruction coding table.
//!
//! One record per instruction the codec understands: opcode, mnemonic, and
//! the shape of its immediate list. Decoding dispatches through the
//! by-opcode index; an opcode with no record is a decode failure. Encoding
//! does not consult the table at all, because decoded operands carry their
//! own wire types.

use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Prefix byte for the saturating-truncation / bulk-memory / table group.
pub const OPCODE_PREFIX_FC: u8 = 0xfc;

/// Shape of an instruction's immediate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandLayout {
    /// No immediates.
    None,
    /// One vs33 block type.
    BlockType,
    /// One vu32 index (label, function, type, local, global, table, memory,
    /// tag, data or element index).
    Index,
    /// Two vu32 indices.
    IndexPair,
    /// vu32 align, vu32 offset.
    MemArg,
    /// vu32 label count, that many vu32 labels, then the vu32 fallback.
    BrTable,
    /// vu32 type count, then that many vu32 value types.
    SelectTypes,
    /// vs33 block type, vu32 clause count, then per clause a u8 kind, a
    /// vu32 tag index when the kind is below 2, and a vu32 label index.
    TryTable,
    /// One vs33 heap/reference type.
    HeapType,
    /// One vs32 literal.
    ConstI32,
    /// One vs64 literal.
    ConstI64,
    /// One little-endian f32 literal.
    ConstF32,
    /// One little-endian f64 literal.
    ConstF64,
}

/// A single entry in the coding table.
#[derive(Debug, Clone, Copy)]
pub struct InstructionCoding {
    pub opcode: u8,
    /// Meaningful only when `opcode` is [`OPCODE_PREFIX_FC`].
    pub subopcode: u32,
    pub name: &'static str,
    pub layout: OperandLayout,
}

impl InstructionCoding {
    const fn new(opcode: u8, name: &'static str, layout: OperandLayout) -> Self {
        InstructionCoding { opcode, subopcode: 0, name, layout }
    }

    const fn new_sub(subopcode: u32, name: &'static str, layout: OperandLayout) -> Self {
        InstructionCoding { opcode: OPCODE_PREFIX_FC, subopcode, name, layout }
    }
}

/// The full coding table, in opcode order.
pub fn get_codings() -> &'static Vec<InstructionCoding> {
    static CODINGS: OnceCell<Vec<InstructionCoding>> = OnceCell::new();
    CODINGS.get_or_init(|| {
        use OperandLayout::*;
        vec![
            // Control instructions --------------------------------------------
            InstructionCoding::new(0x00, "unreachable", None),
            InstructionCoding::new(0x01, "nop", None),
            InstructionCoding::new(0x02, "block", BlockType),
            InstructionCoding::new(0x03, "loop", BlockType),
            InstructionCoding::new(0x04, "if", BlockType),
            InstructionCoding::new(0x05, "else", None),
            InstructionCoding::new(0x08, "throw", Index),
            InstructionCoding::new(0x0a, "throw_ref", None),
            InstructionCoding::new(0x0b, "end", None),
            InstructionCoding::new(0x0c, "br", Index),
            InstructionCoding::new(0x0d, "br_if", Index),
            InstructionCoding::new(0x0e, "br_table", BrTable),
            InstructionCoding::new(0x0f, "return", None),
            InstructionCoding::new(0x10, "call", Index),
            InstructionCoding::new(0x11, "call_indirect", IndexPair),
            InstructionCoding::new(0x12, "return_call", Index),
            InstructionCoding::new(0x13, "return_call_indirect", IndexPair),
            InstructionCoding::new(0x14, "call_ref", Index),
            InstructionCoding::new(0x15, "return_call_ref", Index),
            InstructionCoding::new(0x1a, "drop", None),
            InstructionCoding::new(0x1b, "select", None),
            InstructionCoding::new(0x1c, "select", SelectTypes),
            InstructionCoding::new(0x1f, "try_table", TryTable),
            // Variable instructions -------------------------------------------
            InstructionCoding::new(0x20, "local.get", Index),
            InstructionCoding::new(0x21, "local.set", Index),
            InstructionCoding::new(0x22, "local.tee", Index),
            InstructionCoding::new(0x23, "global.get", Index),
            InstructionCoding::new(0x24, "global.set", Index),
            // Table instructions ----------------------------------------------
            InstructionCoding::new(0x25, "table.get", Index),
            InstructionCoding::new(0x26, "table.set", Index),
            // Memory instructions ---------------------------------------------
            InstructionCoding::new(0x28, "i32.load", MemArg),
            InstructionCoding::new(0x29, "i64.load", MemArg),
            InstructionCoding::new(0x2a, "f32.load", MemArg),
            InstructionCoding::new(0x2b, "f64.load", MemArg),
            InstructionCoding::new(0x2c, "i32.load8_s", MemArg),
            InstructionCoding::new(0x2d, "i32.load8_u", MemArg),
            InstructionCoding::new(0x2e, "i32.load16_s", MemArg),
            InstructionCoding::new(0x2f, "i32.load16_u", MemArg),
            InstructionCoding::new(0x30, "i64.load8_s", MemArg),
            InstructionCoding::new(0x31, "i64.load8_u", MemArg),
            InstructionCoding::new(0x32, "i64.load16_s", MemArg),
            InstructionCoding::new(0x33, "i64.load16_u", MemArg),
            InstructionCoding::new(0x34, "i64.load32_s", MemArg),
            InstructionCoding::new(0x35, "i64.load32_u", MemArg),
            InstructionCoding::new(0x36, "i32.store", MemArg),
            InstructionCoding::new(0x37, "i64.store", MemArg),
            InstructionCoding::new(0x38, "f32.store", MemArg),
            InstructionCoding::new(0x39, "f64.store", MemArg),
            InstructionCoding::new(0x3a, "i32.store8", MemArg),
            InstructionCoding::new(0x3b, "i32.store16", MemArg),
            InstructionCoding::new(0x3c, "i64.store8", MemArg),
            InstructionCoding::new(0x3d, "i64.store16", MemArg),
            InstructionCoding::new(0x3e, "i64.store32", MemArg),
            InstructionCoding::new(0x3f, "memory.size", Index),
            InstructionCoding::new(0x40, "memory.grow", Index),
            // Numeric constants -----------------------------------------------
            InstructionCoding::new(0x41, "i32.const", ConstI32),
            InstructionCoding::new(0x42, "i64.const", ConstI64),
            InstructionCoding::new(0x43, "f32.const", ConstF32),
            InstructionCoding::new(0x44, "f64.const", ConstF64),
            // Comparison operators --------------------------------------------
            InstructionCoding::new(0x45, "i32.eqz", None),
            InstructionCoding::new(0x46, "i32.eq", None),
            InstructionCoding::new(0x47, "i32.ne", None),
            InstructionCoding::new(0x48, "i32.lt_s", None),
            InstructionCoding::new(0x49, "i32.lt_u", None),
            InstructionCoding::new(0x4a, "i32.gt_s", None),
            InstructionCoding::new(0x4b, "i32.gt_u", None),
            InstructionCoding::new(0x4c, "i32.le_s", None),
            InstructionCoding::new(0x4d, "i32.le_u", None),
            InstructionCoding::new(0x4e, "i32.ge_s", None),
            InstructionCoding::new(0x4f, "i32.ge_u", None),
            InstructionCoding::new(0x50, "i64.eqz", None),
            InstructionCoding::new(0x51, "i64.eq", None),
            InstructionCoding::new(0x52, "i64.ne", None),
            InstructionCoding::new(0x53, "i64.lt_s", None),
            InstructionCoding::new(0x54, "i64.lt_u", None),
            InstructionCoding::new(0x55, "i64.gt_s", None),
            InstructionCoding::new(0x56, "i64.gt_u", None),
            InstructionCoding::new(0x57, "i64.le_s", None),
            InstructionCoding::new(0x58, "i64.le_u", None),
            InstructionCoding::new(0x59, "i64.ge_s", None),
            InstructionCoding::new(0x5a, "i64.ge_u", None),
            InstructionCoding::new(0x5b, "f32.eq", None),
            InstructionCoding::new(0x5c, "f32.ne", None),
            InstructionCoding::new(0x5d, "f32.lt", None),
            InstructionCoding::new(0x5e, "f32.gt", None),
            InstructionCoding::new(0x5f, "f32.le", None),
            InstructionCoding::new(0x60, "f32.ge", None),
            InstructionCoding::new(0x61, "f64.eq", None),
            InstructionCoding::new(0x62, "f64.ne", None),
            InstructionCoding::new(0x63, "f64.lt", None),
            InstructionCoding::new(0x64, "f64.gt", None),
            InstructionCoding::new(0x65, "f64.le", None),
            InstructionCoding::new(0x66, "f64.ge", None),
            // Numeric operators -----------------------------------------------
            InstructionCoding::new(0x67, "i32.clz", None),
            InstructionCoding::new(0x68, "i32.ctz", None),
            InstructionCoding::new(0x69, "i32.popcnt", None),
            InstructionCoding::new(0x6a, "i32.add", None),
            InstructionCoding::new(0x6b, "i32.sub", None),
            InstructionCoding::new(0x6c, "i32.mul", None),
            InstructionCoding::new(0x6d, "i32.div_s", None),
            InstructionCoding::new(0x6e, "i32.div_u", None),
            InstructionCoding::new(0x6f, "i32.rem_s", None),
            InstructionCoding::new(0x70, "i32.rem_u", None),
            InstructionCoding::new(0x71, "i32.and", None),
            InstructionCoding::new(0x72, "i32.or", None),
            InstructionCoding::new(0x73, "i32.xor", None),
            InstructionCoding::new(0x74, "i32.shl", None),
            InstructionCoding::new(0x75, "i32.shr_s", None),
            InstructionCoding::new(0x76, "i32.shr_u", None),
            InstructionCoding::new(0x77, "i32.rotl", None),
            InstructionCoding::new(0x78, "i32.rotr", None),
            InstructionCoding::new(0x79, "i64.clz", None),
            InstructionCoding::new(0x7a, "i64.ctz", None),
            InstructionCoding::new(0x7b, "i64.popcnt", None),
            InstructionCoding::new(0x7c, "i64.add", None),
            InstructionCoding::new(0x7d, "i64.sub", None),
            InstructionCoding::new(0x7e, "i64.mul", None),
            InstructionCoding::new(0x7f, "i64.div_s", None),
            InstructionCoding::new(0x80, "i64.div_u", None),
            InstructionCoding::new(0x81, "i64.rem_s", None),
            InstructionCoding::new(0x82, "i64.rem_u", None),
            InstructionCoding::new(0x83, "i64.and", None),
            InstructionCoding::new(0x84, "i64.or", None),
            InstructionCoding::new(0x85, "i64.xor", None),
            InstructionCoding::new(0x86, "i64.shl", None),
            InstructionCoding::new(0x87, "i64.shr_s", None),
            InstructionCoding::new(0x88, "i64.shr_u", None),
            InstructionCoding::new(0x89, "i64.rotl", None),
            InstructionCoding::new(0x8a, "i64.rotr", None),
            InstructionCoding::new(0x8b, "f32.abs", None),
            InstructionCoding::new(0x8c, "f32.neg", None),
            InstructionCoding::new(0x8d, "f32.ceil", None),
            InstructionCoding::new(0x8e, "f32.floor", None),
            InstructionCoding::new(0x8f, "f32.trunc", None),
            InstructionCoding::new(0x90, "f32.nearest", None),
            InstructionCoding::new(0x91, "f32.sqrt", None),
            InstructionCoding::new(0x92, "f32.add", None),
            InstructionCoding::new(0x93, "f32.sub", None),
            InstructionCoding::new(0x94, "f32.mul", None),
            InstructionCoding::new(0x95, "f32.div", None),
            InstructionCoding::new(0x96, "f32.min", None),
            InstructionCoding::new(0x97, "f32.max", None),
            InstructionCoding::new(0x98, "f32.copysign", None),
            InstructionCoding::new(0x99, "f64.abs", None),
            InstructionCoding::new(0x9a, "f64.neg", None),
            InstructionCoding::new(0x9b, "f64.ceil", None),
            InstructionCoding::new(0x9c, "f64.floor", None),
            InstructionCoding::new(0x9d, "f64.trunc", None),
            InstructionCoding::new(0x9e, "f64.nearest", None),
            InstructionCoding::new(0x9f, "f64.sqrt", None),
            InstructionCoding::new(0xa0, "f64.add", None),
            InstructionCoding::new(0xa1, "f64.sub", None),
            InstructionCoding::new(0xa2, "f64.mul", None),
            InstructionCoding::new(0xa3, "f64.div", None),
            InstructionCoding::new(0xa4, "f64.min", None),
            InstructionCoding::new(0xa5, "f64.max", None),
            InstructionCoding::new(0xa6, "f64.copysign", None),
            // Conversions -----------------------------------------------------
            InstructionCoding::new(0xa7, "i32.wrap_i64", None),
            InstructionCoding::new(0xa8, "i32.trunc_f32_s", None),
            InstructionCoding::new(0xa9, "i32.trunc_f32_u", None),
            InstructionCoding::new(0xaa, "i32.trunc_f64_s", None),
            InstructionCoding::new(0xab, "i32.trunc_f64_u", None),
            InstructionCoding::new(0xac, "i64.extend_i32_s", None),
            InstructionCoding::new(0xad, "i64.extend_i32_u", None),
            InstructionCoding::new(0xae, "i64.trunc_f32_s", None),
            InstructionCoding::new(0xaf, "i64.trunc_f32_u", None),
            InstructionCoding::new(0xb0, "i64.trunc_f64_s", None),
            InstructionCoding::new(0xb1, "i64.trunc_f64_u", None),
            InstructionCoding::new(0xb2, "f32.convert_i32_s", None),
            InstructionCoding::new(0xb3, "f32.convert_i32_u", None),
            InstructionCoding::new(0xb4, "f32.convert_i64_s", None),
            InstructionCoding::new(0xb5, "f32.convert_i64_u", None),
            InstructionCoding::new(0xb6, "f32.demote_f64", None),
            InstructionCoding::new(0xb7, "f64.convert_i32_s", None),
            InstructionCoding::new(0xb8, "f64.convert_i32_u", None),
            InstructionCoding::new(0xb9, "f64.convert_i64_s", None),
            InstructionCoding::new(0xba, "f64.convert_i64_u", None),
            InstructionCoding::new(0xbb, "f64.promote_f32", None),
            InstructionCoding::new(0xbc, "i32.reinterpret_f32", None),
            InstructionCoding::new(0xbd, "i64.reinterpret_f64", None),
            InstructionCoding::new(0xbe, "f32.reinterpret_i32", None),
            InstructionCoding::new(0xbf, "f64.reinterpret_i64", None),
            // Sign extension --------------------------------------------------
            InstructionCoding::new(0xc0, "i32.extend8_s", None),
            InstructionCoding::new(0xc1, "i32.extend16_s", None),
            InstructionCoding::new(0xc2, "i64.extend8_s", None),
            InstructionCoding::new(0xc3, "i64.extend16_s", None),
            InstructionCoding::new(0xc4, "i64.extend32_s", None),
            // Reference instructions ------------------------------------------
            InstructionCoding::new(0xd0, "ref.null", HeapType),
            InstructionCoding::new(0xd1, "ref.is_null", None),
            InstructionCoding::new(0xd2, "ref.func", Index),
            InstructionCoding::new(0xd3, "ref.eq", None),
            InstructionCoding::new(0xd4, "ref.as_non_null", None),
            InstructionCoding::new(0xd5, "br_on_null", Index),
            InstructionCoding::new(0xd6, "br_on_non_null", Index),
            // 0xFC-prefixed instructions --------------------------------------
            InstructionCoding::new_sub(0x00, "i32.trunc_sat_f32_s", None),
            InstructionCoding::new_sub(0x01, "i32.trunc_sat_f32_u", None),
            InstructionCoding::new_sub(0x02, "i32.trunc_sat_f64_s", None),
            InstructionCoding::new_sub(0x03, "i32.trunc_sat_f64_u", None),
            InstructionCoding::new_sub(0x04, "i64.trunc_sat_f32_s", None),
            InstructionCoding::new_sub(0x05, "i64.trunc_sat_f32_u", None),
            InstructionCoding::new_sub(0x06, "i64.trunc_sat_f64_s", None),
            InstructionCoding::new_sub(0x07, "i64.trunc_sat_f64_u", None),
            InstructionCoding::new_sub(0x08, "memory.init", IndexPair),
            InstructionCoding::new_sub(0x09, "data.drop", Index),
            InstructionCoding::new_sub(0x0a, "memory.copy", IndexPair),
            InstructionCoding::new_sub(0x0b, "memory.fill", Index),
            InstructionCoding::new_sub(0x0c, "table.init", IndexPair),
            InstructionCoding::new_sub(0x0d, "elem.drop", Index),
            InstructionCoding::new_sub(0x0e, "table.copy", IndexPair),
            InstructionCoding::new_sub(0x0f, "table.grow", Index),
            InstructionCoding::new_sub(0x10, "table.size", Index),
            InstructionCoding::new_sub(0x11, "table.fill", Index),
        ]
    })
}

/// By-opcode index over the non-prefixed entries.
pub fn get_codings_by_opcode() -> &'static HashMap<u8, &'static InstructionCoding> {
    static BY_OPCODE: OnceCell<HashMap<u8, &'static InstructionCoding>> = OnceCell::new();
    BY_OPCODE.get_or_init(|| {
        get_codings()
            .iter()
            .filter(|c| c.opcode != OPCODE_PREFIX_FC)
            .map(|c| (c.opcode, c))
            .collect()
    })
}

/// By-subopcode index over the 0xFC-prefixed entries.
pub fn get_codings_by_subopcode() -> &'static HashMap<u32, &'static InstructionCoding> {
    static BY_SUBOPCODE: OnceCell<HashMap<u32, &'static InstructionCoding>> = OnceCell::new();
    BY_SUBOPCODE.get_or_init(|| {
        get_codings()
            .iter()
            .filter(|c| c.opcode == OPCODE_PREFIX_FC)
            .map(|c| (c.subopcode, c))
            .collect()
    })
}
