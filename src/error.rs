//! The single failure channel for decoding.

use thiserror::Error;

/// Errors produced while decoding a module, section, or instruction stream.
///
/// All errors are fatal to the decode call that produced them; no partial
/// result is returned. Encoding is infallible (writers append to a growable
/// buffer) so there is no encode counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The first four bytes were not `\0asm`.
    #[error("invalid magic: expected 0x6d736100, got {0:#010x}")]
    InvalidMagic(u32),

    /// The version field was not 1.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),

    /// A read ran past the end of the input or of a section payload.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// A LEB128 value failed to terminate within 70 shift bits, or its
    /// decoded magnitude exceeds the declared integer width.
    #[error("LEB128 value out of range for {0}")]
    LebOverflow(&'static str),

    /// An opcode byte with no entry in the instruction coding table.
    #[error("unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    /// A prefixed instruction with an unrecognised subopcode.
    #[error("unknown instruction: {0:#04x} {1:#04x}")]
    UnknownSubopcode(u8, u32),

    /// An import descriptor kind outside 0..=3.
    #[error("unknown import kind: {0:#04x}")]
    UnknownImportKind(u8),

    /// An element segment flag outside 0..=7.
    #[error("unknown element segment flag: {0}")]
    UnknownElementFlag(u32),

    /// A data segment flag outside 0..=2.
    #[error("unknown data segment flag: {0}")]
    UnknownDataFlag(u32),

    /// A composite type kind that is not func, struct, or array.
    #[error("unknown type kind: {0:#04x}")]
    UnknownTypeKind(u8),

    /// A section decoder consumed fewer bytes than the frame declared.
    #[error("section {kind:#04x} declared {declared} payload bytes, consumed {consumed}")]
    SectionSizeMismatch { kind: u8, declared: u32, consumed: u32 },
}
