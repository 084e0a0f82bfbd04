//! A round-trip codec for the WebAssembly binary module format (`.wasm`).
//!
//! wasmedit decodes a byte stream into a structured, mutable [`Module`] and
//! serialises it back to bytes, recomputing every size prefix from the
//! current structure. It does no semantic validation and never executes
//! anything: the point is programmatic inspection and editing of compiled
//! modules (rewriting a start index, patching an import, splicing a custom
//! section) without dragging in a validator or runtime.
//!
//! # Modules
//!
//! - [`cursor`] -- Position-tracked byte reader and little-endian write helpers.
//! - [`leb128`] -- Variable-length integer codec (u32/i32/i33/u64/i64).
//! - [`instruction`] -- Opcode-dispatched instruction codec and const-expression reader.
//! - [`section`] -- One codec per section kind, each owning its internal grammar.
//! - [`module`] -- Magic+version header and (kind, size, payload) section framing.
//!
//! # Example
//!
//! Rewrite the start function of a module and re-encode it:
//!
//! ```
//! use wasmedit::Module;
//!
//! // (module (start 3)) with no other sections
//! let bytes = [
//!     0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, // \0asm, version 1
//!     0x08, 0x01, 0x03, // start section, size 1, funcidx 3
//! ];
//! let mut module = Module::decode(&bytes).unwrap();
//! module.start_section_mut().unwrap().func_index = 0;
//! let patched = module.encode();
//! assert_eq!(patched[10], 0x00);
//! ```
//!
//! # Fidelity
//!
//! The decoder accepts any byte sequence whose shape matches the grammar,
//! including non-minimal LEB128 encodings (up to the overflow guard) and
//! semantically nonsensical index references. The encoder always emits
//! minimal LEB128, so byte-for-byte input/output equality holds exactly for
//! inputs that were already in minimal form; equality at the [`Module`]
//! value level holds unconditionally.

pub mod cursor;
pub mod error;
pub mod instruction;
pub mod leb128;
pub mod module;
pub mod section;

pub use error::DecodeError;
pub use module::Module;
