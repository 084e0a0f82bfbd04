//! Module framing: the magic+version header and the section frame stream.
//!
//! ```text
//! module   := magic(4) version(4) section*
//! magic    := 00 61 73 6d         ; little-endian u32 = 0x6d736100
//! version  := 01 00 00 00         ; little-endian u32 = 1
//! section  := kind:u8 size:vu32 payload[size]
//! ```
//!
//! Decoding carves each payload into a bounded sub-cursor and requires the
//! section codec to consume it exactly. Encoding recomputes every size
//! prefix from the current structure; nothing is cached from the source
//! bytes, so arbitrary edits to a decoded [`Module`] re-encode correctly.

use std::fmt;

use crate::cursor::{self, Reader};
use crate::error::DecodeError;
use crate::leb128;
use crate::section::{CustomSection, Section, StartSection};

/// `\0asm` read as a little-endian u32.
pub const MAGIC: u32 = 0x6d73_6100;
/// The only supported binary format version.
pub const VERSION: u32 = 1;

/// A decoded module: the header fields and its sections in wire order.
///
/// The decoder only ever produces `magic == MAGIC` and `version == VERSION`;
/// the fields are stored (and written back verbatim) so the header survives
/// the same mutate-and-reencode lifecycle as everything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub magic: u32,
    pub version: u32,
    pub sections: Vec<Section>,
}

impl Module {
    /// An empty module with a valid header.
    pub fn new() -> Module {
        Module { magic: MAGIC, version: VERSION, sections: Vec::new() }
    }

    /// Decodes a complete module from `bytes`.
    ///
    /// The input must be exactly one module; trailing bytes that do not
    /// form a section frame fail the decode.
    pub fn decode(bytes: &[u8]) -> Result<Module, DecodeError> {
        let mut reader = Reader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic(magic));
        }
        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let mut sections = Vec::new();
        while !reader.is_empty() {
            let kind = reader.read_u8()?;
            let size = leb128::read_vu32(&mut reader)?;
            let mut payload = reader.take(size as usize)?;
            let section = Section::decode(kind, &mut payload)?;
            if !payload.is_empty() {
                return Err(DecodeError::SectionSizeMismatch {
                    kind,
                    declared: size,
                    consumed: size - payload.remaining() as u32,
                });
            }
            sections.push(section);
        }

        Ok(Module { magic, version, sections })
    }

    /// Encodes the module to bytes, recomputing all size prefixes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        cursor::write_u32(&mut buf, self.magic);
        cursor::write_u32(&mut buf, self.version);
        for section in &self.sections {
            buf.push(section.kind());
            let size = section.payload_size();
            leb128::write_vu32(&mut buf, size as u32);
            let start = buf.len();
            section.write_payload(&mut buf);
            debug_assert_eq!(
                buf.len() - start,
                size,
                "{} section payload size mismatch",
                section.name()
            );
        }
        buf
    }

    /// The first start section, if any, for editing.
    pub fn start_section_mut(&mut self) -> Option<&mut StartSection> {
        self.sections.iter_mut().find_map(|section| match section {
            Section::Start(start) => Some(start),
            _ => None,
        })
    }

    /// All custom sections with the given name.
    pub fn custom_sections<'a>(
        &'a self,
        name: &'a [u8],
    ) -> impl Iterator<Item = &'a CustomSection> + 'a {
        self.sections.iter().filter_map(move |section| match section {
            Section::Custom(custom) if custom.name == name => Some(custom),
            _ => None,
        })
    }
}

impl Default for Module {
    fn default() -> Module {
        Module::new()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module version = {}", self.version)?;
        for section in &self.sections {
            writeln!(f, "  {section}")?;
        }
        Ok(())
    }
}
