//! Section payload types and codecs.
//!
//! One codec per section kind; each owns its internal grammar. Decoders
//! operate on the bounded payload cursor carved out by the module framing
//! layer and must consume it exactly. Writers append the payload only; the
//! (kind, size) frame itself is written by [`crate::module`].
//!
//! Every wire-shaped type carries the symmetric triple `decode` / `write` /
//! `size`, where `size` is the exact byte length `write` produces.

use std::fmt;

use crate::cursor::Reader;
use crate::error::DecodeError;
use crate::instruction::{self, Instruction};
use crate::leb128;

// Section IDs
pub const SECTION_CUSTOM: u8 = 0x00;
pub const SECTION_TYPE: u8 = 0x01;
pub const SECTION_IMPORT: u8 = 0x02;
pub const SECTION_FUNCTION: u8 = 0x03;
pub const SECTION_TABLE: u8 = 0x04;
pub const SECTION_MEMORY: u8 = 0x05;
pub const SECTION_GLOBAL: u8 = 0x06;
pub const SECTION_EXPORT: u8 = 0x07;
pub const SECTION_START: u8 = 0x08;
pub const SECTION_ELEMENT: u8 = 0x09;
pub const SECTION_CODE: u8 = 0x0a;
pub const SECTION_DATA: u8 = 0x0b;
pub const SECTION_DATA_COUNT: u8 = 0x0c;
pub const SECTION_TAG: u8 = 0x0d;

// Type-section prefixes and composite kinds
pub const TYPE_FUNC: u8 = 0x60;
pub const TYPE_STRUCT: u8 = 0x5e;
pub const TYPE_ARRAY: u8 = 0x5f;
pub const TYPE_REC: u8 = 0x4e;
pub const TYPE_SUB: u8 = 0x4d;

// Import descriptor kinds
pub const DESC_FUNC: u8 = 0x00;
pub const DESC_TABLE: u8 = 0x01;
pub const DESC_MEMORY: u8 = 0x02;
pub const DESC_GLOBAL: u8 = 0x03;

/// Reads a length-prefixed byte run (names, data payloads).
fn read_byte_vec(reader: &mut Reader) -> Result<Vec<u8>, DecodeError> {
    let len = leb128::read_vu32(reader)?;
    Ok(reader.read_bytes(len as usize)?.to_vec())
}

fn write_byte_vec(buf: &mut Vec<u8>, bytes: &[u8]) {
    leb128::write_vu32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

fn size_byte_vec(bytes: &[u8]) -> usize {
    leb128::size_vu32(bytes.len() as u32) + bytes.len()
}

// ===========================================================================
// Section sum type
// ===========================================================================

/// A decoded section, keyed by its kind byte.
///
/// Kinds outside `0x00..=0x0D` are retained verbatim as
/// [`Section::Unknown`] and re-emitted unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Custom(CustomSection),
    Type(TypeSection),
    Import(ImportSection),
    Function(FunctionSection),
    Table(TableSection),
    Memory(MemorySection),
    Global(GlobalSection),
    Export(ExportSection),
    Start(StartSection),
    Element(ElementSection),
    Code(CodeSection),
    Data(DataSection),
    DataCount(DataCountSection),
    Tag(TagSection),
    Unknown(UnknownSection),
}

impl Section {
    /// The kind byte written in the section frame.
    pub fn kind(&self) -> u8 {
        match self {
            Section::Custom(_) => SECTION_CUSTOM,
            Section::Type(_) => SECTION_TYPE,
            Section::Import(_) => SECTION_IMPORT,
            Section::Function(_) => SECTION_FUNCTION,
            Section::Table(_) => SECTION_TABLE,
            Section::Memory(_) => SECTION_MEMORY,
            Section::Global(_) => SECTION_GLOBAL,
            Section::Export(_) => SECTION_EXPORT,
            Section::Start(_) => SECTION_START,
            Section::Element(_) => SECTION_ELEMENT,
            Section::Code(_) => SECTION_CODE,
            Section::Data(_) => SECTION_DATA,
            Section::DataCount(_) => SECTION_DATA_COUNT,
            Section::Tag(_) => SECTION_TAG,
            Section::Unknown(s) => s.kind,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Custom(_) => "custom",
            Section::Type(_) => "type",
            Section::Import(_) => "import",
            Section::Function(_) => "function",
            Section::Table(_) => "table",
            Section::Memory(_) => "memory",
            Section::Global(_) => "global",
            Section::Export(_) => "export",
            Section::Start(_) => "start",
            Section::Element(_) => "element",
            Section::Code(_) => "code",
            Section::Data(_) => "data",
            Section::DataCount(_) => "datacount",
            Section::Tag(_) => "tag",
            Section::Unknown(_) => "unknown",
        }
    }

    /// Decodes the payload of a section frame.
    ///
    /// `payload` is the bounded cursor over exactly the frame's `size`
    /// bytes; the framing layer checks afterwards that it was fully
    /// consumed.
    pub fn decode(kind: u8, payload: &mut Reader) -> Result<Section, DecodeError> {
        Ok(match kind {
            SECTION_CUSTOM => Section::Custom(CustomSection::decode(payload)?),
            SECTION_TYPE => Section::Type(TypeSection::decode(payload)?),
            SECTION_IMPORT => Section::Import(ImportSection::decode(payload)?),
            SECTION_FUNCTION => Section::Function(FunctionSection::decode(payload)?),
            SECTION_TABLE => Section::Table(TableSection::decode(payload)?),
            SECTION_MEMORY => Section::Memory(MemorySection::decode(payload)?),
            SECTION_GLOBAL => Section::Global(GlobalSection::decode(payload)?),
            SECTION_EXPORT => Section::Export(ExportSection::decode(payload)?),
            SECTION_START => Section::Start(StartSection::decode(payload)?),
            SECTION_ELEMENT => Section::Element(ElementSection::decode(payload)?),
            SECTION_CODE => Section::Code(CodeSection::decode(payload)?),
            SECTION_DATA => Section::Data(DataSection::decode(payload)?),
            SECTION_DATA_COUNT => Section::DataCount(DataCountSection::decode(payload)?),
            SECTION_TAG => Section::Tag(TagSection::decode(payload)?),
            _ => Section::Unknown(UnknownSection::decode(kind, payload)?),
        })
    }

    /// Appends the section payload (frame excluded) to `buf`.
    pub fn write_payload(&self, buf: &mut Vec<u8>) {
        match self {
            Section::Custom(s) => s.write(buf),
            Section::Type(s) => s.write(buf),
            Section::Import(s) => s.write(buf),
            Section::Function(s) => s.write(buf),
            Section::Table(s) => s.write(buf),
            Section::Memory(s) => s.write(buf),
            Section::Global(s) => s.write(buf),
            Section::Export(s) => s.write(buf),
            Section::Start(s) => s.write(buf),
            Section::Element(s) => s.write(buf),
            Section::Code(s) => s.write(buf),
            Section::Data(s) => s.write(buf),
            Section::DataCount(s) => s.write(buf),
            Section::Tag(s) => s.write(buf),
            Section::Unknown(s) => s.write(buf),
        }
    }

    /// Byte length of the payload [`Section::write_payload`] will produce.
    pub fn payload_size(&self) -> usize {
        match self {
            Section::Custom(s) => s.size(),
            Section::Type(s) => s.size(),
            Section::Import(s) => s.size(),
            Section::Function(s) => s.size(),
            Section::Table(s) => s.size(),
            Section::Memory(s) => s.size(),
            Section::Global(s) => s.size(),
            Section::Export(s) => s.size(),
            Section::Start(s) => s.size(),
            Section::Element(s) => s.size(),
            Section::Code(s) => s.size(),
            Section::Data(s) => s.size(),
            Section::DataCount(s) => s.size(),
            Section::Tag(s) => s.size(),
            Section::Unknown(s) => s.size(),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} section ({} bytes)", self.name(), self.payload_size())
    }
}

// ===========================================================================
// Custom section (id 0)
// ===========================================================================

/// An uninterpreted named section. `data` is whatever follows the name, kept
/// verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomSection {
    pub name: Vec<u8>,
    pub data: Vec<u8>,
}

impl CustomSection {
    pub fn decode(reader: &mut Reader) -> Result<CustomSection, DecodeError> {
        let name = read_byte_vec(reader)?;
        let data = reader.read_bytes(reader.remaining())?.to_vec();
        Ok(CustomSection { name, data })
    }

    /// The section name, lossily decoded for display purposes.
    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        write_byte_vec(buf, &self.name);
        buf.extend_from_slice(&self.data);
    }

    pub fn size(&self) -> usize {
        size_byte_vec(&self.name) + self.data.len()
    }
}

// ===========================================================================
// Type section (id 1)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSection {
    pub types: Vec<TypeEntry>,
}

/// One entry of the type section.
///
/// `prefix` is the first byte of the entry. `0x60` introduces a plain
/// function type with no kind byte. The GC prefixes `0x4E` (rec) and `0x4D`
/// (sub) carry a count-prefixed list of supertype indices followed by a kind
/// byte and body. Any other prefix is retained verbatim and is still
/// followed by a kind byte and body, matching what producers of such
/// entries actually emit.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub prefix: u8,
    pub subtypes: Vec<u32>,
    pub body: TypeBody,
}

/// A struct or array field: value type byte and mutability byte.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub value_type: u8,
    pub mutable: u8,
}

impl FieldType {
    fn decode(reader: &mut Reader) -> Result<FieldType, DecodeError> {
        Ok(FieldType {
            value_type: reader.read_u8()?,
            mutable: reader.read_u8()?,
        })
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.value_type);
        buf.push(self.mutable);
    }
}

/// The composite body of a type entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeBody {
    /// Params and results, one value type byte each.
    Func { params: Vec<u8>, results: Vec<u8> },
    Struct { fields: Vec<FieldType> },
    Array(FieldType),
}

impl TypeBody {
    /// The kind byte written before the body (omitted after a `0x60`
    /// prefix, where the prefix itself is the kind).
    pub fn kind(&self) -> u8 {
        match self {
            TypeBody::Func { .. } => TYPE_FUNC,
            TypeBody::Struct { .. } => TYPE_STRUCT,
            TypeBody::Array(_) => TYPE_ARRAY,
        }
    }

    fn decode(kind: u8, reader: &mut Reader) -> Result<TypeBody, DecodeError> {
        match kind {
            TYPE_FUNC => {
                let params = read_byte_vec(reader)?;
                let results = read_byte_vec(reader)?;
                Ok(TypeBody::Func { params, results })
            }
            TYPE_STRUCT => {
                let count = leb128::read_vu32(reader)?;
                let mut fields = Vec::new();
                for _ in 0..count {
                    fields.push(FieldType::decode(reader)?);
                }
                Ok(TypeBody::Struct { fields })
            }
            TYPE_ARRAY => Ok(TypeBody::Array(FieldType::decode(reader)?)),
            _ => Err(DecodeError::UnknownTypeKind(kind)),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        match self {
            TypeBody::Func { params, results } => {
                write_byte_vec(buf, params);
                write_byte_vec(buf, results);
            }
            TypeBody::Struct { fields } => {
                leb128::write_vu32(buf, fields.len() as u32);
                for field in fields {
                    field.write(buf);
                }
            }
            TypeBody::Array(field) => field.write(buf),
        }
    }

    fn size(&self) -> usize {
        match self {
            TypeBody::Func { params, results } => size_byte_vec(params) + size_byte_vec(results),
            TypeBody::Struct { fields } => {
                leb128::size_vu32(fields.len() as u32) + fields.len() * 2
            }
            TypeBody::Array(_) => 2,
        }
    }
}

impl TypeEntry {
    /// A plain `0x60`-prefixed function type.
    pub fn func(params: Vec<u8>, results: Vec<u8>) -> TypeEntry {
        TypeEntry {
            prefix: TYPE_FUNC,
            subtypes: Vec::new(),
            body: TypeBody::Func { params, results },
        }
    }

    pub fn decode(reader: &mut Reader) -> Result<TypeEntry, DecodeError> {
        let prefix = reader.read_u8()?;
        if prefix == TYPE_FUNC {
            let body = TypeBody::decode(TYPE_FUNC, reader)?;
            return Ok(TypeEntry { prefix, subtypes: Vec::new(), body });
        }
        let mut subtypes = Vec::new();
        if prefix == TYPE_REC || prefix == TYPE_SUB {
            let count = leb128::read_vu32(reader)?;
            for _ in 0..count {
                subtypes.push(leb128::read_vu32(reader)?);
            }
        }
        let kind = reader.read_u8()?;
        let body = TypeBody::decode(kind, reader)?;
        Ok(TypeEntry { prefix, subtypes, body })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.prefix);
        if self.prefix == TYPE_FUNC {
            self.body.write(buf);
            return;
        }
        if self.prefix == TYPE_REC || self.prefix == TYPE_SUB {
            leb128::write_vu32(buf, self.subtypes.len() as u32);
            for subtype in &self.subtypes {
                leb128::write_vu32(buf, *subtype);
            }
        }
        buf.push(self.body.kind());
        self.body.write(buf);
    }

    pub fn size(&self) -> usize {
        if self.prefix == TYPE_FUNC {
            return 1 + self.body.size();
        }
        let mut size = 1;
        if self.prefix == TYPE_REC || self.prefix == TYPE_SUB {
            size += leb128::size_vu32(self.subtypes.len() as u32);
            size += self.subtypes.iter().map(|s| leb128::size_vu32(*s)).sum::<usize>();
        }
        size + 1 + self.body.size()
    }
}

impl TypeSection {
    pub fn decode(reader: &mut Reader) -> Result<TypeSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut types = Vec::new();
        for _ in 0..count {
            types.push(TypeEntry::decode(reader)?);
        }
        Ok(TypeSection { types })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.types.len() as u32);
        for entry in &self.types {
            entry.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.types.len() as u32)
            + self.types.iter().map(TypeEntry::size).sum::<usize>()
    }
}

// ===========================================================================
// Import section (id 2)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSection {
    pub imports: Vec<Import>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub module: Vec<u8>,
    pub name: Vec<u8>,
    pub desc: ImportDesc,
}

/// The imported entity, tagged by the descriptor kind byte (0..=3).
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDesc {
    Func { type_index: u32 },
    Table { ref_type: u8, limits: Limits },
    Memory { limits: Limits },
    Global { value_type: u8, mutable: u8 },
}

impl ImportDesc {
    pub fn kind(&self) -> u8 {
        match self {
            ImportDesc::Func { .. } => DESC_FUNC,
            ImportDesc::Table { .. } => DESC_TABLE,
            ImportDesc::Memory { .. } => DESC_MEMORY,
            ImportDesc::Global { .. } => DESC_GLOBAL,
        }
    }

    fn decode(reader: &mut Reader) -> Result<ImportDesc, DecodeError> {
        let kind = reader.read_u8()?;
        match kind {
            DESC_FUNC => Ok(ImportDesc::Func { type_index: leb128::read_vu32(reader)? }),
            DESC_TABLE => Ok(ImportDesc::Table {
                ref_type: reader.read_u8()?,
                limits: Limits::decode(reader)?,
            }),
            DESC_MEMORY => Ok(ImportDesc::Memory { limits: Limits::decode(reader)? }),
            DESC_GLOBAL => Ok(ImportDesc::Global {
                value_type: reader.read_u8()?,
                mutable: reader.read_u8()?,
            }),
            _ => Err(DecodeError::UnknownImportKind(kind)),
        }
    }

    fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.kind());
        match self {
            ImportDesc::Func { type_index } => leb128::write_vu32(buf, *type_index),
            ImportDesc::Table { ref_type, limits } => {
                buf.push(*ref_type);
                limits.write(buf);
            }
            ImportDesc::Memory { limits } => limits.write(buf),
            ImportDesc::Global { value_type, mutable } => {
                buf.push(*value_type);
                buf.push(*mutable);
            }
        }
    }

    fn size(&self) -> usize {
        1 + match self {
            ImportDesc::Func { type_index } => leb128::size_vu32(*type_index),
            ImportDesc::Table { limits, .. } => 1 + limits.size(),
            ImportDesc::Memory { limits } => limits.size(),
            ImportDesc::Global { .. } => 2,
        }
    }
}

impl Import {
    pub fn decode(reader: &mut Reader) -> Result<Import, DecodeError> {
        Ok(Import {
            module: read_byte_vec(reader)?,
            name: read_byte_vec(reader)?,
            desc: ImportDesc::decode(reader)?,
        })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        write_byte_vec(buf, &self.module);
        write_byte_vec(buf, &self.name);
        self.desc.write(buf);
    }

    pub fn size(&self) -> usize {
        size_byte_vec(&self.module) + size_byte_vec(&self.name) + self.desc.size()
    }
}

impl ImportSection {
    pub fn decode(reader: &mut Reader) -> Result<ImportSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut imports = Vec::new();
        for _ in 0..count {
            imports.push(Import::decode(reader)?);
        }
        Ok(ImportSection { imports })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.imports.len() as u32);
        for import in &self.imports {
            import.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.imports.len() as u32)
            + self.imports.iter().map(Import::size).sum::<usize>()
    }
}

// ===========================================================================
// Limits (tables and memories, imported or local)
// ===========================================================================

/// Resizable limits with the raw flag byte preserved.
///
/// Only bit 0 gates the presence of `max`; higher flag bits (shared,
/// 64-bit) round-trip without being interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    pub flag: u8,
    pub min: u32,
    pub max: Option<u32>,
}

impl Limits {
    pub fn decode(reader: &mut Reader) -> Result<Limits, DecodeError> {
        let flag = reader.read_u8()?;
        let min = leb128::read_vu32(reader)?;
        let max = if flag & 1 != 0 { Some(leb128::read_vu32(reader)?) } else { None };
        Ok(Limits { flag, min, max })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.push(self.flag);
        leb128::write_vu32(buf, self.min);
        if self.flag & 1 != 0 {
            leb128::write_vu32(buf, self.max.unwrap_or(0));
        }
    }

    pub fn size(&self) -> usize {
        let mut size = 1 + leb128::size_vu32(self.min);
        if self.flag & 1 != 0 {
            size += leb128::size_vu32(self.max.unwrap_or(0));
        }
        size
    }
}

// ===========================================================================
// Function section (id 3)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSection {
    pub type_indices: Vec<u32>,
}

impl FunctionSection {
    pub fn decode(reader: &mut Reader) -> Result<FunctionSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut type_indices = Vec::new();
        for _ in 0..count {
            type_indices.push(leb128::read_vu32(reader)?);
        }
        Ok(FunctionSection { type_indices })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.type_indices.len() as u32);
        for index in &self.type_indices {
            leb128::write_vu32(buf, *index);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.type_indices.len() as u32)
            + self.type_indices.iter().map(|i| leb128::size_vu32(*i)).sum::<usize>()
    }
}

// ===========================================================================
// Table section (id 4)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TableType {
    pub ref_type: u8,
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSection {
    pub tables: Vec<TableType>,
}

impl TableSection {
    pub fn decode(reader: &mut Reader) -> Result<TableSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut tables = Vec::new();
        for _ in 0..count {
            tables.push(TableType {
                ref_type: reader.read_u8()?,
                limits: Limits::decode(reader)?,
            });
        }
        Ok(TableSection { tables })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.tables.len() as u32);
        for table in &self.tables {
            buf.push(table.ref_type);
            table.limits.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.tables.len() as u32)
            + self.tables.iter().map(|t| 1 + t.limits.size()).sum::<usize>()
    }
}

// ===========================================================================
// Memory section (id 5)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MemorySection {
    pub memories: Vec<Limits>,
}

impl MemorySection {
    pub fn decode(reader: &mut Reader) -> Result<MemorySection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut memories = Vec::new();
        for _ in 0..count {
            memories.push(Limits::decode(reader)?);
        }
        Ok(MemorySection { memories })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.memories.len() as u32);
        for memory in &self.memories {
            memory.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.memories.len() as u32)
            + self.memories.iter().map(Limits::size).sum::<usize>()
    }
}

// ===========================================================================
// Global section (id 6)
// ===========================================================================

/// A global: type, mutability, and its initialiser expression (terminating
/// `end` included).
#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub value_type: u8,
    pub mutable: u8,
    pub init: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSection {
    pub globals: Vec<Global>,
}

impl GlobalSection {
    pub fn decode(reader: &mut Reader) -> Result<GlobalSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut globals = Vec::new();
        for _ in 0..count {
            globals.push(Global {
                value_type: reader.read_u8()?,
                mutable: reader.read_u8()?,
                init: instruction::read_const_expr(reader)?,
            });
        }
        Ok(GlobalSection { globals })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.globals.len() as u32);
        for global in &self.globals {
            buf.push(global.value_type);
            buf.push(global.mutable);
            instruction::write_expr(buf, &global.init);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.globals.len() as u32)
            + self
                .globals
                .iter()
                .map(|g| 2 + instruction::size_expr(&g.init))
                .sum::<usize>()
    }
}

// ===========================================================================
// Export section (id 7)
// ===========================================================================

/// An export. The kind byte is not validated; it round-trips verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub name: Vec<u8>,
    pub kind: u8,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSection {
    pub exports: Vec<Export>,
}

impl ExportSection {
    pub fn decode(reader: &mut Reader) -> Result<ExportSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut exports = Vec::new();
        for _ in 0..count {
            exports.push(Export {
                name: read_byte_vec(reader)?,
                kind: reader.read_u8()?,
                index: leb128::read_vu32(reader)?,
            });
        }
        Ok(ExportSection { exports })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.exports.len() as u32);
        for export in &self.exports {
            write_byte_vec(buf, &export.name);
            buf.push(export.kind);
            leb128::write_vu32(buf, export.index);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.exports.len() as u32)
            + self
                .exports
                .iter()
                .map(|e| size_byte_vec(&e.name) + 1 + leb128::size_vu32(e.index))
                .sum::<usize>()
    }
}

// ===========================================================================
// Start section (id 8)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StartSection {
    pub func_index: u32,
}

impl StartSection {
    pub fn decode(reader: &mut Reader) -> Result<StartSection, DecodeError> {
        Ok(StartSection { func_index: leb128::read_vu32(reader)? })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.func_index);
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.func_index)
    }
}

// ===========================================================================
// Element section (id 9)
// ===========================================================================

/// An element segment, one variant per wire flag 0..=7.
///
/// The flag selects which of table index, offset expression, ref type byte,
/// and item encoding (function indices vs expressions) are present. Flags 0
/// and 4 share a wire layout; they stay distinct variants so the original
/// flag byte is re-emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementSegment {
    /// Flag 0: offset expression, function indices.
    ActiveFuncs { offset: Vec<Instruction>, func_indices: Vec<u32> },
    /// Flag 1: ref type byte, expression initialisers.
    PassiveExprs { ref_type: u8, inits: Vec<Vec<Instruction>> },
    /// Flag 2: explicit table index, offset expression, ref type byte,
    /// expression initialisers.
    ActiveTableExprs {
        table_index: u32,
        offset: Vec<Instruction>,
        ref_type: u8,
        inits: Vec<Vec<Instruction>>,
    },
    /// Flag 3: ref type byte, expression initialisers.
    DeclarativeExprs { ref_type: u8, inits: Vec<Vec<Instruction>> },
    /// Flag 4: same wire layout as flag 0.
    ActiveFuncsAlt { offset: Vec<Instruction>, func_indices: Vec<u32> },
    /// Flag 5: ref type byte, function indices.
    PassiveFuncs { ref_type: u8, func_indices: Vec<u32> },
    /// Flag 6: explicit table index, offset expression, ref type byte,
    /// function indices.
    ActiveTableFuncs {
        table_index: u32,
        offset: Vec<Instruction>,
        ref_type: u8,
        func_indices: Vec<u32>,
    },
    /// Flag 7: ref type byte, function indices.
    DeclarativeFuncs { ref_type: u8, func_indices: Vec<u32> },
}

fn read_func_indices(reader: &mut Reader) -> Result<Vec<u32>, DecodeError> {
    let count = leb128::read_vu32(reader)?;
    let mut indices = Vec::new();
    for _ in 0..count {
        indices.push(leb128::read_vu32(reader)?);
    }
    Ok(indices)
}

fn write_func_indices(buf: &mut Vec<u8>, indices: &[u32]) {
    leb128::write_vu32(buf, indices.len() as u32);
    for index in indices {
        leb128::write_vu32(buf, *index);
    }
}

fn size_func_indices(indices: &[u32]) -> usize {
    leb128::size_vu32(indices.len() as u32)
        + indices.iter().map(|i| leb128::size_vu32(*i)).sum::<usize>()
}

fn read_init_exprs(reader: &mut Reader) -> Result<Vec<Vec<Instruction>>, DecodeError> {
    let count = leb128::read_vu32(reader)?;
    let mut inits = Vec::new();
    for _ in 0..count {
        inits.push(instruction::read_const_expr(reader)?);
    }
    Ok(inits)
}

fn write_init_exprs(buf: &mut Vec<u8>, inits: &[Vec<Instruction>]) {
    leb128::write_vu32(buf, inits.len() as u32);
    for init in inits {
        instruction::write_expr(buf, init);
    }
}

fn size_init_exprs(inits: &[Vec<Instruction>]) -> usize {
    leb128::size_vu32(inits.len() as u32)
        + inits.iter().map(|i| instruction::size_expr(i)).sum::<usize>()
}

impl ElementSegment {
    /// The wire flag this variant encodes as.
    pub fn flag(&self) -> u32 {
        match self {
            ElementSegment::ActiveFuncs { .. } => 0,
            ElementSegment::PassiveExprs { .. } => 1,
            ElementSegment::ActiveTableExprs { .. } => 2,
            ElementSegment::DeclarativeExprs { .. } => 3,
            ElementSegment::ActiveFuncsAlt { .. } => 4,
            ElementSegment::PassiveFuncs { .. } => 5,
            ElementSegment::ActiveTableFuncs { .. } => 6,
            ElementSegment::DeclarativeFuncs { .. } => 7,
        }
    }

    pub fn decode(reader: &mut Reader) -> Result<ElementSegment, DecodeError> {
        let flag = leb128::read_vu32(reader)?;
        match flag {
            0 => Ok(ElementSegment::ActiveFuncs {
                offset: instruction::read_const_expr(reader)?,
                func_indices: read_func_indices(reader)?,
            }),
            1 => Ok(ElementSegment::PassiveExprs {
                ref_type: reader.read_u8()?,
                inits: read_init_exprs(reader)?,
            }),
            2 => Ok(ElementSegment::ActiveTableExprs {
                table_index: leb128::read_vu32(reader)?,
                offset: instruction::read_const_expr(reader)?,
                ref_type: reader.read_u8()?,
                inits: read_init_exprs(reader)?,
            }),
            3 => Ok(ElementSegment::DeclarativeExprs {
                ref_type: reader.read_u8()?,
                inits: read_init_exprs(reader)?,
            }),
            4 => Ok(ElementSegment::ActiveFuncsAlt {
                offset: instruction::read_const_expr(reader)?,
                func_indices: read_func_indices(reader)?,
            }),
            5 => Ok(ElementSegment::PassiveFuncs {
                ref_type: reader.read_u8()?,
                func_indices: read_func_indices(reader)?,
            }),
            6 => Ok(ElementSegment::ActiveTableFuncs {
                table_index: leb128::read_vu32(reader)?,
                offset: instruction::read_const_expr(reader)?,
                ref_type: reader.read_u8()?,
                func_indices: read_func_indices(reader)?,
            }),
            7 => Ok(ElementSegment::DeclarativeFuncs {
                ref_type: reader.read_u8()?,
                func_indices: read_func_indices(reader)?,
            }),
            _ => Err(DecodeError::UnknownElementFlag(flag)),
        }
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.flag());
        match self {
            ElementSegment::ActiveFuncs { offset, func_indices }
            | ElementSegment::ActiveFuncsAlt { offset, func_indices } => {
                instruction::write_expr(buf, offset);
                write_func_indices(buf, func_indices);
            }
            ElementSegment::PassiveExprs { ref_type, inits }
            | ElementSegment::DeclarativeExprs { ref_type, inits } => {
                buf.push(*ref_type);
                write_init_exprs(buf, inits);
            }
            ElementSegment::ActiveTableExprs { table_index, offset, ref_type, inits } => {
                leb128::write_vu32(buf, *table_index);
                instruction::write_expr(buf, offset);
                buf.push(*ref_type);
                write_init_exprs(buf, inits);
            }
            ElementSegment::PassiveFuncs { ref_type, func_indices }
            | ElementSegment::DeclarativeFuncs { ref_type, func_indices } => {
                buf.push(*ref_type);
                write_func_indices(buf, func_indices);
            }
            ElementSegment::ActiveTableFuncs { table_index, offset, ref_type, func_indices } => {
                leb128::write_vu32(buf, *table_index);
                instruction::write_expr(buf, offset);
                buf.push(*ref_type);
                write_func_indices(buf, func_indices);
            }
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.flag())
            + match self {
                ElementSegment::ActiveFuncs { offset, func_indices }
                | ElementSegment::ActiveFuncsAlt { offset, func_indices } => {
                    instruction::size_expr(offset) + size_func_indices(func_indices)
                }
                ElementSegment::PassiveExprs { inits, .. }
                | ElementSegment::DeclarativeExprs { inits, .. } => 1 + size_init_exprs(inits),
                ElementSegment::ActiveTableExprs { table_index, offset, inits, .. } => {
                    leb128::size_vu32(*table_index)
                        + instruction::size_expr(offset)
                        + 1
                        + size_init_exprs(inits)
                }
                ElementSegment::PassiveFuncs { func_indices, .. }
                | ElementSegment::DeclarativeFuncs { func_indices, .. } => {
                    1 + size_func_indices(func_indices)
                }
                ElementSegment::ActiveTableFuncs { table_index, offset, func_indices, .. } => {
                    leb128::size_vu32(*table_index)
                        + instruction::size_expr(offset)
                        + 1
                        + size_func_indices(func_indices)
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementSection {
    pub segments: Vec<ElementSegment>,
}

impl ElementSection {
    pub fn decode(reader: &mut Reader) -> Result<ElementSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut segments = Vec::new();
        for _ in 0..count {
            segments.push(ElementSegment::decode(reader)?);
        }
        Ok(ElementSection { segments })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.segments.len() as u32);
        for segment in &self.segments {
            segment.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.segments.len() as u32)
            + self.segments.iter().map(ElementSegment::size).sum::<usize>()
    }
}

// ===========================================================================
// Code section (id 10)
// ===========================================================================

/// A run-length encoded local declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalEntry {
    pub count: u32,
    pub value_type: u8,
}

/// A function body: locals, then instructions filling the rest of the
/// size-prefixed frame. The final `end` is an ordinary list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    pub locals: Vec<LocalEntry>,
    pub instructions: Vec<Instruction>,
}

impl FunctionBody {
    pub fn decode(reader: &mut Reader) -> Result<FunctionBody, DecodeError> {
        let size = leb128::read_vu32(reader)?;
        let mut body = reader.take(size as usize)?;
        let local_count = leb128::read_vu32(&mut body)?;
        let mut locals = Vec::new();
        for _ in 0..local_count {
            locals.push(LocalEntry {
                count: leb128::read_vu32(&mut body)?,
                value_type: body.read_u8()?,
            });
        }
        let mut instructions = Vec::new();
        while !body.is_empty() {
            instructions.push(instruction::read_instruction(&mut body)?);
        }
        Ok(FunctionBody { locals, instructions })
    }

    fn inner_size(&self) -> usize {
        leb128::size_vu32(self.locals.len() as u32)
            + self
                .locals
                .iter()
                .map(|l| leb128::size_vu32(l.count) + 1)
                .sum::<usize>()
            + instruction::size_expr(&self.instructions)
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        let inner = self.inner_size();
        leb128::write_vu32(buf, inner as u32);
        let start = buf.len();
        leb128::write_vu32(buf, self.locals.len() as u32);
        for local in &self.locals {
            leb128::write_vu32(buf, local.count);
            buf.push(local.value_type);
        }
        instruction::write_expr(buf, &self.instructions);
        debug_assert_eq!(buf.len() - start, inner, "function body size mismatch");
    }

    pub fn size(&self) -> usize {
        let inner = self.inner_size();
        leb128::size_vu32(inner as u32) + inner
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeSection {
    pub bodies: Vec<FunctionBody>,
}

impl CodeSection {
    pub fn decode(reader: &mut Reader) -> Result<CodeSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut bodies = Vec::new();
        for _ in 0..count {
            bodies.push(FunctionBody::decode(reader)?);
        }
        Ok(CodeSection { bodies })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.bodies.len() as u32);
        for body in &self.bodies {
            body.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.bodies.len() as u32)
            + self.bodies.iter().map(FunctionBody::size).sum::<usize>()
    }
}

// ===========================================================================
// Data section (id 11)
// ===========================================================================

/// A data segment, one variant per wire flag 0..=2.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSegment {
    /// Flag 0: offset expression into memory 0.
    Active { offset: Vec<Instruction>, data: Vec<u8> },
    /// Flag 1: no placement.
    Passive { data: Vec<u8> },
    /// Flag 2: explicit memory index and offset expression.
    ActiveExplicit { memory_index: u32, offset: Vec<Instruction>, data: Vec<u8> },
}

impl DataSegment {
    pub fn flag(&self) -> u32 {
        match self {
            DataSegment::Active { .. } => 0,
            DataSegment::Passive { .. } => 1,
            DataSegment::ActiveExplicit { .. } => 2,
        }
    }

    pub fn decode(reader: &mut Reader) -> Result<DataSegment, DecodeError> {
        let flag = leb128::read_vu32(reader)?;
        match flag {
            0 => Ok(DataSegment::Active {
                offset: instruction::read_const_expr(reader)?,
                data: read_byte_vec(reader)?,
            }),
            1 => Ok(DataSegment::Passive { data: read_byte_vec(reader)? }),
            2 => Ok(DataSegment::ActiveExplicit {
                memory_index: leb128::read_vu32(reader)?,
                offset: instruction::read_const_expr(reader)?,
                data: read_byte_vec(reader)?,
            }),
            _ => Err(DecodeError::UnknownDataFlag(flag)),
        }
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.flag());
        match self {
            DataSegment::Active { offset, data } => {
                instruction::write_expr(buf, offset);
                write_byte_vec(buf, data);
            }
            DataSegment::Passive { data } => write_byte_vec(buf, data),
            DataSegment::ActiveExplicit { memory_index, offset, data } => {
                leb128::write_vu32(buf, *memory_index);
                instruction::write_expr(buf, offset);
                write_byte_vec(buf, data);
            }
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.flag())
            + match self {
                DataSegment::Active { offset, data } => {
                    instruction::size_expr(offset) + size_byte_vec(data)
                }
                DataSegment::Passive { data } => size_byte_vec(data),
                DataSegment::ActiveExplicit { memory_index, offset, data } => {
                    leb128::size_vu32(*memory_index)
                        + instruction::size_expr(offset)
                        + size_byte_vec(data)
                }
            }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSection {
    pub segments: Vec<DataSegment>,
}

impl DataSection {
    pub fn decode(reader: &mut Reader) -> Result<DataSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut segments = Vec::new();
        for _ in 0..count {
            segments.push(DataSegment::decode(reader)?);
        }
        Ok(DataSection { segments })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.segments.len() as u32);
        for segment in &self.segments {
            segment.write(buf);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.segments.len() as u32)
            + self.segments.iter().map(DataSegment::size).sum::<usize>()
    }
}

// ===========================================================================
// Data count section (id 12)
// ===========================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DataCountSection {
    pub count: u32,
}

impl DataCountSection {
    pub fn decode(reader: &mut Reader) -> Result<DataCountSection, DecodeError> {
        Ok(DataCountSection { count: leb128::read_vu32(reader)? })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.count);
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.count)
    }
}

// ===========================================================================
// Tag section (id 13)
// ===========================================================================

/// An exception tag: attribute byte and function type index.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub attribute: u8,
    pub type_index: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSection {
    pub tags: Vec<Tag>,
}

impl TagSection {
    pub fn decode(reader: &mut Reader) -> Result<TagSection, DecodeError> {
        let count = leb128::read_vu32(reader)?;
        let mut tags = Vec::new();
        for _ in 0..count {
            tags.push(Tag {
                attribute: reader.read_u8()?,
                type_index: leb128::read_vu32(reader)?,
            });
        }
        Ok(TagSection { tags })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        leb128::write_vu32(buf, self.tags.len() as u32);
        for tag in &self.tags {
            buf.push(tag.attribute);
            leb128::write_vu32(buf, tag.type_index);
        }
    }

    pub fn size(&self) -> usize {
        leb128::size_vu32(self.tags.len() as u32)
            + self.tags.iter().map(|t| 1 + leb128::size_vu32(t.type_index)).sum::<usize>()
    }
}

// ===========================================================================
// Unknown section
// ===========================================================================

/// A section with an unrecognised kind byte, preserved verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownSection {
    pub kind: u8,
    pub payload: Vec<u8>,
}

impl UnknownSection {
    pub fn decode(kind: u8, reader: &mut Reader) -> Result<UnknownSection, DecodeError> {
        let payload = reader.read_bytes(reader.remaining())?.to_vec();
        Ok(UnknownSection { kind, payload })
    }

    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.payload);
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
