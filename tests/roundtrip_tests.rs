//! Round-trip tests: decode/encode stability at the byte level and at the
//! value level.
//!
//! Testing strategy: for byte fixtures that are already in minimal LEB128
//! form, `encode(decode(B))` must reproduce B exactly. For constructed or
//! mutated Module values, `decode(encode(M))` must reproduce M structurally;
//! the encoder recomputes every size prefix, so value equality through the
//! round trip proves it depends on nothing but the current structure.

#[cfg(test)]
mod tests {
    use wasmedit::instruction::{Immediate, Instruction};
    use wasmedit::module::{MAGIC, VERSION};
    use wasmedit::section::{
        CustomSection, DataCountSection, DataSegment, DataSection, ElementSegment,
        ElementSection, Export, ExportSection, FunctionBody, FunctionSection, CodeSection,
        Global, GlobalSection, Import, ImportDesc, ImportSection, Limits, LocalEntry,
        MemorySection, Section, StartSection, TableSection, TableType, Tag, TagSection,
        TypeEntry, TypeSection, UnknownSection,
    };
    use wasmedit::{DecodeError, Module};

    const HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

    /// Decodes `bytes`, re-encodes, and asserts byte equality; then decodes
    /// the re-encoded bytes and asserts value equality.
    fn assert_byte_round_trip(bytes: &[u8]) -> Module {
        let module = Module::decode(bytes).unwrap_or_else(|e| panic!("decode failed: {e}"));
        let encoded = module.encode();
        assert_eq!(encoded, bytes, "re-encoded bytes differ from input");
        let reparsed = Module::decode(&encoded).unwrap_or_else(|e| panic!("re-decode failed: {e}"));
        assert_eq!(reparsed, module, "re-decoded module differs");
        module
    }

    /// Encodes `module`, decodes the bytes, and asserts value equality.
    fn assert_value_round_trip(module: &Module) -> Vec<u8> {
        let encoded = module.encode();
        let reparsed = Module::decode(&encoded).unwrap_or_else(|e| panic!("decode failed: {e}"));
        assert_eq!(&reparsed, module, "module changed through encode/decode");
        encoded
    }

    fn i32_const_expr(value: i32) -> Vec<Instruction> {
        vec![
            Instruction::new(0x41, vec![Immediate::I32(value)]),
            Instruction::end(),
        ]
    }

    // =======================================================================
    // Boundary scenarios
    // =======================================================================

    #[test]
    fn minimal_empty_module() {
        let module = assert_byte_round_trip(&HEADER);
        assert_eq!(module.magic, MAGIC);
        assert_eq!(module.version, VERSION);
        assert!(module.sections.is_empty());
    }

    #[test]
    fn start_section_rewrite() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x08, 0x01, 0x03]);
        let mut module = assert_byte_round_trip(&bytes);

        module.start_section_mut().unwrap().func_index = 0;
        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[0x08, 0x01, 0x00]);
        assert_eq!(module.encode(), expected);
    }

    #[test]
    fn custom_section() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x00, 0x06, 0x04, b'n', b'a', b'm', b'e', 0xaa, 0xbb]);
        let module = assert_byte_round_trip(&bytes);

        let custom = module.custom_sections(b"name").next().unwrap();
        assert_eq!(custom.data, vec![0xaa, 0xbb]);
    }

    #[test]
    fn unknown_opcode_in_code_section() {
        let mut bytes = HEADER.to_vec();
        // one body of size 3: no locals, opcode 0x06, end
        bytes.extend_from_slice(&[0x0a, 0x05, 0x01, 0x03, 0x00, 0x06, 0x0b]);
        assert_eq!(Module::decode(&bytes), Err(DecodeError::UnknownOpcode(0x06)));
    }

    // =======================================================================
    // Whole-module byte fixtures
    // =======================================================================

    #[test]
    fn module_with_function_and_export() {
        // (module (func (export "f") (result i32) i32.const 42))
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[
            0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7f, // type: () -> i32
            0x03, 0x02, 0x01, 0x00, // function: type 0
            0x07, 0x05, 0x01, 0x01, b'f', 0x00, 0x00, // export "f" func 0
            0x0a, 0x06, 0x01, 0x04, 0x00, 0x41, 0x2a, 0x0b, // code
        ]);
        let module = assert_byte_round_trip(&bytes);
        assert_eq!(module.sections.len(), 4);
    }

    #[test]
    fn module_with_memory_and_data() {
        // memory {1..2}, one active data segment "hi" at offset 8
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[
            0x05, 0x04, 0x01, 0x01, 0x01, 0x02, // memory section
            0x0b, 0x08, 0x01, 0x00, 0x41, 0x08, 0x0b, 0x02, b'h', b'i', // data section
        ]);
        assert_byte_round_trip(&bytes);
    }

    #[test]
    fn module_with_unknown_section_kind() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x2a, 0x03, 0xde, 0xad, 0xbe]);
        let module = assert_byte_round_trip(&bytes);
        let Section::Unknown(unknown) = &module.sections[0] else {
            panic!("expected unknown section");
        };
        assert_eq!(unknown.kind, 0x2a);
        assert_eq!(unknown.payload, vec![0xde, 0xad, 0xbe]);
    }

    // =======================================================================
    // Non-minimal LEB128 inputs
    // =======================================================================

    #[test]
    fn non_minimal_lebs_reencode_minimal() {
        // the same start section with padded size and index encodings
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x08, 0x83, 0x80, 0x00, 0x83, 0x80, 0x00]);
        let mut module = Module::decode(&bytes).unwrap();
        assert_eq!(module.start_section_mut().unwrap().func_index, 3);

        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[0x08, 0x01, 0x03]);
        assert_eq!(module.encode(), expected);
    }

    #[test]
    fn non_minimal_const_operand() {
        // global section: i32 const global, value 1 encoded in two bytes
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x06, 0x07, 0x01, 0x7f, 0x00, 0x41, 0x81, 0x00, 0x0b]);
        let module = Module::decode(&bytes).unwrap();

        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[0x06, 0x06, 0x01, 0x7f, 0x00, 0x41, 0x01, 0x0b]);
        assert_eq!(module.encode(), expected);
    }

    // =======================================================================
    // Constructed modules (value-level round trips)
    // =======================================================================

    /// A module exercising every section kind the codec knows.
    fn kitchen_sink_module() -> Module {
        let mut module = Module::new();
        module.sections = vec![
            Section::Type(TypeSection {
                types: vec![
                    TypeEntry::func(vec![0x7f, 0x7e], vec![0x7d]),
                    TypeEntry::func(vec![], vec![]),
                ],
            }),
            Section::Import(ImportSection {
                imports: vec![
                    Import {
                        module: b"env".to_vec(),
                        name: b"f".to_vec(),
                        desc: ImportDesc::Func { type_index: 1 },
                    },
                    Import {
                        module: b"env".to_vec(),
                        name: b"t".to_vec(),
                        desc: ImportDesc::Table {
                            ref_type: 0x70,
                            limits: Limits { flag: 1, min: 1, max: Some(8) },
                        },
                    },
                    Import {
                        module: b"env".to_vec(),
                        name: b"g".to_vec(),
                        desc: ImportDesc::Global { value_type: 0x7f, mutable: 1 },
                    },
                ],
            }),
            Section::Function(FunctionSection { type_indices: vec![0] }),
            Section::Table(TableSection {
                tables: vec![TableType {
                    ref_type: 0x70,
                    limits: Limits { flag: 0, min: 2, max: None },
                }],
            }),
            Section::Memory(MemorySection {
                memories: vec![Limits { flag: 1, min: 1, max: Some(16) }],
            }),
            Section::Global(GlobalSection {
                globals: vec![Global {
                    value_type: 0x7f,
                    mutable: 0,
                    init: i32_const_expr(-64),
                }],
            }),
            Section::Export(ExportSection {
                exports: vec![Export { name: b"run".to_vec(), kind: 0x00, index: 1 }],
            }),
            Section::Start(StartSection { func_index: 1 }),
            Section::Element(ElementSection {
                segments: vec![
                    ElementSegment::ActiveFuncs {
                        offset: i32_const_expr(0),
                        func_indices: vec![1],
                    },
                    ElementSegment::PassiveFuncs { ref_type: 0x00, func_indices: vec![1, 1] },
                ],
            }),
            Section::DataCount(DataCountSection { count: 2 }),
            Section::Code(CodeSection {
                bodies: vec![FunctionBody {
                    locals: vec![LocalEntry { count: 2, value_type: 0x7f }],
                    instructions: vec![
                        Instruction::new(0x20, vec![Immediate::U32(0)]), // local.get 0
                        Instruction::new(0x1a, vec![]),                  // drop
                        Instruction::new(0x41, vec![Immediate::I32(7)]), // i32.const 7
                        Instruction::new(0x21, vec![Immediate::U32(1)]), // local.set 1
                        Instruction::end(),
                    ],
                }],
            }),
            Section::Data(DataSection {
                segments: vec![
                    DataSegment::Active { offset: i32_const_expr(8), data: vec![1, 2, 3] },
                    DataSegment::Passive { data: vec![0xff] },
                ],
            }),
            Section::Tag(TagSection { tags: vec![Tag { attribute: 0, type_index: 1 }] }),
            Section::Custom(CustomSection { name: b"producers".to_vec(), data: vec![0x00] }),
            Section::Unknown(UnknownSection { kind: 0x30, payload: vec![9, 9, 9] }),
        ];
        module
    }

    #[test]
    fn kitchen_sink_value_round_trip() {
        let module = kitchen_sink_module();
        let bytes = assert_value_round_trip(&module);
        // and the emitted bytes are themselves a byte-level fixed point
        assert_byte_round_trip(&bytes);
    }

    #[test]
    fn element_segments_all_flags_value_round_trip() {
        let offset = i32_const_expr(0);
        let init = vec![vec![
            Instruction::new(0xd2, vec![Immediate::U32(0)]),
            Instruction::end(),
        ]];
        let mut module = Module::new();
        module.sections = vec![Section::Element(ElementSection {
            segments: vec![
                ElementSegment::ActiveFuncs { offset: offset.clone(), func_indices: vec![0] },
                ElementSegment::PassiveExprs { ref_type: 0x70, inits: init.clone() },
                ElementSegment::ActiveTableExprs {
                    table_index: 1,
                    offset: offset.clone(),
                    ref_type: 0x70,
                    inits: init.clone(),
                },
                ElementSegment::DeclarativeExprs { ref_type: 0x6f, inits: init.clone() },
                ElementSegment::ActiveFuncsAlt { offset: offset.clone(), func_indices: vec![0] },
                ElementSegment::PassiveFuncs { ref_type: 0x00, func_indices: vec![0, 1] },
                ElementSegment::ActiveTableFuncs {
                    table_index: 0,
                    offset,
                    ref_type: 0x00,
                    func_indices: vec![2],
                },
                ElementSegment::DeclarativeFuncs { ref_type: 0x00, func_indices: vec![3] },
            ],
        })];
        let bytes = assert_value_round_trip(&module);

        // flags 0 and 4 must re-emit their distinct flag bytes
        let reparsed = Module::decode(&bytes).unwrap();
        let Section::Element(elements) = &reparsed.sections[0] else { panic!() };
        let flags: Vec<u32> = elements.segments.iter().map(|s| s.flag()).collect();
        assert_eq!(flags, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn float_bit_patterns_survive() {
        // f32/f64 consts with NaN payloads and negative zero
        let mut module = Module::new();
        module.sections = vec![Section::Global(GlobalSection {
            globals: vec![
                Global {
                    value_type: 0x7d,
                    mutable: 0,
                    init: vec![
                        Instruction::new(0x43, vec![Immediate::F32(f32::from_bits(0x7fc0_0001))]),
                        Instruction::end(),
                    ],
                },
                Global {
                    value_type: 0x7c,
                    mutable: 0,
                    init: vec![
                        Instruction::new(0x44, vec![Immediate::F64(f64::from_bits(0x8000_0000_0000_0000))]),
                        Instruction::end(),
                    ],
                },
            ],
        })];
        let encoded = module.encode();
        let reparsed = Module::decode(&encoded).unwrap();
        let Section::Global(globals) = &reparsed.sections[0] else { panic!() };
        match &globals.globals[0].init[0].operands[0] {
            Immediate::F32(f) => assert_eq!(f.to_bits(), 0x7fc0_0001),
            other => panic!("expected f32 operand, got {other:?}"),
        }
        match &globals.globals[1].init[0].operands[0] {
            Immediate::F64(d) => assert_eq!(d.to_bits(), 0x8000_0000_0000_0000),
            other => panic!("expected f64 operand, got {other:?}"),
        }
    }

    // =======================================================================
    // Mutation invariance
    // =======================================================================

    #[test]
    fn mutations_survive_reencode() {
        let mut module = kitchen_sink_module();
        // sanity: starts stable
        assert_value_round_trip(&module);

        // grow a data payload past a size-prefix boundary (127 -> 200 bytes)
        for section in &mut module.sections {
            if let Section::Data(data) = section {
                let DataSegment::Active { data: bytes, .. } = &mut data.segments[0] else {
                    panic!()
                };
                *bytes = vec![0xab; 200];
            }
        }
        // rewrite an export name and index
        for section in &mut module.sections {
            if let Section::Export(exports) = section {
                exports.exports[0].name = b"renamed_entry_point".to_vec();
                exports.exports[0].index = 300;
            }
        }
        // rewrite a global initialiser to a wider constant
        for section in &mut module.sections {
            if let Section::Global(globals) = section {
                globals.globals[0].init = i32_const_expr(i32::MIN);
            }
        }

        let encoded = assert_value_round_trip(&module);
        let reparsed = Module::decode(&encoded).unwrap();
        assert_eq!(reparsed, module);
    }

    #[test]
    fn inserted_section_is_framed_correctly() {
        let mut module = Module::decode(&HEADER).unwrap();
        module.sections.push(Section::Custom(CustomSection {
            name: b"note".to_vec(),
            data: vec![0x01; 130], // forces a two-byte size prefix
        }));
        let encoded = assert_value_round_trip(&module);
        assert_eq!(encoded[8], 0x00); // custom section kind
        // size = name(1 + 4) + data(130) = 135, minimal two-byte vu32
        assert_eq!(&encoded[9..11], &[0x87, 0x01]);
    }
}
