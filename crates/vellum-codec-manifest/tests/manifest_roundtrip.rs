//! 清单整体编解码的契约测试
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：固定清单门面的三条核心契约——两种线格式的无损往返、二进制产物的
//!   逐字节规范性、以及完整性闸门在编码与解码两个方向的一致裁决。门面契约一旦回归，
//!   链上哈希与签名的根基即告失守，故本文件全部用例以"字节级断言 + 错误分类断言"书写。
//! - **整体架构位置 (Why)**：位于 `vellum-codec-manifest/tests`，只经公开门面驱动；
//!   二进制文法的字节细节以文档化的信封布局手工拼出，不触碰内部模块。
//! - **设计手法 (How)**：样例清单覆盖全部六个元素类别与嵌套描述符；破坏性用例在合法
//!   字节串上做最小扰动（截断、改魔数、改版本、复制指针），断言错误分类而非错误文本。
//!
//! # 合同与边界 (What)
//!
//! - 往返断言使用模型级相等（`PartialEq`），顺序与内容逐元素比较。
//! - 规范性断言要求同一清单两次编码的字节串逐一相同。
//! - 所有破坏性输入只允许产生 [`ManifestError`] 分支，任何 panic 都是缺陷。

use vellum_codec_manifest::{
    ClassDef, ConstantDef, Element, ElementBody, EventDef, IntWidth, Manifest, ManifestError,
    RoutineDef, RoutineMode, StateDef, StateMode, StructureDef, TypeDescriptor, TypeField,
    WireFormat, decode_manifest, decode_manifest_value, encode_manifest, validate_candidate,
};

/// 覆盖全部六个类别与嵌套描述符的代币清单样例。
fn token_manifest() -> Manifest {
    Manifest {
        elements: vec![
            Element {
                ptr: 0,
                deps: vec![],
                body: ElementBody::Structure(StructureDef {
                    name: String::from("Holding"),
                    fields: vec![
                        TypeField {
                            index: 0,
                            name: String::from("owner"),
                            ty: TypeDescriptor::Address,
                        },
                        TypeField {
                            index: 1,
                            name: String::from("amount"),
                            ty: TypeDescriptor::Uint(IntWidth::W128),
                        },
                    ],
                }),
            },
            Element {
                ptr: 1,
                deps: vec![0],
                body: ElementBody::Routine(RoutineDef {
                    name: String::from("Transfer"),
                    mode: RoutineMode::Mutate,
                    accepts: vec![
                        TypeField {
                            index: 0,
                            name: String::from("to"),
                            ty: TypeDescriptor::Address,
                        },
                        TypeField {
                            index: 1,
                            name: String::from("amount"),
                            ty: TypeDescriptor::Uint(IntWidth::W128),
                        },
                    ],
                    returns: vec![TypeField {
                        index: 0,
                        name: String::from("ok"),
                        ty: TypeDescriptor::Bool,
                    }],
                }),
            },
            Element {
                ptr: 2,
                deps: vec![],
                body: ElementBody::State(StateDef {
                    mode: StateMode::Persistent,
                    fields: vec![TypeField {
                        index: 0,
                        name: String::from("ledger"),
                        ty: "map[address]u128".parse().expect("文本可解析"),
                    }],
                }),
            },
            Element {
                ptr: 3,
                deps: vec![],
                body: ElementBody::Event(EventDef {
                    name: String::from("Transferred"),
                    topics: 2,
                    fields: vec![
                        TypeField {
                            index: 0,
                            name: String::from("from"),
                            ty: TypeDescriptor::Address,
                        },
                        TypeField {
                            index: 1,
                            name: String::from("amount"),
                            ty: TypeDescriptor::Uint(IntWidth::W64),
                        },
                    ],
                }),
            },
            Element {
                ptr: 4,
                deps: vec![],
                body: ElementBody::Constant(ConstantDef {
                    ty: TypeDescriptor::Text,
                    value: vec![0, 0, 0, 3, b'M', b'O', b'I'],
                }),
            },
            Element {
                ptr: 5,
                deps: vec![0],
                body: ElementBody::Class(ClassDef {
                    name: String::from("Token"),
                    fields: vec![TypeField {
                        index: 0,
                        name: String::from("meta"),
                        ty: "struct{symbol:string,decimals:u8}".parse().expect("文本可解析"),
                    }],
                }),
            },
        ],
    }
}

/// 二进制臂无损往返，元素顺序与内容逐一保持。
#[test]
fn binary_roundtrip_is_lossless() {
    let manifest = token_manifest();
    let bytes = encode_manifest(&manifest, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    let decoded = decode_manifest(&bytes, WireFormat::Binary).expect("解码成功");
    assert_eq!(decoded, manifest);
}

/// 同一清单重复编码，二进制字节逐一相同。
#[test]
fn binary_encoding_is_canonical() {
    let manifest = token_manifest();
    let first = encode_manifest(&manifest, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    let second = encode_manifest(&manifest, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    assert_eq!(first, second);

    // 解码再编码同样收敛到同一字节串。
    let decoded = decode_manifest(&first, WireFormat::Binary).expect("解码成功");
    let third = encode_manifest(&decoded, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    assert_eq!(first, third);
}

/// 镜像臂无损往返，且与二进制臂描述同一清单。
#[test]
fn json_mirror_agrees_with_binary() {
    let manifest = token_manifest();
    let mirror = encode_manifest(&manifest, WireFormat::Json).expect("镜像编码");
    let value = mirror.as_json().expect("镜像臂").clone();
    assert!(validate_candidate(&value));

    let from_mirror = decode_manifest_value(&value).expect("镜像解码");
    assert_eq!(from_mirror, manifest);

    // 经镜像走一圈后二进制产物不变。
    let direct = encode_manifest(&manifest, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    let via_mirror = encode_manifest(&from_mirror, WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    assert_eq!(direct, via_mirror);

    // 镜像文本字节同样可走门面解码。
    let text = encode_manifest(&manifest, WireFormat::Json)
        .expect("镜像编码")
        .into_bytes()
        .expect("镜像文本");
    assert_eq!(decode_manifest(&text, WireFormat::Json).expect("解码成功"), manifest);
}

/// 浅层校验器的接受/拒绝集合。
#[test]
fn shallow_validator_rejection_set() {
    assert!(validate_candidate(&serde_json::json!({ "elements": [] })));
    // 多余键不影响形状判定。
    assert!(validate_candidate(&serde_json::json!({ "elements": [], "extra": 1 })));

    for candidate in [
        serde_json::json!(null),
        serde_json::json!(42),
        serde_json::json!("manifest"),
        serde_json::json!([]),
        serde_json::json!({}),
        serde_json::json!({ "elements": "not-a-sequence" }),
        serde_json::json!({ "elements": { "ptr": 0 } }),
    ] {
        assert!(!validate_candidate(&candidate), "应拒绝：{candidate}");
    }
}

/// 魔数或版本不符走不识别格式分支，格式名拼写错误亦然。
#[test]
fn unsupported_envelopes_are_classified() {
    let mut bytes = encode_manifest(&token_manifest(), WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    bytes[0] = 0x00;
    assert!(matches!(
        decode_manifest(&bytes, WireFormat::Binary),
        Err(ManifestError::UnsupportedFormat { .. })
    ));

    let mut bytes = encode_manifest(&token_manifest(), WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    bytes[2] = 0x7f;
    assert!(matches!(
        decode_manifest(&bytes, WireFormat::Binary),
        Err(ManifestError::UnsupportedFormat { .. })
    ));

    assert!(matches!(
        "protobuf".parse::<WireFormat>(),
        Err(ManifestError::UnsupportedFormat { .. })
    ));
}

/// 任意前缀截断只产生结构化错误，绝不恐慌。
#[test]
fn truncation_sweep_never_panics() {
    let bytes = encode_manifest(&token_manifest(), WireFormat::Binary)
        .expect("编码成功")
        .into_bytes()
        .expect("二进制字节");
    for cut in 0..bytes.len() {
        let err = decode_manifest(&bytes[..cut], WireFormat::Binary).expect_err("截断必然失败");
        assert!(
            matches!(
                err,
                ManifestError::Truncated { .. }
                    | ManifestError::InvalidManifest { .. }
                    | ManifestError::UnsupportedFormat { .. }
            ),
            "前缀 {cut}：意外的错误分类 {err:?}"
        );
    }
}

/// 按文档化信封文法手工拼出指针重复的字节串，解码侧闸门拦下。
#[test]
fn duplicate_pointer_bytes_are_rejected() {
    // 常量元素：ptr + 空依赖表 + constant 标签 + bool 描述符 + 1 字节载荷。
    fn constant_element(ptr: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&ptr.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.push(0x05);
        bytes.push(0x01);
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.push(0x01);
        bytes
    }

    let mut wire = vec![0x4c, 0x55, 0x01];
    wire.extend_from_slice(&2u32.to_be_bytes());
    wire.extend_from_slice(&constant_element(7));
    wire.extend_from_slice(&constant_element(7));

    let err = decode_manifest(&wire, WireFormat::Binary).expect_err("指针重复");
    assert!(matches!(err, ManifestError::InvalidManifest { .. }));

    // 指针不同的同构字节串则通过，确认扰动只差在指针上。
    let mut wire = vec![0x4c, 0x55, 0x01];
    wire.extend_from_slice(&2u32.to_be_bytes());
    wire.extend_from_slice(&constant_element(7));
    wire.extend_from_slice(&constant_element(8));
    let manifest = decode_manifest(&wire, WireFormat::Binary).expect("解码成功");
    assert_eq!(manifest.elements.len(), 2);
}

/// 字段名混入类型文本分隔符时两臂一致拒绝，镜像臂不得解出另一份清单。
#[test]
fn separator_field_names_never_mutate_through_the_mirror() {
    let mut manifest = token_manifest();
    if let ElementBody::Structure(def) = &mut manifest.elements[0].body {
        def.fields[0].name = String::from("a:u64,b");
    }
    for format in [WireFormat::Binary, WireFormat::Json] {
        let err = encode_manifest(&manifest, format).expect_err("分隔符字段名");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }
}

/// 空清单在两个臂上都是合法且自洽的。
#[test]
fn empty_manifest_roundtrips_on_both_arms() {
    let manifest = Manifest::default();
    for format in [WireFormat::Binary, WireFormat::Json] {
        let bytes = encode_manifest(&manifest, format)
            .expect("编码成功")
            .into_bytes()
            .expect("字节");
        assert_eq!(decode_manifest(&bytes, format).expect("解码成功"), manifest);
    }
}
