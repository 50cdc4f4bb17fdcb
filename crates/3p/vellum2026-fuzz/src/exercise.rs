//! Fuzz 执行入口：每个入口接收任意字节并在内部完成差分断言。
//!
//! - **Why**：清单与调用数据的解码是严格的——任何被接受的字节串都只有唯一的规范形态。
//!   这把"解码后再编码必须逐字节还原输入"变成可机检的定点律，远比"不崩溃"更强。
//! - **How**：解码失败即返回（失败是 fuzzer 的常态输入）；解码成功则回编并断言定点，
//!   标识符入口另断言构造器与探针、字节形态与文本形态的口径一致。
//! - **What**：入口均为纯函数，无全局状态，可在 fuzz target 与语料回归测试间共享。

use vellum_codec_manifest::{
    Element, ElementBody, IntWidth, Manifest, StructureDef, TypeDescriptor, TypeField, WireFormat,
    decode_arguments, decode_manifest, encode_arguments, encode_manifest,
};
use vellum_identifiers::{ParticipantId, is_valid_address};

/// 清单二进制解码的定点律：接受的字节串回编后逐字节还原。
pub fn run_manifest_decode(data: &[u8]) {
    if let Ok(manifest) = decode_manifest(data, WireFormat::Binary) {
        let bytes = encode_manifest(&manifest, WireFormat::Binary)
            .expect("已过闸门的清单必可编码")
            .into_bytes()
            .expect("二进制臂");
        assert_eq!(bytes, data, "严格解码接受的字节串必须是规范编码");
        let again = decode_manifest(&bytes, WireFormat::Binary).expect("规范产物必可解码");
        assert_eq!(again, manifest);
    }
    // 镜像臂只做健壮性检查：任意字节不得引发 panic。
    let _ = decode_manifest(data, WireFormat::Json);
}

/// 调用数据的字段表样本：首字节选表，覆盖标量、序列、映射与引用。
fn sample_fields(selector: u8) -> Vec<TypeField> {
    match selector % 4 {
        0 => vec![
            TypeField {
                index: 0,
                name: String::from("symbol"),
                ty: TypeDescriptor::Text,
            },
            TypeField {
                index: 1,
                name: String::from("supply"),
                ty: TypeDescriptor::Uint(IntWidth::W64),
            },
        ],
        1 => vec![
            TypeField {
                index: 0,
                name: String::from("flags"),
                ty: TypeDescriptor::Array(Box::new(TypeDescriptor::Bool)),
            },
            TypeField {
                index: 1,
                name: String::from("owner"),
                ty: TypeDescriptor::Address,
            },
        ],
        2 => vec![TypeField {
            index: 0,
            name: String::from("weights"),
            ty: TypeDescriptor::Map {
                key: Box::new(TypeDescriptor::Text),
                value: Box::new(TypeDescriptor::Uint(IntWidth::W8)),
            },
        }],
        _ => vec![TypeField {
            index: 0,
            name: String::from("holding"),
            ty: TypeDescriptor::Reference(0),
        }],
    }
}

/// 引用样本所需的元素仓：ptr 0 处放一枚结构元素。
fn arena_manifest() -> Manifest {
    Manifest {
        elements: vec![Element {
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
                        ty: TypeDescriptor::Uint(IntWidth::W64),
                    },
                ],
            }),
        }],
    }
}

/// 调用数据解码的定点律：首字节选字段表，余下字节作载荷。
pub fn run_calldata_decode(data: &[u8]) {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let fields = sample_fields(selector);
    let manifest = arena_manifest();
    if let Ok(values) = decode_arguments(&manifest, &fields, payload) {
        let encoded =
            encode_arguments(&manifest, &fields, &values).expect("解码产物必可回编");
        assert_eq!(encoded, payload, "严格解码接受的载荷必须是规范编码");
    }
}

/// 标识符解析：构造器与探针口径一致，字节形态与文本形态互相印证。
pub fn run_identifier_parse(data: &[u8]) {
    match ParticipantId::from_slice(data) {
        Ok(id) => {
            assert!(ParticipantId::validate(data).is_none(), "构造成功则探针必静默");
            assert_eq!(id.as_bytes().as_slice(), data);
            // 文本往返：规范文本必可解析回同一标识符。
            let text = id.to_hex();
            assert!(is_valid_address(&text));
            assert_eq!(text.parse::<ParticipantId>().expect("规范文本必可解析"), id);
        }
        Err(err) => {
            assert_eq!(ParticipantId::validate(data), Some(err), "探针与构造器同错");
        }
    }

    if let Ok(text) = core::str::from_utf8(data) {
        match ParticipantId::from_hex(text) {
            Ok(id) => {
                assert!(ParticipantId::validate_hex(text).is_none());
                assert_eq!(ParticipantId::from_bytes(*id.as_bytes()).expect("字节必合法"), id);
            }
            Err(err) => {
                assert_eq!(ParticipantId::validate_hex(text), Some(err));
            }
        }
    }
}
