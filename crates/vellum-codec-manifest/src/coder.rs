//! 清单编解码门面：格式分发与完整性闸门。
//!
//! # 教案定位（Why）
//! - 两个线格式臂共用同一入口与同一完整性闸门：无论走哪条臂、哪个方向，放行的清单满足同一组不变式，
//!   下游不需要关心清单是从哪条路进来的。
//! - 闸门在编码侧同样生效："编码"不是"洗白"，结构不合法的清单不会因为先编码再解码而变合法。
//!
//! # 契约说明（What）
//! - [`encode_manifest`] 先过 [`check_integrity`] 再按格式编码；[`decode_manifest`] 与
//!   [`decode_manifest_value`] 先按格式解码再过同一闸门。
//! - 闸门校验：元素指针全清单唯一；每份字段列表（含描述符内嵌的结构字段）满足序号与
//!   字段名不变式；每个常量的载荷必须能按声明类型完整解码且不留尾部字节。
//!
//! # 设计考量（How）
//! - [`WirePayload`] 以标签联合承载两种产物，调用方拿到的要么是字节串要么是 JSON 值，
//!   不存在"字节串里是哪种格式"的猜测环节。

use alloc::{format, string::ToString, vec::Vec};
use core::fmt;
use core::str::FromStr;

use serde_json::Value as JsonValue;
use vellum_core::WireReader;

use crate::error::ManifestError;
use crate::field::{FieldCodec, sorted_field_order};
use crate::model::{ElementBody, Manifest};
use crate::typedesc::{MAX_NESTING_DEPTH, TypeDescriptor, TypeField};
use crate::{binary, json};

/// 清单的线格式选择。
///
/// ### 契约描述（What）
/// - 文本名与枚举一一对应：`binary` / `json`；未知名字报 [`ManifestError::UnsupportedFormat`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// 带版本信封的二进制形态，规范传输格式。
    Binary,
    /// 结构化 JSON 镜像，人读与工具链交换格式。
    Json,
}

impl WireFormat {
    /// 返回格式的规范文本名。
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WireFormat {
    type Err = ManifestError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "binary" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            other => Err(ManifestError::UnsupportedFormat {
                found: other.to_string(),
            }),
        }
    }
}

/// 编码产物：按格式分臂的标签联合。
#[derive(Debug, Clone, PartialEq)]
pub enum WirePayload {
    /// 二进制信封字节串。
    Binary(Vec<u8>),
    /// 结构化镜像值。
    Json(JsonValue),
}

impl WirePayload {
    /// 返回产物对应的格式。
    #[must_use]
    pub const fn format(&self) -> WireFormat {
        match self {
            Self::Binary(_) => WireFormat::Binary,
            Self::Json(_) => WireFormat::Json,
        }
    }

    /// 产物若为二进制臂，借出字节串。
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            Self::Json(_) => None,
        }
    }

    /// 产物若为镜像臂，借出 JSON 值。
    #[must_use]
    pub const fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Binary(_) => None,
            Self::Json(value) => Some(value),
        }
    }

    /// 将产物收敛为传输字节：二进制臂原样返回，镜像臂序列化为 JSON 文本字节。
    pub fn into_bytes(self) -> Result<Vec<u8>, ManifestError> {
        match self {
            Self::Binary(bytes) => Ok(bytes),
            Self::Json(value) => {
                serde_json::to_vec(&value).map_err(|err| ManifestError::InvalidManifest {
                    reason: format!("镜像文本序列化失败：{err}"),
                })
            }
        }
    }
}

/// 将清单按指定格式编码；编码前先过完整性闸门。
pub fn encode_manifest(
    manifest: &Manifest,
    format: WireFormat,
) -> Result<WirePayload, ManifestError> {
    check_integrity(manifest)?;
    match format {
        WireFormat::Binary => Ok(WirePayload::Binary(binary::encode(manifest)?)),
        WireFormat::Json => Ok(WirePayload::Json(json::encode(manifest)?)),
    }
}

/// 将字节串按指定格式解码为清单；解码后过同一完整性闸门。
pub fn decode_manifest(bytes: &[u8], format: WireFormat) -> Result<Manifest, ManifestError> {
    let manifest = match format {
        WireFormat::Binary => binary::decode(bytes)?,
        WireFormat::Json => json::decode_bytes(bytes)?,
    };
    check_integrity(&manifest)?;
    Ok(manifest)
}

/// 将已解析的镜像值解码为清单；解码后过同一完整性闸门。
pub fn decode_manifest_value(json: &JsonValue) -> Result<Manifest, ManifestError> {
    let manifest = json::decode_value(json)?;
    check_integrity(&manifest)?;
    Ok(manifest)
}

/// 清单的深层完整性闸门。
///
/// ### 设计意图（Why）
/// - 编码与解码两个方向共用此闸门，任何方向放行的清单满足同一组不变式。
///
/// ### 契约定义（What）
/// - 元素指针在全清单内唯一，重复即 [`ManifestError::InvalidManifest`]。
/// - 每份字段列表（例程出入参、状态/事件/结构/类字段，以及描述符内嵌的结构字段）满足
///   序号唯一连续与字段名合法唯一的不变式。
/// - 每个常量的载荷必须能按其声明类型完整解码且不留尾部字节；解码失败的成因折叠进
///   `reason` 文本。
pub fn check_integrity(manifest: &Manifest) -> Result<(), ManifestError> {
    let mut seen = alloc::collections::BTreeSet::new();
    for element in &manifest.elements {
        if !seen.insert(element.ptr) {
            return Err(ManifestError::InvalidManifest {
                reason: format!("元素指针 {} 重复出现", element.ptr),
            });
        }
    }
    for element in &manifest.elements {
        check_element_fields(&element.body).map_err(|err| ManifestError::InvalidManifest {
            reason: format!("指针 {} 的字段声明不合法：{err}", element.ptr),
        })?;
    }
    let codec = FieldCodec::new(manifest);
    for element in &manifest.elements {
        if let ElementBody::Constant(def) = &element.body {
            let mut reader = WireReader::new(&def.value);
            codec
                .decode_value(&def.ty, &mut reader)
                .map_err(|err| ManifestError::InvalidManifest {
                    reason: format!("指针 {} 的常量载荷与声明类型不符：{err}", element.ptr),
                })?;
            if !reader.is_empty() {
                return Err(ManifestError::InvalidManifest {
                    reason: format!(
                        "指针 {} 的常量载荷尾部残留 {} 字节",
                        element.ptr,
                        reader.remaining()
                    ),
                });
            }
        }
    }
    Ok(())
}

/// 对单个元素体的全部字段列表执行不变式检查。
fn check_element_fields(body: &ElementBody) -> Result<(), ManifestError> {
    match body {
        ElementBody::Routine(def) => {
            check_field_list(&def.accepts, 0)?;
            check_field_list(&def.returns, 0)
        }
        ElementBody::State(def) => check_field_list(&def.fields, 0),
        ElementBody::Event(def) => check_field_list(&def.fields, 0),
        ElementBody::Structure(def) => check_field_list(&def.fields, 0),
        ElementBody::Class(def) => check_field_list(&def.fields, 0),
        ElementBody::Constant(def) => check_descriptor(&def.ty, 0),
    }
}

fn check_field_list(fields: &[TypeField], depth: usize) -> Result<(), ManifestError> {
    sorted_field_order(fields)?;
    for field in fields {
        check_descriptor(&field.ty, depth)?;
    }
    Ok(())
}

fn check_descriptor(ty: &TypeDescriptor, depth: usize) -> Result<(), ManifestError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(ManifestError::DepthLimitExceeded {
            limit: MAX_NESTING_DEPTH,
        });
    }
    match ty {
        TypeDescriptor::Array(element) => check_descriptor(element, depth + 1),
        TypeDescriptor::Map { key, value } => {
            check_descriptor(key, depth + 1)?;
            check_descriptor(value, depth + 1)
        }
        TypeDescriptor::Struct(fields) => check_field_list(fields, depth + 1),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstantDef, Element, StructureDef};
    use crate::typedesc::{IntWidth, TypeDescriptor, TypeField};
    use alloc::{string::String, vec};

    fn token_manifest() -> Manifest {
        Manifest {
            elements: vec![
                Element {
                    ptr: 0,
                    deps: vec![],
                    body: ElementBody::Structure(StructureDef {
                        name: String::from("Meta"),
                        fields: vec![TypeField {
                            index: 0,
                            name: String::from("symbol"),
                            ty: TypeDescriptor::Text,
                        }],
                    }),
                },
                Element {
                    ptr: 1,
                    deps: vec![],
                    body: ElementBody::Constant(ConstantDef {
                        ty: TypeDescriptor::Uint(IntWidth::W64),
                        value: vec![0, 0, 0, 0, 5, 245, 225, 0],
                    }),
                },
            ],
        }
    }

    #[test]
    fn format_names_roundtrip() {
        for format in [WireFormat::Binary, WireFormat::Json] {
            assert_eq!(format.name().parse::<WireFormat>().expect("可解析"), format);
        }
        assert!(matches!(
            "xml".parse::<WireFormat>(),
            Err(ManifestError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn both_arms_roundtrip_through_the_facade() {
        let manifest = token_manifest();

        let payload = encode_manifest(&manifest, WireFormat::Binary).expect("二进制编码");
        assert_eq!(payload.format(), WireFormat::Binary);
        let bytes = payload.as_binary().expect("二进制臂").to_vec();
        assert_eq!(decode_manifest(&bytes, WireFormat::Binary).expect("解码"), manifest);

        let payload = encode_manifest(&manifest, WireFormat::Json).expect("镜像编码");
        assert_eq!(payload.format(), WireFormat::Json);
        let value = payload.as_json().expect("镜像臂").clone();
        assert_eq!(decode_manifest_value(&value).expect("解码"), manifest);

        let text = WirePayload::Json(value).into_bytes().expect("镜像文本");
        assert_eq!(decode_manifest(&text, WireFormat::Json).expect("解码"), manifest);
    }

    #[test]
    fn duplicate_pointers_fail_both_directions() {
        let mut manifest = token_manifest();
        manifest.elements[1].ptr = 0;

        let err = encode_manifest(&manifest, WireFormat::Binary).expect_err("编码侧闸门");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));

        // 绕过门面手工造出重复指针的字节串，解码侧闸门同样拦下。
        let bytes = binary::encode(&manifest).expect("裸编码");
        let err = decode_manifest(&bytes, WireFormat::Binary).expect_err("解码侧闸门");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    #[test]
    fn constant_payloads_must_match_their_type() {
        let mut manifest = token_manifest();
        // u64 常量只给 7 字节。
        if let ElementBody::Constant(def) = &mut manifest.elements[1].body {
            def.value.pop();
        }
        let err = encode_manifest(&manifest, WireFormat::Binary).expect_err("载荷截断");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));

        // 载荷过长同样拒绝。
        let mut manifest = token_manifest();
        if let ElementBody::Constant(def) = &mut manifest.elements[1].body {
            def.value.push(0xff);
        }
        let err = encode_manifest(&manifest, WireFormat::Json).expect_err("载荷残留");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    /// 分隔符字段名会让镜像臂的类型文本失去单义性，闸门在编码前拦下。
    #[test]
    fn separator_field_names_fail_the_gate() {
        let mut manifest = token_manifest();
        if let ElementBody::Structure(def) = &mut manifest.elements[0].body {
            def.fields[0].name = String::from("a:u64,b");
        }
        for format in [WireFormat::Binary, WireFormat::Json] {
            let err = encode_manifest(&manifest, format).expect_err("字段名含分隔符");
            assert!(matches!(err, ManifestError::InvalidManifest { .. }));
        }
    }

    /// 重复字段名在闸门处整体拒绝，包括描述符内嵌的结构字段。
    #[test]
    fn duplicate_field_names_fail_the_gate() {
        let mut manifest = token_manifest();
        if let ElementBody::Structure(def) = &mut manifest.elements[0].body {
            def.fields.push(TypeField {
                index: 1,
                name: String::from("symbol"),
                ty: TypeDescriptor::Text,
            });
        }
        let err = encode_manifest(&manifest, WireFormat::Binary).expect_err("顶层字段重名");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));

        let mut manifest = token_manifest();
        if let ElementBody::Structure(def) = &mut manifest.elements[0].body {
            def.fields[0].ty = "struct{a:u64,a:u64}"
                .parse()
                .expect("解析本身不裁决重名");
        }
        let err = encode_manifest(&manifest, WireFormat::Json).expect_err("内嵌字段重名");
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
    }

    #[test]
    fn arms_reject_each_others_bytes() {
        let manifest = token_manifest();
        let binary_bytes = encode_manifest(&manifest, WireFormat::Binary)
            .expect("二进制编码")
            .into_bytes()
            .expect("字节");
        let json_bytes = encode_manifest(&manifest, WireFormat::Json)
            .expect("镜像编码")
            .into_bytes()
            .expect("字节");

        // JSON 文本交给二进制臂：`{` 不是魔数。
        assert!(matches!(
            decode_manifest(&json_bytes, WireFormat::Binary),
            Err(ManifestError::UnsupportedFormat { .. })
        ));
        // 二进制信封交给镜像臂：不是合法 JSON。
        assert!(matches!(
            decode_manifest(&binary_bytes, WireFormat::Json),
            Err(ManifestError::InvalidManifest { .. })
        ));
    }
}
