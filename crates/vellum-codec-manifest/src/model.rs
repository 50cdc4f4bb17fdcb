//! 清单对象模型：元素序列与各类别的载荷结构。
//!
//! # 教案定位（Why）
//! - 编解码的两端都以本模块的结构为锚点：二进制臂按标签写出各字段，结构化镜像直接由 serde 派生成形，
//!   两条路径共享同一事实模型，不存在"镜像专用"的影子结构。
//! - 元素类别用显式枚举承载，新增类别时编译器会指出二进制臂、镜像臂与注册表的全部分发点。
//!
//! # 契约说明（What）
//! - [`Manifest`] 持有有序元素序列，顺序在任何编解码往返中逐元素保持。
//! - [`Element`] 的 `ptr` 是元素在清单内的唯一键；`deps` 为依赖指针表，镜像中为空即省略。
//! - 结构化镜像中元素类别以 `kind` 小写标签 + `data` 载荷的相邻标签形态出现。
//!
//! # 设计考量（How）
//! - 模型全部为纯数据：`Debug`/`Clone`/`PartialEq`/`Eq` 派生，无内部可变性，跨线程只读共享天然安全。
//! - 常量载荷以"已按声明类型编码的字节"存储，镜像中以 `0x` 十六进制示人；载荷与声明的一致性由编解码边界校验。

use alloc::{string::String, vec::Vec};
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::typedesc::{TypeDescriptor, TypeField};

/// 逻辑单元清单：有序的元素序列。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// 元素序列，顺序即线上的编码顺序。
    pub elements: Vec<Element>,
}

impl Manifest {
    /// 线性查找指针对应的元素；批量查找请改用注册表。
    #[must_use]
    pub fn element(&self, ptr: u32) -> Option<&Element> {
        self.elements.iter().find(|element| element.ptr == ptr)
    }
}

/// 清单中的单个元素：指针、依赖表与类别载荷。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// 元素在清单内的唯一键。
    pub ptr: u32,
    /// 依赖的元素指针表；为空时不出现在镜像中。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<u32>,
    /// 类别载荷。
    #[serde(flatten)]
    pub body: ElementBody,
}

impl Element {
    /// 返回元素类别标签。
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.body.kind()
    }
}

/// 元素类别载荷的标签联合。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum ElementBody {
    /// 可调用例程。
    Routine(RoutineDef),
    /// 状态字段声明。
    State(StateDef),
    /// 事件声明。
    Event(EventDef),
    /// 具名结构类型。
    Structure(StructureDef),
    /// 编码后的常量载荷。
    Constant(ConstantDef),
    /// 类定义。
    Class(ClassDef),
}

impl ElementBody {
    /// 返回载荷对应的类别标签。
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Routine(_) => ElementKind::Routine,
            Self::State(_) => ElementKind::State,
            Self::Event(_) => ElementKind::Event,
            Self::Structure(_) => ElementKind::Structure,
            Self::Constant(_) => ElementKind::Constant,
            Self::Class(_) => ElementKind::Class,
        }
    }

    /// 元素若具备字段列表形状（结构或类），返回其字段列表。
    #[must_use]
    pub fn shape_fields(&self) -> Option<&[TypeField]> {
        match self {
            Self::Structure(def) => Some(&def.fields),
            Self::Class(def) => Some(&def.fields),
            _ => None,
        }
    }
}

/// 元素类别标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// 可调用例程。
    Routine,
    /// 状态字段声明。
    State,
    /// 事件声明。
    Event,
    /// 具名结构类型。
    Structure,
    /// 编码后的常量载荷。
    Constant,
    /// 类定义。
    Class,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Routine => "routine",
            Self::State => "state",
            Self::Event => "event",
            Self::Structure => "structure",
            Self::Constant => "constant",
            Self::Class => "class",
        };
        f.write_str(name)
    }
}

/// 例程的执行类别：只读调用或状态变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineMode {
    /// 只读调用，不改动链上状态。
    Call,
    /// 状态变更调用。
    Mutate,
}

/// 状态字段的存续类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMode {
    /// 持久状态，跨调用存续。
    Persistent,
    /// 暂态状态，调用结束即丢弃。
    Ephemeral,
}

/// 例程定义：名称、执行类别与出入参字段表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineDef {
    /// 例程名称。
    pub name: String,
    /// 执行类别。
    pub mode: RoutineMode,
    /// 入参字段表。
    pub accepts: Vec<TypeField>,
    /// 出参字段表。
    pub returns: Vec<TypeField>,
}

/// 状态声明：存续类别与字段表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDef {
    /// 存续类别。
    pub mode: StateMode,
    /// 状态字段表。
    pub fields: Vec<TypeField>,
}

/// 事件声明：名称、主题数与字段表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDef {
    /// 事件名称。
    pub name: String,
    /// 可索引主题数。
    pub topics: u32,
    /// 事件字段表。
    pub fields: Vec<TypeField>,
}

/// 具名结构类型定义。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDef {
    /// 结构名称。
    pub name: String,
    /// 字段表。
    pub fields: Vec<TypeField>,
}

/// 常量定义：声明类型与按该类型编码的载荷字节。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDef {
    /// 载荷的声明类型。
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// 按声明类型编码的载荷；镜像形态为 `0x` 十六进制文本。
    #[serde(with = "hex_blob")]
    pub value: Vec<u8>,
}

/// 类定义：名称与字段表。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// 类名称。
    pub name: String,
    /// 字段表。
    pub fields: Vec<TypeField>,
}

/// 字节载荷与 `0x` 十六进制文本之间的 serde 适配。
mod hex_blob {
    use alloc::{string::String, vec::Vec};

    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&vellum_core::hex::encode_prefixed(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        vellum_core::hex::decode_flexible(&text).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedesc::IntWidth;
    use alloc::vec;

    fn transfer_routine() -> Element {
        Element {
            ptr: 0,
            deps: vec![],
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
                returns: vec![],
            }),
        }
    }

    #[test]
    fn mirror_uses_adjacent_kind_and_data() {
        let json = serde_json::to_value(transfer_routine()).expect("镜像序列化");
        assert_eq!(json["kind"], "routine");
        assert_eq!(json["data"]["name"], "Transfer");
        assert_eq!(json["data"]["mode"], "mutate");
        assert_eq!(json["data"]["accepts"][1]["type"], "u128");
        // 空依赖表不出现在镜像中。
        assert!(json.get("deps").is_none());
    }

    #[test]
    fn mirror_roundtrips_the_model() {
        let manifest = Manifest {
            elements: vec![
                transfer_routine(),
                Element {
                    ptr: 1,
                    deps: vec![0],
                    body: ElementBody::Constant(ConstantDef {
                        ty: TypeDescriptor::Uint(IntWidth::W64),
                        value: vec![0, 0, 0, 0, 5, 245, 225, 0],
                    }),
                },
            ],
        };
        let json = serde_json::to_value(&manifest).expect("镜像序列化");
        assert_eq!(json["elements"][1]["data"]["value"], "0x0000000005f5e100");
        assert_eq!(json["elements"][1]["deps"][0], 0);
        let back: Manifest = serde_json::from_value(json).expect("镜像反序列化");
        assert_eq!(back, manifest);
    }

    #[test]
    fn unknown_kind_tags_fail_to_deserialize() {
        let json = serde_json::json!({
            "ptr": 0,
            "kind": "typedef",
            "data": { "name": "x", "fields": [] }
        });
        assert!(serde_json::from_value::<Element>(json).is_err());
    }
}
