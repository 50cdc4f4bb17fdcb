//! 运行期值模型：字段编解码的输入与产物。
//!
//! # 教案定位（Why）
//! - 调用数据与常量载荷在内存中的通用承载形态；与类型描述符配对后才能上线编码，本模块自身不含任何字节逻辑。
//!
//! # 契约说明（What）
//! - 整数统一以 `u128`/`i128` 承载，实际宽度由配对的描述符裁决；映射条目保持写入顺序，解码后不重排。
//! - 结构值以 `(字段名, 值)` 对承载，编码时按字段序号重排，值内的对顺序不影响线上的字节。

use alloc::{string::String, vec::Vec};

use vellum_identifiers::ParticipantId;

/// 与类型描述符配对使用的运行期值。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// 布尔值。
    Bool(bool),
    /// 无符号整数，宽度由描述符裁决。
    Uint(u128),
    /// 有符号整数，宽度由描述符裁决。
    Int(i128),
    /// UTF-8 字符串。
    Text(String),
    /// 原始字节串。
    Bytes(Vec<u8>),
    /// 参与者标识符。
    Address(ParticipantId),
    /// 数组，元素与描述符的元素类型逐个配对。
    Array(Vec<Value>),
    /// 映射，条目保持写入顺序。
    Map(Vec<(Value, Value)>),
    /// 结构值：`(字段名, 值)` 对。
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// 由任意可转为 `String` 的文本构造字符串值。
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// 返回值形态的诊断名称，用于类型不匹配报错。
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool 值",
            Self::Uint(_) => "无符号整数值",
            Self::Int(_) => "有符号整数值",
            Self::Text(_) => "字符串值",
            Self::Bytes(_) => "字节串值",
            Self::Address(_) => "标识符值",
            Self::Array(_) => "数组值",
            Self::Map(_) => "映射值",
            Self::Struct(_) => "结构值",
        }
    }
}
