//! 清单编解码的错误分类。
//!
//! # 教案定位（Why）
//! - 清单编解码横跨格式分发、字节解码、类型裁决与引用解析四个阶段，每个阶段的失败都要能被调用方结构化区分，
//!   回归测试才可以断言"错在哪一类"而非仅仅"失败了"。
//! - 与各编解码模块解耦：错误枚举不持有任何编解码状态，仅携带定位用的数量与文本。
//!
//! # 使用契约（What）
//! - 所有分支均表示"本次操作的输出不可用"，调用方不得继续消费半成品结果。
//! - 下层错误统一经 `From` 升格：字节层截断升为 [`ManifestError::Truncated`]，标识符构造失败升为
//!   [`ManifestError::Identifier`]，类型文本解析失败折叠进 [`ManifestError::InvalidManifest`]。
//!
//! # 设计考量（How）
//! - 枚举存储整型、`String` 与子错误，`no_std + alloc` 下可直接使用；`Display` 输出中文诊断。

use alloc::string::String;
use core::fmt;

use vellum_core::WireError;
use vellum_identifiers::IdentifierError;

use crate::typedesc::TypeParseError;

/// 清单编解码过程中可能出现的错误。
///
/// ## 教案解读（Why）
/// - 分类对齐各编解码阶段：结构不合法、格式不识别、类型不匹配、参数个数不符、载荷截断、引用悬空、嵌套超限、标识符非法。
/// - 分支携带的字段足以在不回看输入的情况下写出诊断日志。
///
/// ## 契约定义（What）
/// - `InvalidManifest` 覆盖一切"清单结构本身不合法"的情形：形状校验失败、未知标签、字段序号缺陷、尾部残留字节、
///   常量载荷与声明类型不符等，`reason` 给出具体成因。
/// - `TypeMismatch` 仅用于"值与类型描述符冲突"，清单结构问题不落入此分支。
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestError {
    /// 清单结构不合法。
    InvalidManifest {
        /// 具体成因描述。
        reason: String,
    },
    /// 线格式不被识别：未知格式名，或二进制信封的魔数/版本不符。
    UnsupportedFormat {
        /// 实际读到的格式名或信封字节描述。
        found: String,
    },
    /// 值的形态与类型描述符声明冲突。
    TypeMismatch {
        /// 描述符期望的形态。
        expected: String,
        /// 实际遇到的形态。
        found: String,
    },
    /// 参数个数与字段个数不一致。
    ArityMismatch {
        /// 字段列表声明的个数。
        expected: usize,
        /// 实际提供的参数个数。
        actual: usize,
    },
    /// 载荷在解码中途耗尽。
    Truncated {
        /// 本次读取需要的字节数。
        needed: usize,
        /// 剩余的字节数。
        remaining: usize,
    },
    /// 引用指向缺失的元素，或指向不具备字段列表形状的元素。
    UnresolvedReference {
        /// 引用携带的元素指针。
        ptr: u32,
    },
    /// 嵌套深度超过防护上限。
    DepthLimitExceeded {
        /// 防护上限值。
        limit: usize,
    },
    /// `address` 载荷未通过标识符校验。
    Identifier(IdentifierError),
}

impl fmt::Display for ManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidManifest { reason } => {
                write!(f, "清单结构不合法：{reason}")
            }
            Self::UnsupportedFormat { found } => {
                write!(f, "不支持的线格式：{found}")
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "类型不匹配：期望 {expected}，实际 {found}")
            }
            Self::ArityMismatch { expected, actual } => {
                write!(f, "参数个数不符：字段声明 {expected} 个，实际提供 {actual} 个")
            }
            Self::Truncated { needed, remaining } => {
                write!(f, "载荷被截断：需要 {needed} 字节，仅剩 {remaining} 字节")
            }
            Self::UnresolvedReference { ptr } => {
                write!(f, "引用无法解析：指针 {ptr} 缺失或不指向结构形状元素")
            }
            Self::DepthLimitExceeded { limit } => {
                write!(f, "嵌套深度超过上限 {limit}")
            }
            Self::Identifier(source) => {
                write!(f, "标识符校验失败：{source}")
            }
        }
    }
}

impl From<WireError> for ManifestError {
    fn from(source: WireError) -> Self {
        match source {
            WireError::Truncated { needed, remaining } => Self::Truncated { needed, remaining },
            WireError::LengthOverflow { len } => Self::InvalidManifest {
                reason: alloc::format!("载荷长度 {len} 超出 u32 前缀的表达范围"),
            },
        }
    }
}

impl From<IdentifierError> for ManifestError {
    fn from(source: IdentifierError) -> Self {
        Self::Identifier(source)
    }
}

impl From<TypeParseError> for ManifestError {
    fn from(source: TypeParseError) -> Self {
        Self::InvalidManifest {
            reason: alloc::format!("类型文本解析失败：{source}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ManifestError {}
