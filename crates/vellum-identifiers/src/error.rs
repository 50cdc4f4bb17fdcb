//! 标识符构造与校验的错误类型。
//!
//! # 教案定位（Why）
//! - 构造失败的三种原因（长度、文本、区位）各自携带定位信息，调用方与测试可以精确断言失败分支。
//! - 与 `participant` 模块解耦，探针式校验直接复用同一枚举作为返回值。
//!
//! # 设计考量（How）
//! - 枚举仅存储整型与 `hex` crate 的解码错误，`no_std` 下可直接使用。
//! - `Display` 输出中文诊断信息；`std` 开启时接入 `std::error::Error` 体系。

use core::fmt;

use hex::FromHexError;

/// 参与者标识符无法按请求构造时的错误。
///
/// ## 契约定义（What）
/// - 每个分支都表示"输入不可能对应任何合法标识符"，调用方不得继续使用输入。
/// - 分支实现 `Clone`/`PartialEq`，测试可对具体错误做结构化断言。
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierError {
    /// 输入长度不是固定的 32 字节。
    InvalidLength {
        /// 布局要求的字节数。
        expected: usize,
        /// 实际收到的字节数。
        actual: usize,
    },
    /// 十六进制文本无法解码为字节。
    InvalidHex(FromHexError),
    /// 元数据字节的高 nibble 超出 0..=3 的网络区范围。
    InvalidNetworkZone {
        /// 实际读到的 nibble 值。
        value: u8,
    },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength { expected, actual } => {
                write!(f, "标识符长度应为 {expected} 字节，实际 {actual} 字节")
            }
            Self::InvalidHex(source) => {
                write!(f, "十六进制文本解码失败：{source}")
            }
            Self::InvalidNetworkZone { value } => {
                write!(f, "网络区 nibble {value} 超出 0..=3 的合法范围")
            }
        }
    }
}

impl From<FromHexError> for IdentifierError {
    fn from(source: FromHexError) -> Self {
        Self::InvalidHex(source)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for IdentifierError {}
