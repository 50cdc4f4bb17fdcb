//! 网络区枚举：元数据字节高 nibble 的语义化表示。

use core::fmt;

use crate::error::IdentifierError;

/// 标识符归属的网络区，取值范围 0..=3。
///
/// ### 设计意图（Why）
/// - 区位嵌在元数据字节的高 nibble 中，用枚举替代裸 `u8` 后，越界值在边界处即被拒绝，内部逻辑无需重复防御。
///
/// ### 契约描述（What）
/// - `TryFrom<u8>` 仅接受 0..=3；其余值返回 [`IdentifierError::InvalidNetworkZone`]。
/// - `as_u8` 返回 nibble 原值，供布局装配使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetworkZone {
    /// 主网区。
    Zone0,
    /// 测试网区。
    Zone1,
    /// 预发布区。
    Zone2,
    /// 本地开发区。
    Zone3,
}

impl NetworkZone {
    /// 返回区位的 nibble 数值。
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Zone0 => 0,
            Self::Zone1 => 1,
            Self::Zone2 => 2,
            Self::Zone3 => 3,
        }
    }
}

impl TryFrom<u8> for NetworkZone {
    type Error = IdentifierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zone0),
            1 => Ok(Self::Zone1),
            2 => Ok(Self::Zone2),
            3 => Ok(Self::Zone3),
            other => Err(IdentifierError::InvalidNetworkZone { value: other }),
        }
    }
}

impl fmt::Display for NetworkZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone{}", self.as_u8())
    }
}
