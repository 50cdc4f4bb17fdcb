//! 参与者标识符：32 字节定长布局的构造、校验与只读访问。
//!
//! # 教案定位（Why）
//! - 标识符是跨系统传递的寻址凭据，布局必须逐字节固定；本模块把布局窗口收敛为常量，构造路径收敛为三个入口（字节、切片、文本）。
//! - 构造即校验：任何 [`ParticipantId`] 实例都满足布局不变式，下游无需再防御。
//!
//! # 契约说明（What）
//! - 布局（自字节 0 起）：
//!   - 字节 0：元数据，高 nibble 为网络区（0..=3），低 nibble 保留；
//!   - 字节 1..4：保留标志位，原样携带；
//!   - 字节 4..28：24 字节指纹；
//!   - 字节 28..32：大端 `u32` 变体号。
//! - 规范文本形态：`0x` + 64 位小写十六进制，共 66 字符。
//!
//! # 设计考量（How）
//! - 新类型包装 `[u8; 32]`，`Copy` 语义，访问器按值返回小块数据，避免生命周期噪音。
//! - 探针式校验返回 `Option<IdentifierError>`（`None` 即合法），供"只想询问、不想展开错误控制流"的调用方使用。

use alloc::{string::String, vec::Vec};
use core::fmt;
use core::str::FromStr;

use vellum_core::hex as hextext;

use crate::{error::IdentifierError, zone::NetworkZone};

/// 元数据字节所在偏移。
const METADATA_OFFSET: usize = 0;
/// 指纹窗口起点。
const FINGERPRINT_OFFSET: usize = 4;
/// 变体号窗口起点，同时是指纹窗口终点。
const VARIANT_OFFSET: usize = 28;

/// 32 字节参与者标识符，构造后不可变。
///
/// ### 设计意图（Why）
/// - 以值对象承载寻址凭据：`Copy` + 全私有字段 + 只读访问器，从类型层面排除"构造后篡改"。
///
/// ### 契约描述（What）
/// - **不变式**：任何实例的网络区 nibble 均在 0..=3 内；布局窗口见模块文档。
/// - **输出**：`Display` 与 [`ParticipantId::to_hex`] 输出规范文本形态。
///
/// ### 实现说明（How）
/// - 校验只发生在构造入口；访问器直接按布局窗口切片，均为无失败路径。
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId([u8; Self::LENGTH]);

impl ParticipantId {
    /// 布局固定的字节长度。
    pub const LENGTH: usize = 32;

    /// 指纹窗口的字节长度。
    pub const FINGERPRINT_LENGTH: usize = VARIANT_OFFSET - FINGERPRINT_OFFSET;

    /// 由 32 字节数组构造标识符。
    ///
    /// ### 契约定义（What）
    /// - **输入**：完整的 32 字节布局。
    /// - **失败**：网络区 nibble 超界返回 [`IdentifierError::InvalidNetworkZone`]。
    /// - **后置条件**：返回的实例满足全部布局不变式。
    pub fn from_bytes(bytes: [u8; Self::LENGTH]) -> Result<Self, IdentifierError> {
        let nibble = bytes[METADATA_OFFSET] >> 4;
        NetworkZone::try_from(nibble)?;
        Ok(Self(bytes))
    }

    /// 由任意长度切片构造标识符，长度必须恰为 32 字节。
    pub fn from_slice(candidate: &[u8]) -> Result<Self, IdentifierError> {
        let bytes: [u8; Self::LENGTH] =
            candidate
                .try_into()
                .map_err(|_| IdentifierError::InvalidLength {
                    expected: Self::LENGTH,
                    actual: candidate.len(),
                })?;
        Self::from_bytes(bytes)
    }

    /// 由十六进制文本构造标识符，`0x` 前缀可省略。
    pub fn from_hex(text: &str) -> Result<Self, IdentifierError> {
        let bytes = hextext::decode_flexible(text)?;
        Self::from_slice(&bytes)
    }

    /// 由布局各部件装配标识符，保留字节一律置零。
    ///
    /// ### 契约定义（What）
    /// - **输入**：网络区、24 字节指纹、变体号。
    /// - **输出**：装配结果必然合法，因此不返回 `Result`。
    #[must_use]
    pub fn from_parts(
        zone: NetworkZone,
        fingerprint: [u8; Self::FINGERPRINT_LENGTH],
        variant: u32,
    ) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        bytes[METADATA_OFFSET] = zone.as_u8() << 4;
        bytes[FINGERPRINT_OFFSET..VARIANT_OFFSET].copy_from_slice(&fingerprint);
        bytes[VARIANT_OFFSET..].copy_from_slice(&variant.to_be_bytes());
        Self(bytes)
    }

    /// 探针式校验：输入可构造时返回 `None`，否则返回具体错误。
    #[must_use]
    pub fn validate(candidate: &[u8]) -> Option<IdentifierError> {
        match Self::from_slice(candidate) {
            Ok(_) => None,
            Err(err) => Some(err),
        }
    }

    /// 探针式校验的文本版本。
    #[must_use]
    pub fn validate_hex(text: &str) -> Option<IdentifierError> {
        match Self::from_hex(text) {
            Ok(_) => None,
            Err(err) => Some(err),
        }
    }

    /// 返回标识符归属的网络区。
    #[must_use]
    pub fn zone(&self) -> NetworkZone {
        match self.0[METADATA_OFFSET] >> 4 {
            0 => NetworkZone::Zone0,
            1 => NetworkZone::Zone1,
            2 => NetworkZone::Zone2,
            // 构造入口已拒绝 3 以外的更大取值。
            _ => NetworkZone::Zone3,
        }
    }

    /// 返回 24 字节指纹窗口的拷贝。
    #[must_use]
    pub fn fingerprint(&self) -> [u8; Self::FINGERPRINT_LENGTH] {
        let mut fingerprint = [0u8; Self::FINGERPRINT_LENGTH];
        fingerprint.copy_from_slice(&self.0[FINGERPRINT_OFFSET..VARIANT_OFFSET]);
        fingerprint
    }

    /// 返回大端解释的变体号。
    #[must_use]
    pub fn variant(&self) -> u32 {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&self.0[VARIANT_OFFSET..]);
        u32::from_be_bytes(raw)
    }

    /// 以只读数组视图返回全部 32 字节。
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// 复制出字节向量。
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// 输出规范文本形态：`0x` + 64 位小写十六进制。
    #[must_use]
    pub fn to_hex(&self) -> String {
        hextext::encode_prefixed(&self.0)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParticipantId").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ParticipantId {
    type Err = IdentifierError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_hex(text)
    }
}

impl TryFrom<&[u8]> for ParticipantId {
    type Error = IdentifierError;

    fn try_from(candidate: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(candidate)
    }
}

impl From<ParticipantId> for [u8; ParticipantId::LENGTH] {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

/// 判断文本是否为规范地址形态：`0x` + 64 位十六进制，共 66 字符。
///
/// ### 契约定义（What）
/// - 前缀必须是小写 `0x`；主体 64 位十六进制大小写均可。
/// - 不做修剪或宽容解析：长度 65/67、缺前缀、混入非十六进制字符一律返回 `false`。
/// - 纯谓词，永不失败。
#[must_use]
pub fn is_valid_address(text: &str) -> bool {
    let Some(body) = text.strip_prefix("0x") else {
        return false;
    };
    body.len() == 64 && body.bytes().all(|digit| digit.is_ascii_hexdigit())
}
