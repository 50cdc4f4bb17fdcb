#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # vellum-identifiers
//!
//! ## 教案目的（Why）
//! - **定位**：链上参与者标识符的定长布局编解码，是账户寻址与调用数据中 `address` 值的唯一事实来源。
//! - **架构角色**：`vellum-codec-manifest` 在编解码 `address` 字段时直接复用本 crate 的构造校验，保证两层对"什么是合法标识符"的判定一致。
//! - **设计策略**：标识符在构造时一次性校验、构造后不可变；读取访问器全部只读，杜绝"先构造后篡改"的中间态。
//!
//! ## 交互契约（What）
//! - **输入形态**：32 字节原始载荷，或十六进制文本（`0x` 前缀可省略）。
//! - **布局约定**：字节 0 为元数据字节，高 nibble 编码网络区（0..=3）；字节 4..28 为指纹；字节 28..32 为大端 `u32` 变体号；其余字节保留原样携带。
//! - **失败语义**：长度不是 32 字节返回 [`IdentifierError::InvalidLength`]；区位超界返回 [`IdentifierError::InvalidNetworkZone`]；文本解码失败返回 [`IdentifierError::InvalidHex`]。
//!
//! ## 实现策略（How）
//! - [`ParticipantId`] 是 `[u8; 32]` 的新类型包装，按值复制即可跨线程传递；探针式校验 [`ParticipantId::validate`] 返回错误值而非抛出。
//! - 文本出入口统一经 `vellum-core` 的十六进制模块，规范形态恒为 `0x` + 64 位小写十六进制。
//!
//! ## 风险提示（Trade-offs）
//! - 保留字节（低 nibble 与字节 1..4）原样携带、不做解释；未来若赋予语义，需要同步收紧构造校验并评估既有载荷的兼容性。
//! - 布局按字节窗口硬编码，调整窗口属于破坏性变更，必须伴随版本化的迁移方案。

extern crate alloc;

mod error;
mod participant;
mod zone;

pub use crate::{
    error::IdentifierError,
    participant::{ParticipantId, is_valid_address},
    zone::NetworkZone,
};
