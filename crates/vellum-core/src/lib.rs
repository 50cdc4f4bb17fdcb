#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # vellum-core
//!
//! ## 教案目的（Why）
//! - **定位**：vellum 工作区的最底层基础件，提供清单编解码与标识符编解码共用的字节游标与十六进制文本工具。
//! - **架构角色**：`vellum-identifiers` 与 `vellum-codec-manifest` 都以本 crate 为唯一的字节层依赖，保证两条编解码路径对截断、长度前缀的判定完全一致。
//! - **设计策略**：读写分离成 [`WireReader`] / [`WireWriter`] 两个小结构，全部读取先检查剩余长度再取字节，杜绝越界 panic。
//!
//! ## 交互契约（What）
//! - **输入输出**：读取侧基于 `&[u8]` 借用视图，零拷贝返回子切片；写入侧在 `Vec<u8>` 上追加，调用序列相同则产出字节完全相同。
//! - **错误语义**：任何会越过末尾的读取返回 [`WireError::Truncated`]，长度前缀超出 `u32` 表达范围返回 [`WireError::LengthOverflow`]。
//! - **前置约束**：`no_std` 环境需提供 `alloc`；本 crate 不做任何 I/O，也不持有共享状态。
//!
//! ## 实现策略（How）
//! - 多字节整数一律大端序；长度与计数固定使用 `u32`，避免平台相关的 `usize` 语义渗入线格式。
//! - 十六进制文本统一走 `hex` crate，本地仅补充 `0x` 前缀的规范化处理。
//!
//! ## 风险提示（Trade-offs）
//! - 游标 API 面向小报文设计，未提供分片视图或流式喂入；超大载荷的增量解码不在本层职责内。
//! - `u32` 长度上限意味着单段载荷不超过 4 GiB，对清单与调用数据场景绰绰有余。

extern crate alloc;

pub mod hex;
mod wire;

pub use crate::wire::{WireError, WireReader, WireWriter};
