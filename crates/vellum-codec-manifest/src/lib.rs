#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # vellum-codec-manifest
//!
//! ## 教案目的（Why）
//! - **定位**：逻辑单元清单（logic unit manifest）的模式驱动编解码器，覆盖清单整体、
//!   类型描述符、字段值与例程调用数据四层字节往返。
//! - **架构角色**：清单是链上逻辑单元的接口事实源；部署、调用与事件解析都以本 crate 的
//!   编解码产物为交换格式。
//! - **设计策略**：对象模型唯一，两种线格式（二进制信封与结构化 JSON 镜像）都是它的投影；
//!   所有编解码入口共享同一完整性闸门与同一字段内核。
//!
//! ## 交互契约（What）
//! - **依赖输入**：字节游标与十六进制工具来自 `vellum-core`，参与者标识符来自
//!   `vellum-identifiers`；镜像臂依托 `serde`/`serde_json`。
//! - **输出职责**：[`encode_manifest`]/[`decode_manifest`] 完成清单整体往返；
//!   [`FieldCodec`] 完成"值 × 类型描述符"的递归往返；`encode_arguments` 一族完成
//!   例程调用数据与事件数据往返；[`validate_candidate`] 提供镜像形状预检。
//! - **前置约束**：全部入口纯同步、无内部可变性；`no_std + alloc` 即可运行，`std`
//!   特性只追加 `std::error::Error` 适配。
//!
//! ## 实现策略（How）
//! - **实施步骤**：
//!   1. `model`/`typedesc`/`value` 固定对象模型与类型语言；
//!   2. `binary`/`json` 两臂各自实现格式投影，经 `coder` 门面统一分发；
//!   3. `field` 承载递归值内核，`args` 与常量闸门复用同一内核。
//! - **技术考量**：解码侧对计数字段做挂载预算检查、对递归做深度防护，恶意输入确定性
//!   失败而非耗尽内存或打穿调用栈。
//!
//! ## 风险提示（Trade-offs）
//! - **格式演进**：二进制信封带版本字节，新版本需在 `binary` 臂显式分发；当前仅有 `0x01`。
//! - **惰性引用解析**：描述符中的元素指针在值编解码时才解析，悬空引用在首次触达时报错，
//!   不在清单解码时整体预检（常量除外，其载荷在闸门处全量校验）。

extern crate alloc;

mod args;
mod binary;
mod coder;
mod error;
mod field;
mod json;
mod model;
mod registry;
mod typedesc;
mod validate;
mod value;

pub use crate::{
    args::{
        decode_arguments, decode_event_data, decode_returns, decode_routine_arguments,
        decode_routine_returns, encode_arguments, encode_routine_arguments,
    },
    coder::{
        WireFormat, WirePayload, check_integrity, decode_manifest, decode_manifest_value,
        encode_manifest,
    },
    error::ManifestError,
    field::FieldCodec,
    model::{
        ClassDef, ConstantDef, Element, ElementBody, ElementKind, EventDef, Manifest, RoutineDef,
        RoutineMode, StateDef, StateMode, StructureDef,
    },
    registry::ElementRegistry,
    typedesc::{
        IntWidth, MAX_NESTING_DEPTH, TypeDescriptor, TypeField, TypeParseError,
        is_valid_field_name,
    },
    validate::validate_candidate,
    value::Value,
};
