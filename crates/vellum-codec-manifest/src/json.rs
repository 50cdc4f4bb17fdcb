//! 结构化镜像：清单与 JSON 值之间的编解码臂。
//!
//! # 教案定位（Why）
//! - 镜像形态服务于人读与工具链交换：字段名、类别标签与类型文本直接可见，便于 diff 与审阅；
//!   规范传输仍以二进制臂为准。
//! - 镜像不设独立模型：serde 派生直接作用于对象模型，两臂永远描述同一事实。
//!
//! # 契约说明（What）
//! - 编码产物是 `{"elements": [...]}` 形状的 JSON 值；元素以 `kind`/`data` 相邻标签呈现，
//!   类型描述符为紧凑文本，字节载荷为 `0x` 十六进制。
//! - 解码先过形状预检（[`validate_candidate`]），再整体反序列化；两步的失败都折叠为
//!   [`ManifestError::InvalidManifest`] 并在 `reason` 中区分成因。
//!
//! # 设计考量（How）
//! - 预检挡掉"根本不是清单"的输入，让反序列化错误集中在字段级细节上，诊断文本更可读。

use alloc::{format, string::String};

use serde_json::Value as JsonValue;

use crate::error::ManifestError;
use crate::model::Manifest;
use crate::validate::validate_candidate;

/// 将清单编码为结构化镜像值。
pub(crate) fn encode(manifest: &Manifest) -> Result<JsonValue, ManifestError> {
    let json = serde_json::to_value(manifest).map_err(|err| ManifestError::InvalidManifest {
        reason: format!("镜像序列化失败：{err}"),
    })?;
    debug_assert!(validate_candidate(&json), "对象模型的镜像必然具备清单形状");
    Ok(json)
}

/// 自 JSON 文本字节解码清单。
pub(crate) fn decode_bytes(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let json: JsonValue =
        serde_json::from_slice(bytes).map_err(|err| ManifestError::InvalidManifest {
            reason: format!("JSON 解析失败：{err}"),
        })?;
    decode_value(&json)
}

/// 自已解析的 JSON 值解码清单。
pub(crate) fn decode_value(json: &JsonValue) -> Result<Manifest, ManifestError> {
    if !validate_candidate(json) {
        return Err(ManifestError::InvalidManifest {
            reason: String::from("候选值不具备 elements 数组形状"),
        });
    }
    serde_json::from_value(json.clone()).map_err(|err| ManifestError::InvalidManifest {
        reason: format!("镜像反序列化失败：{err}"),
    })
}
