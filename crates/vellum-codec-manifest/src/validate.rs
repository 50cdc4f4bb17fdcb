//! 清单候选值的浅层形状校验。
//!
//! # 教案定位（Why）
//! - 两条编解码路径（二进制与结构化镜像）共享同一份"这像不像一份清单"的判定，任何一侧单独放宽
//!   都会造成两臂行为漂移，因此校验只存在这一个实现。
//!
//! # 契约说明（What）
//! - 判定刻意保持浅层：候选值必须是对象、必须含 `elements` 键、`elements` 必须是数组，仅此三条。
//! - 逐元素的深层合法性（类别标签、字段形状、指针唯一性）不在此处裁决，由编解码器在后续阶段以
//!   精确错误报告。`{"elements": []}` 是合法的空清单。

use serde_json::Value as JsonValue;

/// 判断候选值是否具备清单的基本形状。
///
/// ### 契约定义（What）
/// - **输入**：任意结构化候选值。
/// - **输出**：`true` 当且仅当候选值为对象、含 `elements` 键且该键为数组。
/// - 纯谓词：不修改输入、不抛错、不做深层遍历。
#[must_use]
pub fn validate_candidate(candidate: &JsonValue) -> bool {
    match candidate {
        JsonValue::Object(record) => {
            matches!(record.get("elements"), Some(JsonValue::Array(_)))
        }
        _ => false,
    }
}
