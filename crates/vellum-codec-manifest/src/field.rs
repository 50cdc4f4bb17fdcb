//! 字段编解码器：值与类型描述符配对的递归字节编解码。
//!
//! # 教案定位（Why）
//! - 清单常量、调用参数与返回值都落在"值 × 描述符"的同一编解码内核上；内核只此一份，
//!   取值范围、截断与类型裁决的口径在所有入口间天然一致。
//! - 编码是模式驱动的：线上不写值标签，字段边界由各形态的自描述长度前缀隐式划定。
//!
//! # 契约说明（What）
//! - 值布局（均大端）：`bool` 1 字节（0x00/0x01）；整数按描述符宽度写原码/二补码；
//!   `string`/`bytes` 为 `u32` 长度前缀 + 本体；`address` 为 32 原始字节；
//!   数组/映射为 `u32` 计数 + 逐项载荷（映射保持写入顺序）；结构体按字段序号升序逐字段、不写计数；
//!   引用按被引元素的字段列表视同结构体。
//! - 解码是严格逆运算：形态冲突报 [`ManifestError::TypeMismatch`]，载荷不足报
//!   [`ManifestError::Truncated`]，引用悬空报 [`ManifestError::UnresolvedReference`]，
//!   嵌套超限报 [`ManifestError::DepthLimitExceeded`]。
//!
//! # 设计考量（How）
//! - 编解码携带显式深度计数，引用成环时在 [`MAX_NESTING_DEPTH`] 处确定性失败，而不是打穿调用栈。
//! - 序列计数先对挂载预算做检查：每项至少占 `min` 字节时，计数不得超过剩余字节数；
//!   零宽度项（空结构等退化形态）另设绝对上限，防止计数字段被用作放大器。

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use vellum_core::{WireReader, WireWriter};
use vellum_identifiers::ParticipantId;

use crate::error::ManifestError;
use crate::model::Manifest;
use crate::registry::ElementRegistry;
use crate::typedesc::{IntWidth, MAX_NESTING_DEPTH, TypeDescriptor, TypeField, is_valid_field_name};
use crate::value::Value;

/// 零宽度项序列的绝对计数上限。
const MAX_ZERO_WIDTH_ITEMS: usize = 1 << 20;

/// 借用清单作为引用解析仓的字段编解码器。
///
/// ### 设计意图（Why）
/// - 编解码器只借用清单，不复制元素；一次构造即可服务同一清单上的任意多次编解码调用。
///
/// ### 契约描述（What）
/// - **输入**：构造时借用清单；编码接受 `(描述符, 值)`，解码接受 `(描述符, 游标)`。
/// - **后置条件**：编码成功写出的字节可被解码还原为相等的值；解码失败时游标内容不可信。
#[derive(Debug)]
pub struct FieldCodec<'m> {
    registry: ElementRegistry<'m>,
}

impl<'m> FieldCodec<'m> {
    /// 借用清单构造编解码器，内部建好元素查找表。
    #[must_use]
    pub fn new(manifest: &'m Manifest) -> Self {
        Self {
            registry: ElementRegistry::new(manifest),
        }
    }

    /// 借用内部的元素注册表。
    #[must_use]
    pub fn registry(&self) -> &ElementRegistry<'m> {
        &self.registry
    }

    /// 将值按描述符编码进写入器。
    pub fn encode_value(
        &self,
        ty: &TypeDescriptor,
        value: &Value,
        out: &mut WireWriter,
    ) -> Result<(), ManifestError> {
        self.encode_at(ty, value, out, 0)
    }

    /// 自游标按描述符解码一个值。
    pub fn decode_value(
        &self,
        ty: &TypeDescriptor,
        reader: &mut WireReader<'_>,
    ) -> Result<Value, ManifestError> {
        self.decode_at(ty, reader, 0)
    }

    fn encode_at(
        &self,
        ty: &TypeDescriptor,
        value: &Value,
        out: &mut WireWriter,
        depth: usize,
    ) -> Result<(), ManifestError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(ManifestError::DepthLimitExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        match (ty, value) {
            (TypeDescriptor::Bool, Value::Bool(flag)) => {
                out.put_u8(u8::from(*flag));
                Ok(())
            }
            (TypeDescriptor::Uint(width), Value::Uint(raw)) => {
                check_uint_range(*raw, *width)?;
                out.put_uint(*raw, width.bytes());
                Ok(())
            }
            (TypeDescriptor::Int(width), Value::Int(raw)) => {
                check_int_range(*raw, *width)?;
                out.put_int(*raw, width.bytes());
                Ok(())
            }
            (TypeDescriptor::Text, Value::Text(text)) => {
                out.put_len_prefixed(text.as_bytes())?;
                Ok(())
            }
            (TypeDescriptor::Bytes, Value::Bytes(bytes)) => {
                out.put_len_prefixed(bytes)?;
                Ok(())
            }
            (TypeDescriptor::Address, Value::Address(id)) => {
                out.put_bytes(id.as_bytes());
                Ok(())
            }
            (TypeDescriptor::Array(element), Value::Array(items)) => {
                out.put_u32(sequence_count(items.len())?);
                for item in items {
                    self.encode_at(element, item, out, depth + 1)?;
                }
                Ok(())
            }
            (TypeDescriptor::Map { key, value: value_ty }, Value::Map(entries)) => {
                out.put_u32(sequence_count(entries.len())?);
                for (entry_key, entry_value) in entries {
                    self.encode_at(key, entry_key, out, depth + 1)?;
                    self.encode_at(value_ty, entry_value, out, depth + 1)?;
                }
                Ok(())
            }
            (TypeDescriptor::Struct(fields), Value::Struct(pairs)) => {
                self.encode_struct(fields, pairs, out, depth)
            }
            (TypeDescriptor::Reference(ptr), value) => {
                let fields = self
                    .registry
                    .shape_fields(*ptr)
                    .ok_or(ManifestError::UnresolvedReference { ptr: *ptr })?;
                let Value::Struct(pairs) = value else {
                    return Err(ManifestError::TypeMismatch {
                        expected: format!("ref<{ptr}> 目标的结构值"),
                        found: value.kind_name().to_string(),
                    });
                };
                self.encode_struct(fields, pairs, out, depth + 1)
            }
            (ty, value) => Err(ManifestError::TypeMismatch {
                expected: ty.to_string(),
                found: value.kind_name().to_string(),
            }),
        }
    }

    fn encode_struct(
        &self,
        fields: &[TypeField],
        pairs: &[(String, Value)],
        out: &mut WireWriter,
        depth: usize,
    ) -> Result<(), ManifestError> {
        let order = sorted_field_order(fields)?;
        if pairs.len() != fields.len() {
            return Err(ManifestError::TypeMismatch {
                expected: format!("{} 个字段的结构值", fields.len()),
                found: format!("{} 个字段", pairs.len()),
            });
        }
        for field in order {
            let Some((_, item)) = pairs.iter().find(|(name, _)| name == &field.name) else {
                return Err(ManifestError::TypeMismatch {
                    expected: format!("结构值包含字段 {}", field.name),
                    found: String::from("字段缺失"),
                });
            };
            self.encode_at(&field.ty, item, out, depth + 1)?;
        }
        Ok(())
    }

    fn decode_at(
        &self,
        ty: &TypeDescriptor,
        reader: &mut WireReader<'_>,
        depth: usize,
    ) -> Result<Value, ManifestError> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(ManifestError::DepthLimitExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        match ty {
            TypeDescriptor::Bool => match reader.read_u8()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(ManifestError::TypeMismatch {
                    expected: String::from("bool 字节（0x00/0x01）"),
                    found: format!("0x{other:02x}"),
                }),
            },
            TypeDescriptor::Uint(width) => Ok(Value::Uint(reader.read_uint(width.bytes())?)),
            TypeDescriptor::Int(width) => Ok(Value::Int(reader.read_int(width.bytes())?)),
            TypeDescriptor::Text => {
                let chunk = reader.read_len_prefixed()?;
                let text = core::str::from_utf8(chunk).map_err(|_| ManifestError::TypeMismatch {
                    expected: String::from("UTF-8 字符串载荷"),
                    found: String::from("非法字节序列"),
                })?;
                Ok(Value::Text(String::from(text)))
            }
            TypeDescriptor::Bytes => {
                let chunk = reader.read_len_prefixed()?;
                Ok(Value::Bytes(chunk.to_vec()))
            }
            TypeDescriptor::Address => {
                let chunk = reader.read_exact(ParticipantId::LENGTH)?;
                Ok(Value::Address(ParticipantId::from_slice(chunk)?))
            }
            TypeDescriptor::Array(element) => {
                let count = reader.read_u32()? as usize;
                check_sequence_budget(count, min_encoded_width(element, 0), reader)?;
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.decode_at(element, reader, depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            TypeDescriptor::Map { key, value } => {
                let count = reader.read_u32()? as usize;
                let min_entry =
                    min_encoded_width(key, 0).saturating_add(min_encoded_width(value, 0));
                check_sequence_budget(count, min_entry, reader)?;
                let mut entries = Vec::new();
                for _ in 0..count {
                    let entry_key = self.decode_at(key, reader, depth + 1)?;
                    let entry_value = self.decode_at(value, reader, depth + 1)?;
                    entries.push((entry_key, entry_value));
                }
                Ok(Value::Map(entries))
            }
            TypeDescriptor::Struct(fields) => self.decode_struct(fields, reader, depth),
            TypeDescriptor::Reference(ptr) => {
                let fields = self
                    .registry
                    .shape_fields(*ptr)
                    .ok_or(ManifestError::UnresolvedReference { ptr: *ptr })?;
                self.decode_struct(fields, reader, depth + 1)
            }
        }
    }

    fn decode_struct(
        &self,
        fields: &[TypeField],
        reader: &mut WireReader<'_>,
        depth: usize,
    ) -> Result<Value, ManifestError> {
        let order = sorted_field_order(fields)?;
        let mut pairs = Vec::with_capacity(order.len());
        for field in order {
            let item = self.decode_at(&field.ty, reader, depth + 1)?;
            pairs.push((field.name.clone(), item));
        }
        Ok(Value::Struct(pairs))
    }
}

/// 返回按字段序号升序排列的借用视图，并强制执行字段列表不变式。
///
/// ### 契约定义（What）
/// - 同一列表内序号必须唯一且自 0 连续；任何缺口、重复或越界都返回
///   [`ManifestError::InvalidManifest`] 并说明成因。
/// - 字段名必须满足 [`is_valid_field_name`] 且在列表内唯一；重名会让按名取值
///   产生歧义，分隔符会让类型文本失去单义性，两者都整体拒绝。
pub(crate) fn sorted_field_order(
    fields: &[TypeField],
) -> Result<Vec<&TypeField>, ManifestError> {
    let mut slots: Vec<Option<&TypeField>> = alloc::vec![None; fields.len()];
    for (declared, field) in fields.iter().enumerate() {
        if !is_valid_field_name(&field.name) {
            return Err(ManifestError::InvalidManifest {
                reason: format!("字段名“{}”为空或含类型文本分隔符", field.name),
            });
        }
        if fields[..declared].iter().any(|prev| prev.name == field.name) {
            return Err(ManifestError::InvalidManifest {
                reason: format!("字段名 {} 重复出现", field.name),
            });
        }
        let position = field.index as usize;
        let Some(slot) = slots.get_mut(position) else {
            return Err(ManifestError::InvalidManifest {
                reason: format!(
                    "字段 {} 的序号 {} 超出 0..{} 的连续区间",
                    field.name,
                    field.index,
                    fields.len()
                ),
            });
        };
        if slot.is_some() {
            return Err(ManifestError::InvalidManifest {
                reason: format!("字段序号 {} 重复出现", field.index),
            });
        }
        *slot = Some(field);
    }
    let order: Vec<&TypeField> = slots.into_iter().flatten().collect();
    debug_assert_eq!(order.len(), fields.len(), "序号连续性校验后槽位必然填满");
    Ok(order)
}

/// 描述符编码产物的最小字节数（保守估计，引用按 0 计）。
fn min_encoded_width(ty: &TypeDescriptor, depth: usize) -> usize {
    if depth >= MAX_NESTING_DEPTH {
        return 0;
    }
    match ty {
        TypeDescriptor::Bool => 1,
        TypeDescriptor::Uint(width) | TypeDescriptor::Int(width) => width.bytes(),
        TypeDescriptor::Text | TypeDescriptor::Bytes => 4,
        TypeDescriptor::Address => ParticipantId::LENGTH,
        TypeDescriptor::Array(_) | TypeDescriptor::Map { .. } => 4,
        TypeDescriptor::Struct(fields) => fields
            .iter()
            .map(|field| min_encoded_width(&field.ty, depth + 1))
            .sum(),
        TypeDescriptor::Reference(_) => 0,
    }
}

/// 校验序列计数是否超出剩余载荷可能承载的项数。
fn check_sequence_budget(
    count: usize,
    min_item: usize,
    reader: &WireReader<'_>,
) -> Result<(), ManifestError> {
    if min_item > 0 {
        let needed = count.saturating_mul(min_item);
        if needed > reader.remaining() {
            return Err(ManifestError::Truncated {
                needed,
                remaining: reader.remaining(),
            });
        }
    } else if count > MAX_ZERO_WIDTH_ITEMS {
        return Err(ManifestError::InvalidManifest {
            reason: format!("零宽度元素的序列计数 {count} 超出防护上限"),
        });
    }
    Ok(())
}

/// 将长度收敛为 `u32` 序列计数。
fn sequence_count(len: usize) -> Result<u32, ManifestError> {
    u32::try_from(len).map_err(|_| ManifestError::InvalidManifest {
        reason: format!("序列长度 {len} 超出 u32 计数的表达范围"),
    })
}

fn check_uint_range(raw: u128, width: IntWidth) -> Result<(), ManifestError> {
    if width.bits() < 128 && (raw >> width.bits()) != 0 {
        return Err(ManifestError::TypeMismatch {
            expected: format!("u{} 宽度内的取值", width.bits()),
            found: format!("{raw}"),
        });
    }
    Ok(())
}

fn check_int_range(raw: i128, width: IntWidth) -> Result<(), ManifestError> {
    if width.bits() >= 128 {
        return Ok(());
    }
    let bits = width.bits();
    let max = (1i128 << (bits - 1)) - 1;
    let min = -(1i128 << (bits - 1));
    if raw < min || raw > max {
        return Err(ManifestError::TypeMismatch {
            expected: format!("i{bits} 宽度内的取值"),
            found: format!("{raw}"),
        });
    }
    Ok(())
}
