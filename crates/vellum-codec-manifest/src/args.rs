//! 调用数据编解码：例程出入参与字段表的字节往返。
//!
//! # 教案定位（Why）
//! - 发起调用的一侧按例程的入参字段表把参数拍成字节，执行完的一侧按出参字段表把返回值拍回来；
//!   两侧共享字段编解码内核，调用数据与清单常量的布局口径完全一致。
//!
//! # 契约说明（What）
//! - 参数按字段序号与字段一一配对：个数不符先报 [`ManifestError::ArityMismatch`]，
//!   任何参数都不编码；配对后按序号升序逐个编码，产物不带外层长度或计数。
//! - 解码按序号升序逐字段消费载荷，尾部残留字节报 [`ManifestError::InvalidManifest`]。
//! - 返回值解码区分"没有返回"与"返回了空串"：空载荷一律视为无返回（`None`）。
//! - 事件数据走同一内核：按事件名取出字段表后与调用数据同样解码。
//! - 按名入口（例程与事件）经元素注册表解析，同名时先声明者生效。
//!
//! # 设计考量（How）
//! - 字段声明顺序与序号顺序允许不一致，编码顺序只看序号；序号缺口与重复沿用字段内核的裁决。

use alloc::{format, vec::Vec};

use vellum_core::{WireReader, WireWriter};

use crate::error::ManifestError;
use crate::field::{FieldCodec, sorted_field_order};
use crate::model::{ElementBody, EventDef, Manifest, RoutineDef};
use crate::registry::ElementRegistry;
use crate::typedesc::TypeField;
use crate::value::Value;

/// 将参数序列按字段表编码为调用数据。
pub fn encode_arguments(
    manifest: &Manifest,
    fields: &[TypeField],
    args: &[Value],
) -> Result<Vec<u8>, ManifestError> {
    if args.len() != fields.len() {
        return Err(ManifestError::ArityMismatch {
            expected: fields.len(),
            actual: args.len(),
        });
    }
    let codec = FieldCodec::new(manifest);
    let order = sorted_field_order(fields)?;
    let mut out = WireWriter::new();
    for field in order {
        // 序号连续性已校验，序号即参数下标。
        codec.encode_value(&field.ty, &args[field.index as usize], &mut out)?;
    }
    Ok(out.into_vec())
}

/// 将调用数据按字段表解码为参数序列，顺序按字段序号升序。
pub fn decode_arguments(
    manifest: &Manifest,
    fields: &[TypeField],
    payload: &[u8],
) -> Result<Vec<Value>, ManifestError> {
    let codec = FieldCodec::new(manifest);
    let order = sorted_field_order(fields)?;
    let mut reader = WireReader::new(payload);
    let mut values = Vec::with_capacity(order.len());
    for field in order {
        values.push(codec.decode_value(&field.ty, &mut reader)?);
    }
    if !reader.is_empty() {
        return Err(ManifestError::InvalidManifest {
            reason: format!("调用数据尾部残留 {} 字节", reader.remaining()),
        });
    }
    Ok(values)
}

/// 将返回载荷按出参字段表解码；空载荷视为无返回。
pub fn decode_returns(
    manifest: &Manifest,
    fields: &[TypeField],
    payload: &[u8],
) -> Result<Option<Vec<Value>>, ManifestError> {
    if payload.is_empty() {
        return Ok(None);
    }
    decode_arguments(manifest, fields, payload).map(Some)
}

/// 按例程名编码入参。
pub fn encode_routine_arguments(
    manifest: &Manifest,
    routine: &str,
    args: &[Value],
) -> Result<Vec<u8>, ManifestError> {
    let def = routine_def(manifest, routine)?;
    encode_arguments(manifest, &def.accepts, args)
}

/// 按例程名解码入参。
pub fn decode_routine_arguments(
    manifest: &Manifest,
    routine: &str,
    payload: &[u8],
) -> Result<Vec<Value>, ManifestError> {
    let def = routine_def(manifest, routine)?;
    decode_arguments(manifest, &def.accepts, payload)
}

/// 按例程名解码返回载荷。
pub fn decode_routine_returns(
    manifest: &Manifest,
    routine: &str,
    payload: &[u8],
) -> Result<Option<Vec<Value>>, ManifestError> {
    let def = routine_def(manifest, routine)?;
    decode_returns(manifest, &def.returns, payload)
}

/// 按事件名解码事件数据载荷，字段表取自事件元素的声明。
pub fn decode_event_data(
    manifest: &Manifest,
    event: &str,
    payload: &[u8],
) -> Result<Vec<Value>, ManifestError> {
    let def = event_def(manifest, event)?;
    decode_arguments(manifest, &def.fields, payload)
}

fn routine_def<'m>(manifest: &'m Manifest, name: &str) -> Result<&'m RoutineDef, ManifestError> {
    let registry = ElementRegistry::new(manifest);
    registry
        .routine(name)
        .and_then(|element| match &element.body {
            ElementBody::Routine(def) => Some(def),
            _ => None,
        })
        .ok_or_else(|| ManifestError::InvalidManifest {
            reason: format!("清单中找不到例程 {name}"),
        })
}

fn event_def<'m>(manifest: &'m Manifest, name: &str) -> Result<&'m EventDef, ManifestError> {
    let registry = ElementRegistry::new(manifest);
    registry
        .event(name)
        .and_then(|element| match &element.body {
            ElementBody::Event(def) => Some(def),
            _ => None,
        })
        .ok_or_else(|| ManifestError::InvalidManifest {
            reason: format!("清单中找不到事件 {name}"),
        })
}
