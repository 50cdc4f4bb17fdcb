//! 二进制线格式：带版本信封的清单字节编解码。
//!
//! # 教案定位（Why）
//! - 二进制臂是清单的规范传输形态：同一清单必然编码出同一字节串，哈希与签名可以直接建立在产物之上。
//! - 信封自带魔数与版本号，旧实现遇到新版本时在第 3 个字节即可确定性拒绝，不会读出一半再报错。
//!
//! # 线格式文法（What）
//! - 信封：`0x4C 0x55`（ASCII `LU`）+ 版本字节 `0x01` + 元素计数 `u32` + 逐元素载荷；多字节整数一律大端。
//! - 元素：`ptr:u32` + 依赖表（计数 `u32` + 逐指针 `u32`）+ 类别标签 `u8` + 类别载荷：
//!   | 标签 | 类别 | 载荷 |
//!   |------|------|------|
//!   | `0x01` | routine | 名称 + 模式字节（`0x00` call / `0x01` mutate）+ 入参字段表 + 出参字段表 |
//!   | `0x02` | state | 模式字节（`0x00` persistent / `0x01` ephemeral）+ 字段表 |
//!   | `0x03` | event | 名称 + 主题数 `u32` + 字段表 |
//!   | `0x04` | structure | 名称 + 字段表 |
//!   | `0x05` | constant | 类型描述符 + 长度前缀载荷 |
//!   | `0x06` | class | 名称 + 字段表 |
//! - 名称与载荷均为 `u32` 长度前缀 + 本体；字段表为计数 `u32` + 逐字段（序号 `u32` + 名称 + 描述符）。
//! - 类型描述符：标签 `u8` + 形态载荷：
//!   | 标签 | 形态 | 载荷 |
//!   |------|------|------|
//!   | `0x01` | bool | 无 |
//!   | `0x02` | uint | 宽度字节（1/2/4/8/16） |
//!   | `0x03` | int | 宽度字节（1/2/4/8/16） |
//!   | `0x04` | string | 无 |
//!   | `0x05` | bytes | 无 |
//!   | `0x06` | address | 无 |
//!   | `0x07` | array | 元素描述符 |
//!   | `0x08` | map | 键描述符 + 值描述符 |
//!   | `0x09` | struct | 字段表 |
//!   | `0x0A` | reference | 元素指针 `u32` |
//!
//! # 设计考量（How）
//! - 解码对每个计数字段先做挂载预算检查（计数 × 单项最小宽度 ≤ 剩余字节），声明天文数字的输入在预分配前
//!   即报 [`ManifestError::Truncated`]。
//! - 描述符递归携带深度计数，超过 [`MAX_NESTING_DEPTH`] 报 [`ManifestError::DepthLimitExceeded`]。
//! - 信封尾部残留字节视为清单不合法：同一字节串只对应一个清单，反之亦然。

use alloc::{
    format,
    string::String,
    vec::Vec,
};

use vellum_core::{WireReader, WireWriter};

use crate::error::ManifestError;
use crate::model::{
    ClassDef, ConstantDef, Element, ElementBody, EventDef, Manifest, RoutineDef, RoutineMode,
    StateDef, StateMode, StructureDef,
};
use crate::typedesc::{IntWidth, MAX_NESTING_DEPTH, TypeDescriptor, TypeField, is_valid_field_name};

/// 信封魔数，ASCII `LU`。
pub(crate) const WIRE_MAGIC: [u8; 2] = [0x4C, 0x55];
/// 当前信封版本。
pub(crate) const WIRE_VERSION: u8 = 0x01;

const KIND_ROUTINE: u8 = 0x01;
const KIND_STATE: u8 = 0x02;
const KIND_EVENT: u8 = 0x03;
const KIND_STRUCTURE: u8 = 0x04;
const KIND_CONSTANT: u8 = 0x05;
const KIND_CLASS: u8 = 0x06;

const TYPE_BOOL: u8 = 0x01;
const TYPE_UINT: u8 = 0x02;
const TYPE_INT: u8 = 0x03;
const TYPE_STRING: u8 = 0x04;
const TYPE_BYTES: u8 = 0x05;
const TYPE_ADDRESS: u8 = 0x06;
const TYPE_ARRAY: u8 = 0x07;
const TYPE_MAP: u8 = 0x08;
const TYPE_STRUCT: u8 = 0x09;
const TYPE_REFERENCE: u8 = 0x0a;

const MODE_CALL: u8 = 0x00;
const MODE_MUTATE: u8 = 0x01;
const MODE_PERSISTENT: u8 = 0x00;
const MODE_EPHEMERAL: u8 = 0x01;

/// 元素载荷的最小字节数：指针 4 + 依赖计数 4 + 类别标签 1。
const MIN_ELEMENT_WIDTH: usize = 9;
/// 字段载荷的最小字节数：序号 4 + 名称长度前缀 4 + 描述符标签 1。
const MIN_FIELD_WIDTH: usize = 9;

/// 将清单编码为带信封的二进制字节串。
pub(crate) fn encode(manifest: &Manifest) -> Result<Vec<u8>, ManifestError> {
    let mut out = WireWriter::new();
    out.put_bytes(&WIRE_MAGIC);
    out.put_u8(WIRE_VERSION);
    out.put_u32(count_u32(manifest.elements.len())?);
    for element in &manifest.elements {
        encode_element(element, &mut out)?;
    }
    Ok(out.into_vec())
}

/// 自二进制字节串解码清单；字节串必须恰好是一个完整信封。
pub(crate) fn decode(bytes: &[u8]) -> Result<Manifest, ManifestError> {
    let mut reader = WireReader::new(bytes);
    let magic = reader.read_exact(WIRE_MAGIC.len())?;
    if magic != WIRE_MAGIC {
        return Err(ManifestError::UnsupportedFormat {
            found: format!("魔数 0x{:02x}{:02x}", magic[0], magic[1]),
        });
    }
    let version = reader.read_u8()?;
    if version != WIRE_VERSION {
        return Err(ManifestError::UnsupportedFormat {
            found: format!("信封版本 0x{version:02x}"),
        });
    }
    let count = reader.read_u32()? as usize;
    check_count_budget(count, MIN_ELEMENT_WIDTH, &reader)?;
    let mut elements = Vec::with_capacity(count);
    for _ in 0..count {
        elements.push(decode_element(&mut reader)?);
    }
    if !reader.is_empty() {
        return Err(ManifestError::InvalidManifest {
            reason: format!("信封尾部残留 {} 字节", reader.remaining()),
        });
    }
    Ok(Manifest { elements })
}

fn encode_element(element: &Element, out: &mut WireWriter) -> Result<(), ManifestError> {
    out.put_u32(element.ptr);
    out.put_u32(count_u32(element.deps.len())?);
    for dep in &element.deps {
        out.put_u32(*dep);
    }
    match &element.body {
        ElementBody::Routine(def) => {
            out.put_u8(KIND_ROUTINE);
            out.put_len_prefixed(def.name.as_bytes())?;
            out.put_u8(match def.mode {
                RoutineMode::Call => MODE_CALL,
                RoutineMode::Mutate => MODE_MUTATE,
            });
            encode_fields(&def.accepts, out, 0)?;
            encode_fields(&def.returns, out, 0)
        }
        ElementBody::State(def) => {
            out.put_u8(KIND_STATE);
            out.put_u8(match def.mode {
                StateMode::Persistent => MODE_PERSISTENT,
                StateMode::Ephemeral => MODE_EPHEMERAL,
            });
            encode_fields(&def.fields, out, 0)
        }
        ElementBody::Event(def) => {
            out.put_u8(KIND_EVENT);
            out.put_len_prefixed(def.name.as_bytes())?;
            out.put_u32(def.topics);
            encode_fields(&def.fields, out, 0)
        }
        ElementBody::Structure(def) => {
            out.put_u8(KIND_STRUCTURE);
            out.put_len_prefixed(def.name.as_bytes())?;
            encode_fields(&def.fields, out, 0)
        }
        ElementBody::Constant(def) => {
            out.put_u8(KIND_CONSTANT);
            encode_descriptor(&def.ty, out, 0)?;
            out.put_len_prefixed(&def.value)?;
            Ok(())
        }
        ElementBody::Class(def) => {
            out.put_u8(KIND_CLASS);
            out.put_len_prefixed(def.name.as_bytes())?;
            encode_fields(&def.fields, out, 0)
        }
    }
}

fn decode_element(reader: &mut WireReader<'_>) -> Result<Element, ManifestError> {
    let ptr = reader.read_u32()?;
    let dep_count = reader.read_u32()? as usize;
    check_count_budget(dep_count, 4, reader)?;
    let mut deps = Vec::with_capacity(dep_count);
    for _ in 0..dep_count {
        deps.push(reader.read_u32()?);
    }
    let kind = reader.read_u8()?;
    let body = match kind {
        KIND_ROUTINE => ElementBody::Routine(RoutineDef {
            name: decode_string(reader)?,
            mode: match reader.read_u8()? {
                MODE_CALL => RoutineMode::Call,
                MODE_MUTATE => RoutineMode::Mutate,
                other => {
                    return Err(ManifestError::InvalidManifest {
                        reason: format!("未知的例程模式字节 0x{other:02x}"),
                    });
                }
            },
            accepts: decode_fields(reader, 0)?,
            returns: decode_fields(reader, 0)?,
        }),
        KIND_STATE => ElementBody::State(StateDef {
            mode: match reader.read_u8()? {
                MODE_PERSISTENT => StateMode::Persistent,
                MODE_EPHEMERAL => StateMode::Ephemeral,
                other => {
                    return Err(ManifestError::InvalidManifest {
                        reason: format!("未知的状态模式字节 0x{other:02x}"),
                    });
                }
            },
            fields: decode_fields(reader, 0)?,
        }),
        KIND_EVENT => ElementBody::Event(EventDef {
            name: decode_string(reader)?,
            topics: reader.read_u32()?,
            fields: decode_fields(reader, 0)?,
        }),
        KIND_STRUCTURE => ElementBody::Structure(StructureDef {
            name: decode_string(reader)?,
            fields: decode_fields(reader, 0)?,
        }),
        KIND_CONSTANT => ElementBody::Constant(ConstantDef {
            ty: decode_descriptor(reader, 0)?,
            value: reader.read_len_prefixed()?.to_vec(),
        }),
        KIND_CLASS => ElementBody::Class(ClassDef {
            name: decode_string(reader)?,
            fields: decode_fields(reader, 0)?,
        }),
        other => {
            return Err(ManifestError::InvalidManifest {
                reason: format!("未知的元素类别标签 0x{other:02x}"),
            });
        }
    };
    Ok(Element { ptr, deps, body })
}

fn encode_fields(
    fields: &[TypeField],
    out: &mut WireWriter,
    depth: usize,
) -> Result<(), ManifestError> {
    out.put_u32(count_u32(fields.len())?);
    for field in fields {
        out.put_u32(field.index);
        out.put_len_prefixed(field.name.as_bytes())?;
        encode_descriptor(&field.ty, out, depth)?;
    }
    Ok(())
}

fn decode_fields(
    reader: &mut WireReader<'_>,
    depth: usize,
) -> Result<Vec<TypeField>, ManifestError> {
    let count = reader.read_u32()? as usize;
    check_count_budget(count, MIN_FIELD_WIDTH, reader)?;
    let mut fields = Vec::with_capacity(count);
    for _ in 0..count {
        let index = reader.read_u32()?;
        let name = decode_string(reader)?;
        if !is_valid_field_name(&name) {
            return Err(ManifestError::InvalidManifest {
                reason: format!("字段名“{name}”为空或含类型文本分隔符"),
            });
        }
        fields.push(TypeField {
            index,
            name,
            ty: decode_descriptor(reader, depth)?,
        });
    }
    Ok(fields)
}

fn encode_descriptor(
    ty: &TypeDescriptor,
    out: &mut WireWriter,
    depth: usize,
) -> Result<(), ManifestError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(ManifestError::DepthLimitExceeded {
            limit: MAX_NESTING_DEPTH,
        });
    }
    match ty {
        TypeDescriptor::Bool => out.put_u8(TYPE_BOOL),
        TypeDescriptor::Uint(width) => {
            out.put_u8(TYPE_UINT);
            out.put_u8(width.bytes() as u8);
        }
        TypeDescriptor::Int(width) => {
            out.put_u8(TYPE_INT);
            out.put_u8(width.bytes() as u8);
        }
        TypeDescriptor::Text => out.put_u8(TYPE_STRING),
        TypeDescriptor::Bytes => out.put_u8(TYPE_BYTES),
        TypeDescriptor::Address => out.put_u8(TYPE_ADDRESS),
        TypeDescriptor::Array(element) => {
            out.put_u8(TYPE_ARRAY);
            encode_descriptor(element, out, depth + 1)?;
        }
        TypeDescriptor::Map { key, value } => {
            out.put_u8(TYPE_MAP);
            encode_descriptor(key, out, depth + 1)?;
            encode_descriptor(value, out, depth + 1)?;
        }
        TypeDescriptor::Struct(fields) => {
            out.put_u8(TYPE_STRUCT);
            encode_fields(fields, out, depth + 1)?;
        }
        TypeDescriptor::Reference(ptr) => {
            out.put_u8(TYPE_REFERENCE);
            out.put_u32(*ptr);
        }
    }
    Ok(())
}

fn decode_descriptor(
    reader: &mut WireReader<'_>,
    depth: usize,
) -> Result<TypeDescriptor, ManifestError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(ManifestError::DepthLimitExceeded {
            limit: MAX_NESTING_DEPTH,
        });
    }
    match reader.read_u8()? {
        TYPE_BOOL => Ok(TypeDescriptor::Bool),
        TYPE_UINT => Ok(TypeDescriptor::Uint(decode_width(reader)?)),
        TYPE_INT => Ok(TypeDescriptor::Int(decode_width(reader)?)),
        TYPE_STRING => Ok(TypeDescriptor::Text),
        TYPE_BYTES => Ok(TypeDescriptor::Bytes),
        TYPE_ADDRESS => Ok(TypeDescriptor::Address),
        TYPE_ARRAY => Ok(TypeDescriptor::Array(alloc::boxed::Box::new(
            decode_descriptor(reader, depth + 1)?,
        ))),
        TYPE_MAP => Ok(TypeDescriptor::Map {
            key: alloc::boxed::Box::new(decode_descriptor(reader, depth + 1)?),
            value: alloc::boxed::Box::new(decode_descriptor(reader, depth + 1)?),
        }),
        TYPE_STRUCT => Ok(TypeDescriptor::Struct(decode_fields(reader, depth + 1)?)),
        TYPE_REFERENCE => Ok(TypeDescriptor::Reference(reader.read_u32()?)),
        other => Err(ManifestError::InvalidManifest {
            reason: format!("未知的类型描述符标签 0x{other:02x}"),
        }),
    }
}

fn decode_width(reader: &mut WireReader<'_>) -> Result<IntWidth, ManifestError> {
    let raw = reader.read_u8()?;
    IntWidth::from_bytes(raw as usize).ok_or_else(|| ManifestError::InvalidManifest {
        reason: format!("非法的整数宽度字节 0x{raw:02x}"),
    })
}

fn decode_string(reader: &mut WireReader<'_>) -> Result<String, ManifestError> {
    let chunk = reader.read_len_prefixed()?;
    let text = core::str::from_utf8(chunk).map_err(|_| ManifestError::InvalidManifest {
        reason: String::from("名称载荷不是合法 UTF-8"),
    })?;
    Ok(String::from(text))
}

/// 计数字段的挂载预算检查：计数 × 单项最小宽度不得超过剩余字节。
fn check_count_budget(
    count: usize,
    min_item: usize,
    reader: &WireReader<'_>,
) -> Result<(), ManifestError> {
    let needed = count.saturating_mul(min_item);
    if needed > reader.remaining() {
        return Err(ManifestError::Truncated {
            needed,
            remaining: reader.remaining(),
        });
    }
    Ok(())
}

fn count_u32(len: usize) -> Result<u32, ManifestError> {
    u32::try_from(len).map_err(|_| ManifestError::InvalidManifest {
        reason: format!("计数 {len} 超出 u32 的表达范围"),
    })
}
