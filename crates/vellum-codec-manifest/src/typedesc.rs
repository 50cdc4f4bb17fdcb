//! 类型描述符：标签化的递归类型模型与紧凑文本语言。
//!
//! # 教案定位（Why）
//! - 清单中每个字段、常量与参数都由类型描述符约束取值形态；描述符以显式标签联合建模，
//!   编解码分发全部走穷举 `match`，不存在任何鸭子类型式的动态判断。
//! - 结构化镜像里描述符以紧凑文本示人（例如 `map[address]u128`、`[]struct{lo:u64,hi:u64}`），
//!   便于人工阅读与跨语言比对；文本与标签模型一一对应。
//!
//! # 契约说明（What）
//! - 文本语法（规范形态无空白，关键字小写）：
//!   - 原语：`bool`、`string`、`bytes`、`address`、`u8..u128`、`i8..i128`（宽度限 8/16/32/64/128 位）；
//!   - 数组：`[]T`；映射：`map[K]V`（键文本以括号配对截取，可任意嵌套）；
//!   - 内联结构：`struct{name:T,...}`，字段序号按出现位置从 0 递增；
//!   - 引用：`ref<N>`，`N` 为被引元素的十进制指针。
//! - 往返定律：对任何解析产物 `d`，`render(d)` 再解析得到与 `d` 相等的描述符。
//!
//! # 设计考量（How）
//! - 解析采用前缀分发 + 括号配对扫描，不引入解析器依赖；嵌套深度超过 [`MAX_NESTING_DEPTH`] 即拒绝，
//!   防止恶意文本打穿调用栈。
//! - serde 形态即文本：`Serialize` 输出 `Display` 结果，`Deserialize` 走 `FromStr`，镜像与模型不会出现两套语法。

use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// 描述符与值共用的嵌套深度防护上限。
///
/// ### 契约定义（What）
/// - 类型文本解析、描述符二进制编解码、值编解码共用同一上限；超过即失败，绝不尝试继续递归。
/// - 上限按"正常清单远用不到、恶意输入必然撞上"的原则取值。
pub const MAX_NESTING_DEPTH: usize = 64;

/// 整数取值的固定字节宽度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    /// 8 位。
    W8,
    /// 16 位。
    W16,
    /// 32 位。
    W32,
    /// 64 位。
    W64,
    /// 128 位。
    W128,
}

impl IntWidth {
    /// 返回宽度对应的字节数。
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::W8 => 1,
            Self::W16 => 2,
            Self::W32 => 4,
            Self::W64 => 8,
            Self::W128 => 16,
        }
    }

    /// 返回宽度对应的位数。
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.bytes() as u32) * 8
    }

    /// 由字节数还原宽度；字节数不在宽度集合内时返回 `None`。
    #[must_use]
    pub const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Self::W8),
            2 => Some(Self::W16),
            4 => Some(Self::W32),
            8 => Some(Self::W64),
            16 => Some(Self::W128),
            _ => None,
        }
    }
}

/// 判断字段名是否可安全嵌入类型文本。
///
/// ### 契约定义（What）
/// - `true` 当且仅当名称非空且不含类型文本的任何分隔符（`:`、`,`、`{`、`}`、`[`、`]`、`<`、`>`）。
/// - 合法名原样嵌入 `struct{name:T,...}` 不改变语法结构，`Display` 与解析因此互为逆运算；
///   该判定在类型文本解析、二进制字段解码与字段列表消费处统一执行。
#[must_use]
pub fn is_valid_field_name(name: &str) -> bool {
    !name.is_empty() && !name.contains([':', ',', '{', '}', '[', ']', '<', '>'])
}

/// 字段声明：名称、类型与字段序号。
///
/// ### 契约描述（What）
/// - 同一字段列表内序号唯一且自 0 连续；该不变式在列表被消费处（结构体编码、参数编码）强制执行。
/// - 结构化镜像键名：`index` / `name` / `type`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    /// 字段序号，决定线上的编码顺序。
    pub index: u32,
    /// 字段名称。
    pub name: String,
    /// 字段类型。
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

/// 递归的类型描述符。
///
/// ### 设计意图（Why）
/// - 用标签联合表达类型语言的全部形态，穷举 `match` 保证新增形态时编译器指出所有遗漏的分发点。
///
/// ### 契约描述（What）
/// - `Reference` 携带元素指针，指向清单元素仓（arena）中的结构形状元素；解析由字段编解码器完成。
/// - 相等性是结构相等；`Display` 输出规范文本形态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// 布尔。
    Bool,
    /// 固定宽度无符号整数。
    Uint(IntWidth),
    /// 固定宽度有符号整数。
    Int(IntWidth),
    /// UTF-8 字符串。
    Text,
    /// 原始字节串。
    Bytes,
    /// 参与者标识符。
    Address,
    /// 元素类型同构的数组。
    Array(Box<TypeDescriptor>),
    /// 键值映射，条目保持写入顺序。
    Map {
        /// 键类型。
        key: Box<TypeDescriptor>,
        /// 值类型。
        value: Box<TypeDescriptor>,
    },
    /// 内联结构体。
    Struct(Vec<TypeField>),
    /// 指向清单元素仓的引用。
    Reference(u32),
}

/// 类型文本无法解析时的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    /// 文本为空。
    Empty,
    /// 文本不是任何受支持的类型形态。
    Unsupported {
        /// 引发失败的文本片段。
        text: String,
    },
    /// 括号不配对。
    Unbalanced {
        /// 引发失败的文本片段。
        text: String,
    },
    /// 嵌套深度超过 [`MAX_NESTING_DEPTH`]。
    TooDeep {
        /// 防护上限值。
        limit: usize,
    },
}

impl fmt::Display for TypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("类型文本为空"),
            Self::Unsupported { text } => write!(f, "不支持的类型文本“{text}”"),
            Self::Unbalanced { text } => write!(f, "类型文本“{text}”括号不配对"),
            Self::TooDeep { limit } => write!(f, "类型嵌套超过 {limit} 层"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TypeParseError {}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Uint(width) => write!(f, "u{}", width.bits()),
            Self::Int(width) => write!(f, "i{}", width.bits()),
            Self::Text => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::Address => f.write_str("address"),
            Self::Array(element) => write!(f, "[]{element}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Struct(fields) => {
                f.write_str("struct{")?;
                for (position, field) in fields.iter().enumerate() {
                    if position > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            Self::Reference(ptr) => write!(f, "ref<{ptr}>"),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = TypeParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_type(text, 0)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl de::Visitor<'_> for TextVisitor {
            type Value = TypeDescriptor;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("紧凑类型文本，例如 map[address]u128")
            }

            fn visit_str<E>(self, text: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                text.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TextVisitor)
    }
}

/// 前缀分发式递归解析。
fn parse_type(text: &str, depth: usize) -> Result<TypeDescriptor, TypeParseError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(TypeParseError::TooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }
    if text.is_empty() {
        return Err(TypeParseError::Empty);
    }
    if let Some(rest) = text.strip_prefix("[]") {
        return Ok(TypeDescriptor::Array(Box::new(parse_type(rest, depth + 1)?)));
    }
    if let Some(rest) = text.strip_prefix("map[") {
        let key_end = matching_square_bracket(rest, text)?;
        let key = parse_type(&rest[..key_end], depth + 1)?;
        let value = parse_type(&rest[key_end + 1..], depth + 1)?;
        return Ok(TypeDescriptor::Map {
            key: Box::new(key),
            value: Box::new(value),
        });
    }
    if let Some(rest) = text.strip_prefix("struct{") {
        let Some(body) = rest.strip_suffix('}') else {
            return Err(TypeParseError::Unbalanced { text: text.to_string() });
        };
        return parse_struct_body(body, depth);
    }
    if let Some(rest) = text.strip_prefix("ref<") {
        let Some(digits) = rest.strip_suffix('>') else {
            return Err(TypeParseError::Unbalanced { text: text.to_string() });
        };
        let ptr = digits
            .parse::<u32>()
            .map_err(|_| TypeParseError::Unsupported { text: text.to_string() })?;
        return Ok(TypeDescriptor::Reference(ptr));
    }
    parse_primitive(text)
}

fn parse_primitive(text: &str) -> Result<TypeDescriptor, TypeParseError> {
    let descriptor = match text {
        "bool" => TypeDescriptor::Bool,
        "string" => TypeDescriptor::Text,
        "bytes" => TypeDescriptor::Bytes,
        "address" => TypeDescriptor::Address,
        "u8" => TypeDescriptor::Uint(IntWidth::W8),
        "u16" => TypeDescriptor::Uint(IntWidth::W16),
        "u32" => TypeDescriptor::Uint(IntWidth::W32),
        "u64" => TypeDescriptor::Uint(IntWidth::W64),
        "u128" => TypeDescriptor::Uint(IntWidth::W128),
        "i8" => TypeDescriptor::Int(IntWidth::W8),
        "i16" => TypeDescriptor::Int(IntWidth::W16),
        "i32" => TypeDescriptor::Int(IntWidth::W32),
        "i64" => TypeDescriptor::Int(IntWidth::W64),
        "i128" => TypeDescriptor::Int(IntWidth::W128),
        other => {
            return Err(TypeParseError::Unsupported {
                text: other.to_string(),
            });
        }
    };
    Ok(descriptor)
}

/// 在 `map[` 之后的剩余文本中定位与开括号配对的 `]`，返回其字节偏移。
fn matching_square_bracket(rest: &str, whole: &str) -> Result<usize, TypeParseError> {
    let mut depth = 1usize;
    for (offset, ch) in rest.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(offset);
                }
            }
            _ => {}
        }
    }
    Err(TypeParseError::Unbalanced {
        text: whole.to_string(),
    })
}

/// 解析 `struct{...}` 的花括号内部，字段序号按出现位置分配。
fn parse_struct_body(body: &str, depth: usize) -> Result<TypeDescriptor, TypeParseError> {
    let mut fields = Vec::new();
    if body.is_empty() {
        return Ok(TypeDescriptor::Struct(fields));
    }
    for (position, chunk) in split_top_level(body, ',').into_iter().enumerate() {
        let Some(colon) = top_level_byte_offset(chunk, ':') else {
            return Err(TypeParseError::Unsupported {
                text: chunk.to_string(),
            });
        };
        let name = &chunk[..colon];
        let ty_text = &chunk[colon + 1..];
        if !is_valid_field_name(name) {
            return Err(TypeParseError::Unsupported {
                text: chunk.to_string(),
            });
        }
        fields.push(TypeField {
            index: position as u32,
            name: name.to_string(),
            ty: parse_type(ty_text, depth + 1)?,
        });
    }
    Ok(TypeDescriptor::Struct(fields))
}

/// 按顶层分隔符切分文本，嵌套括号（`[]`、`{}`、`<>`）内的分隔符不生效。
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut square = 0usize;
    let mut brace = 0usize;
    let mut angle = 0usize;
    let mut start = 0usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '{' => brace += 1,
            '}' => brace = brace.saturating_sub(1),
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            ch if ch == separator && square == 0 && brace == 0 && angle == 0 => {
                chunks.push(&text[start..offset]);
                start = offset + separator.len_utf8();
            }
            _ => {}
        }
    }
    chunks.push(&text[start..]);
    chunks
}

/// 返回首个位于顶层（不在任何括号内）的目标字符的字节偏移。
fn top_level_byte_offset(text: &str, target: char) -> Option<usize> {
    let mut square = 0usize;
    let mut brace = 0usize;
    let mut angle = 0usize;
    for (offset, ch) in text.char_indices() {
        match ch {
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '{' => brace += 1,
            '}' => brace = brace.saturating_sub(1),
            '<' => angle += 1,
            '>' => angle = angle.saturating_sub(1),
            ch if ch == target && square == 0 && brace == 0 && angle == 0 => {
                return Some(offset);
            }
            _ => {}
        }
    }
    None
}
