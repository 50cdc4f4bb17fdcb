//! 大端字节游标：受检读取与确定性写入。
//!
//! # 教案定位（Why）
//! - 清单与标识符两条编解码路径共享同一套字节访问原语，截断判定只存在一种实现，回归测试只需覆盖一处。
//! - 读取越界是二进制解码最常见的故障面，将“先查长度、再取字节”的纪律固化进 [`WireReader`]，上层代码不再出现裸切片索引。
//!
//! # 契约说明（What）
//! - [`WireReader`] 的每个读取方法要么返回完整数据，要么返回 [`WireError::Truncated`]，绝不 panic、绝不读过末尾。
//! - [`WireWriter`] 只追加不回写，相同的调用序列产出逐字节相同的结果，这是上层“规范编码”性质的基础。
//!
//! # 设计考量（How）
//! - 多字节整数固定大端序，长度前缀固定 `u32`，与跨语言实现互通时无字节序歧义。
//! - 变宽整数读写以字节宽度参数化（1/2/4/8/16），由调用方的类型描述符决定宽度，本层不做取值范围裁决。

use alloc::vec::Vec;
use core::fmt;

/// 字节游标层的错误。
///
/// ## 契约定义（What）
/// - 所有分支均表示“当前载荷无法按请求完成读写”，调用方不得继续使用半成品输出。
/// - 分支携带定位用的数量信息，便于测试直接断言具体错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// 剩余字节不足以完成本次读取。
    Truncated {
        /// 本次读取需要的字节数。
        needed: usize,
        /// 游标处剩余的字节数。
        remaining: usize,
    },
    /// 待写入的长度前缀超出 `u32` 可表达的范围。
    LengthOverflow {
        /// 实际长度。
        len: usize,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => {
                write!(f, "需要 {needed} 字节，但仅剩 {remaining} 字节")
            }
            Self::LengthOverflow { len } => {
                write!(f, "长度 {len} 超出 u32 前缀的表达范围")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}

/// 只读字节游标，所有读取先检查剩余长度。
///
/// ### 设计意图（Why）
/// - 将偏移量推进与边界检查绑定在一个结构里，上层解码器专注字段语义，不再手写 `offset + n <= len` 之类的判断。
///
/// ### 契约描述（What）
/// - **输入**：构造时借用完整载荷切片，生命周期与载荷一致。
/// - **输出**：`read_exact` 返回指向原载荷的子切片，零拷贝；整数读取返回值语义。
/// - **后置条件**：读取成功后游标前进对应字节数；失败时游标位置保持不变。
///
/// ### 实现说明（How）
/// - 内部仅维护 `(buf, pos)` 二元组；`remaining` 恒等于 `buf.len() - pos`。
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// 基于完整载荷构造游标，初始位置为 0。
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// 返回尚未读取的字节数。
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// 判断载荷是否已读空。
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 返回当前游标位置（自载荷起点的字节偏移）。
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// 读取 `len` 字节并以原载荷子切片的形式返回。
    pub fn read_exact(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(WireError::Truncated {
                needed: len,
                remaining,
            });
        }
        let chunk = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(chunk)
    }

    /// 读取单个字节。
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        let chunk = self.read_exact(1)?;
        Ok(chunk[0])
    }

    /// 读取大端 `u32`。
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let chunk = self.read_exact(4)?;
        Ok(u32::from_be_bytes(
            chunk.try_into().expect("切片长度固定为 4"),
        ))
    }

    /// 按 `width` 字节宽度读取大端无符号整数。
    ///
    /// ### 契约定义（What）
    /// - **输入**：`width` 为 1..=16 的字节宽度，由调用方的类型描述符给出。
    /// - **输出**：以 `u128` 承载的取值；宽度不足 16 字节时高位为零。
    pub fn read_uint(&mut self, width: usize) -> Result<u128, WireError> {
        debug_assert!(width >= 1 && width <= 16, "整数宽度必须在 1..=16 字节内");
        let chunk = self.read_exact(width)?;
        let mut value = 0u128;
        for byte in chunk {
            value = (value << 8) | u128::from(*byte);
        }
        Ok(value)
    }

    /// 按 `width` 字节宽度读取大端二补码有符号整数。
    pub fn read_int(&mut self, width: usize) -> Result<i128, WireError> {
        let raw = self.read_uint(width)?;
        let bits = (width as u32) * 8;
        if bits == 128 {
            return Ok(raw as i128);
        }
        let sign_bit = 1u128 << (bits - 1);
        if raw & sign_bit != 0 {
            Ok((raw | (u128::MAX << bits)) as i128)
        } else {
            Ok(raw as i128)
        }
    }

    /// 读取 `u32` 长度前缀，再按该长度返回载荷子切片。
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_u32()? as usize;
        self.read_exact(len)
    }
}

/// 追加式写入器，产出确定性的字节序列。
///
/// ### 契约描述（What）
/// - 只提供追加操作，不提供回写与截断；`into_vec` 取走全部已写字节。
/// - 相同调用序列产出逐字节相同的 `Vec<u8>`。
///
/// ### 实现说明（How）
/// - 变宽整数写入复用 `to_be_bytes` 的低位窗口，取值范围由调用方预先校验。
#[derive(Debug, Default)]
pub struct WireWriter {
    out: Vec<u8>,
}

impl WireWriter {
    /// 构造空的写入器。
    #[must_use]
    pub const fn new() -> Self {
        Self { out: Vec::new() }
    }

    /// 返回已写入的字节数。
    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// 判断是否尚未写入任何字节。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// 追加单个字节。
    pub fn put_u8(&mut self, value: u8) {
        self.out.push(value);
    }

    /// 追加大端 `u32`。
    pub fn put_u32(&mut self, value: u32) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    /// 追加原始字节序列，不带任何前缀。
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// 按 `width` 字节宽度追加大端无符号整数。
    ///
    /// 取值必须已在调用方校验为宽度可容纳，本方法只截取低位字节窗口。
    pub fn put_uint(&mut self, value: u128, width: usize) {
        debug_assert!(width >= 1 && width <= 16, "整数宽度必须在 1..=16 字节内");
        let bytes = value.to_be_bytes();
        self.out.extend_from_slice(&bytes[16 - width..]);
    }

    /// 按 `width` 字节宽度追加大端二补码有符号整数。
    pub fn put_int(&mut self, value: i128, width: usize) {
        debug_assert!(width >= 1 && width <= 16, "整数宽度必须在 1..=16 字节内");
        let bytes = value.to_be_bytes();
        self.out.extend_from_slice(&bytes[16 - width..]);
    }

    /// 追加 `u32` 长度前缀再追加载荷本体。
    pub fn put_len_prefixed(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| WireError::LengthOverflow { len: bytes.len() })?;
        self.put_u32(len);
        self.out.extend_from_slice(bytes);
        Ok(())
    }

    /// 取走全部已写字节。
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.out
    }

    /// 以只读切片查看已写字节。
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.out
    }
}
