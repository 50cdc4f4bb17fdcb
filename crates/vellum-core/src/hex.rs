//! `0x` 前缀十六进制文本的统一出入口。
//!
//! # 教案定位（Why）
//! - 标识符文本形态与常量载荷镜像都以 `0x` 前缀小写十六进制示人，前缀处理与大小写规范只应存在一份实现。
//! - 字节与 nibble 的转换交给 `hex` crate，本模块只负责前缀语义，避免重复造轮子。
//!
//! # 契约说明（What）
//! - [`encode_prefixed`] 恒输出小写并带 `0x` 前缀；空输入输出 `"0x"`。
//! - [`decode_flexible`] 接受带 `0x`/`0X` 前缀或裸写的十六进制，大小写不敏感；错误原样透出 [`FromHexError`]。

use alloc::{string::String, vec::Vec};

pub use ::hex::FromHexError;

/// 将字节编码为带 `0x` 前缀的小写十六进制文本。
#[must_use]
pub fn encode_prefixed(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(2 + bytes.len() * 2);
    text.push_str("0x");
    text.push_str(&::hex::encode(bytes));
    text
}

/// 去掉文本开头的 `0x`/`0X` 前缀；没有前缀时原样返回。
#[must_use]
pub fn strip_prefix(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("0x") {
        rest
    } else if let Some(rest) = text.strip_prefix("0X") {
        rest
    } else {
        text
    }
}

/// 解码十六进制文本，前缀可有可无。
pub fn decode_flexible(text: &str) -> Result<Vec<u8>, FromHexError> {
    ::hex::decode(strip_prefix(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn encode_always_prefixes_lowercase() {
        assert_eq!(encode_prefixed(&[]), "0x");
        assert_eq!(encode_prefixed(&[0xde, 0xad, 0x01]), "0xdead01");
    }

    #[test]
    fn decode_accepts_prefixed_and_bare() {
        assert_eq!(decode_flexible("0xdead01").expect("合法输入"), vec![0xde, 0xad, 0x01]);
        assert_eq!(decode_flexible("0XDEAD01").expect("大写前缀与大写位"), vec![0xde, 0xad, 0x01]);
        assert_eq!(decode_flexible("dead01").expect("裸写输入"), vec![0xde, 0xad, 0x01]);
        assert_eq!(decode_flexible("0x").expect("空载荷"), Vec::<u8>::new());
        assert_eq!(decode_flexible("").expect("空字符串"), Vec::<u8>::new());
    }

    #[test]
    fn decode_reports_bad_digits_and_odd_length() {
        assert!(matches!(
            decode_flexible("0xzz"),
            Err(FromHexError::InvalidHexCharacter { c: 'z', index: 0 })
        ));
        assert!(matches!(decode_flexible("abc"), Err(FromHexError::OddLength)));
    }
}
