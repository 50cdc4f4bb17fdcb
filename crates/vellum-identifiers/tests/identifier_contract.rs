//! 参与者标识符的对外契约回归。
//!
//! # 教案级注释概览
//!
//! - **核心目标 (Why)**：以黑盒视角锁定标识符的三条公开承诺——构造即校验、构造后不可变、
//!   文本形态规范且可逆。内部布局细节的单元测试在 `src/participant.rs` 中，本文件只看对外行为。
//! - **覆盖策略 (How)**：先用确定性样例覆盖边界（区位 0..=3 与 4..=15、长度 31/32/33、前缀有无），
//!   再用 Proptest 把"任意合法布局都能文本往返"的性质推广到随机输入。
//! - **契约来源 (What)**：与 `vellum-codec-manifest` 对 `address` 值的解码路径共享同一套构造入口，
//!   此处的任何断言松动都会直接放大为清单编解码的行为偏差。

use proptest::prelude::*;
use vellum_identifiers::{IdentifierError, NetworkZone, ParticipantId, is_valid_address};

/// 四个网络区各构造一枚标识符，确认访问器逐项还原装配参数。
#[test]
fn parts_roundtrip_across_all_zones() {
    for (zone, variant) in [
        (NetworkZone::Zone0, 0u32),
        (NetworkZone::Zone1, 1),
        (NetworkZone::Zone2, u32::MAX),
        (NetworkZone::Zone3, 0x0102_0304),
    ] {
        let fingerprint = [zone.as_u8(); ParticipantId::FINGERPRINT_LENGTH];
        let id = ParticipantId::from_parts(zone, fingerprint, variant);
        assert_eq!(id.zone(), zone);
        assert_eq!(id.fingerprint(), fingerprint);
        assert_eq!(id.variant(), variant);
    }
}

/// 越界区位在字节入口与文本入口表现一致。
#[test]
fn invalid_zone_is_rejected_on_every_entry() {
    let mut bytes = [0u8; ParticipantId::LENGTH];
    bytes[0] = 0x40;
    let expected = Err(IdentifierError::InvalidNetworkZone { value: 4 });
    assert_eq!(ParticipantId::from_bytes(bytes), expected);
    assert_eq!(ParticipantId::from_slice(&bytes), expected.clone());

    let text = format!("0x40{}", "00".repeat(31));
    assert_eq!(ParticipantId::from_hex(&text), expected.clone());
    assert_eq!(
        ParticipantId::validate_hex(&text),
        Some(IdentifierError::InvalidNetworkZone { value: 4 })
    );
}

/// 标识符按值复制，副本与原件完全等价，不存在任何修改入口。
#[test]
fn copies_stay_equal() {
    let id = ParticipantId::from_parts(NetworkZone::Zone1, [9; 24], 42);
    let copy = id;
    assert_eq!(id, copy);
    assert_eq!(id.to_hex(), copy.to_hex());
}

/// 规范文本恰为 66 字符，`Display` 与 `to_hex` 输出一致。
#[test]
fn canonical_text_is_66_chars() {
    let id = ParticipantId::from_parts(NetworkZone::Zone2, [0xcd; 24], 7);
    let text = id.to_hex();
    assert_eq!(text.len(), 66);
    assert_eq!(format!("{id}"), text);
    assert!(is_valid_address(&text));
}

proptest! {
    /// 任意合法布局（区位 nibble 收敛到 0..=3）都能经文本形态无损往返。
    #[test]
    fn prop_hex_roundtrip(mut bytes in prop::array::uniform32(any::<u8>())) {
        bytes[0] &= 0x3f;
        let id = ParticipantId::from_bytes(bytes).expect("区位已收敛");
        let text = id.to_hex();
        prop_assert!(is_valid_address(&text));
        prop_assert_eq!(ParticipantId::from_hex(&text).expect("规范文本可逆"), id);
    }

    /// 任意越界 nibble（4..=15）在探针校验下都给出区位错误。
    #[test]
    fn prop_out_of_range_nibble_probes_as_zone_error(
        mut bytes in prop::array::uniform32(any::<u8>()),
        nibble in 4u8..=15,
    ) {
        bytes[0] = (nibble << 4) | (bytes[0] & 0x0f);
        prop_assert_eq!(
            ParticipantId::validate(&bytes),
            Some(IdentifierError::InvalidNetworkZone { value: nibble })
        );
    }
}
