#![no_main]

use libfuzzer_sys::fuzz_target;
use vellum2026_fuzz::run_calldata_decode;

// 调用数据解码入口。
//
// - **Why**：调用数据无外层信封，截断与形态冲突全靠字段内核裁决，需要独立的搜索面。
// - **How**：首字节选择字段表样本（含引用表），余下字节作载荷交给 [`run_calldata_decode`]。
// - **What**：被接受的载荷必须回编为逐字节相同的产物，否则断言失败。
fuzz_target!(|data: &[u8]| {
    run_calldata_decode(data);
});
