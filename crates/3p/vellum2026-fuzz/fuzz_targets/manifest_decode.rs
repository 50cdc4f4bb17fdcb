#![no_main]

use libfuzzer_sys::fuzz_target;
use vellum2026_fuzz::run_manifest_decode;

// 清单二进制解码入口。
//
// - **Why**：解码器面向不可信字节，必须在任意输入下既不崩溃也不接受非规范编码。
// - **How**：字节直接交给 [`run_manifest_decode`]，其内部对被接受的输入断言回编定点。
// - **What**：输入任意字节即可；被拒绝的输入静默返回，扩大 fuzzer 的搜索空间。
fuzz_target!(|data: &[u8]| {
    run_manifest_decode(data);
});
