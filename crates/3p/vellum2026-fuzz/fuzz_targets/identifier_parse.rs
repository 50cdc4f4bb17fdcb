#![no_main]

use libfuzzer_sys::fuzz_target;
use vellum2026_fuzz::run_identifier_parse;

// 参与者标识符解析入口。
//
// - **Why**：标识符同时有字节与十六进制文本两种入口，口径漂移会让校验结果依赖调用路径。
// - **How**：同一份字节依次走字节构造器与文本解析器，由 [`run_identifier_parse`]
//   断言构造器与探针、字节形态与文本形态两两一致。
// - **What**：输入任意字节即可；非 UTF-8 输入自动跳过文本臂。
fuzz_target!(|data: &[u8]| {
    run_identifier_parse(data);
});
