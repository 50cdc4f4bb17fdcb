//! vellum2026-fuzz 公共支持库。
//!
//! # 教案式定位
//! - **Why**：把各 fuzz target 的执行逻辑集中为纯函数，fuzz 运行时与常规 `cargo test`
//!   回归共享同一套断言，语料在 CI 中无需 libFuzzer 即可重放。
//! - **What**：暴露 [`exercise`] 模块的三个入口——清单解码、调用数据解码、标识符解析，
//!   每个入口接收任意字节并在内部完成差分断言。
//! - **How**：入口只依赖三枚 `vellum-*` crate 的公开门面，断言聚焦"严格解码即规范编码"
//!   的定点律与构造器/探针口径一致性。
extern crate alloc;

pub mod exercise;

pub use exercise::{run_calldata_decode, run_identifier_parse, run_manifest_decode};
