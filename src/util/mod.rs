//! 工具模块
//!
//! - `log`: 条件编译日志宏与调试断言

pub mod log;
