//! 条件编译日志系统
//!
//! 根据 feature 选择不同的日志后端:
//! - `log-defmt`: 使用 defmt (高效二进制日志)
//! - `log`: 使用 log facade (主机端或任意 log 实现)
//! - 默认: 完全禁用日志 (零开销，参数仍做类型检查)
//!
//! # 日志级别
//! - `log_error!`: 错误信息
//! - `log_warn!`: 警告信息
//! - `log_info!`: 一般信息
//! - `log_debug!`: 调试信息
//! - `log_trace!`: 详细跟踪
//!
//! 格式串只使用 `{}` / `{:?}`，两个后端均支持。

// ===================================================================
// defmt 后端 (feature = "log-defmt")
// ===================================================================
#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

// ===================================================================
// log facade 后端 (feature = "log")
// ===================================================================
#[cfg(all(feature = "log", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { ::log::info!($($arg)*) };
}

#[cfg(all(feature = "log", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::log::debug!($($arg)*) };
}

#[cfg(all(feature = "log", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::log::warn!($($arg)*) };
}

#[cfg(all(feature = "log", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { ::log::error!($($arg)*) };
}

#[cfg(all(feature = "log", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::log::trace!($($arg)*) };
}

// ===================================================================
// 空实现 (无日志 feature)
// ===================================================================
#[cfg(not(any(feature = "log", feature = "log-defmt")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if false { $crate::util::log::discard(::core::format_args!($($arg)*)); }
    };
}

#[cfg(not(any(feature = "log", feature = "log-defmt")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if false { $crate::util::log::discard(::core::format_args!($($arg)*)); }
    };
}

#[cfg(not(any(feature = "log", feature = "log-defmt")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if false { $crate::util::log::discard(::core::format_args!($($arg)*)); }
    };
}

#[cfg(not(any(feature = "log", feature = "log-defmt")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if false { $crate::util::log::discard(::core::format_args!($($arg)*)); }
    };
}

#[cfg(not(any(feature = "log", feature = "log-defmt")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        if false { $crate::util::log::discard(::core::format_args!($($arg)*)); }
    };
}

/// 空后端的参数接收器 (只为让参数参与类型检查)
#[doc(hidden)]
#[inline(always)]
pub fn discard(_args: core::fmt::Arguments<'_>) {}

// ===================================================================
// 便捷重导出
// ===================================================================
pub use log_info;
pub use log_debug;
pub use log_warn;
pub use log_error;
pub use log_trace;

// ===================================================================
// 断言宏 (release 模式下可配置)
// ===================================================================

/// Debug 断言 (仅在 debug 模式下检查)
#[macro_export]
macro_rules! debug_assert_msg {
    ($cond:expr, $($arg:tt)*) => {
        #[cfg(debug_assertions)]
        {
            if !$cond {
                $crate::log_error!($($arg)*);
                panic!("Assertion failed");
            }
        }
    };
}

pub use debug_assert_msg;
