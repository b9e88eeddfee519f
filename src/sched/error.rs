//! 调度器错误类型与错误寄存器
//!
//! 每个操作都通过 `Result` 返回自己的失败；`ErrorRegister` 只是辅助的
//! "最近一次错误" 诊断通道: 新错误覆盖旧错误，读取即清除。

use core::fmt;

use portable_atomic::{AtomicU8, Ordering};

/// 调度器错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "log-defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SchedError {
    /// 任务槽位已满
    CapacityExhausted = 1,
    /// 未找到任务 (未知 id，或一次性任务已执行完毕)
    TaskNotFound = 2,
}

impl SchedError {
    /// 数值错误码 (与显示面板/上位机协议一致)
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// 由错误码还原，0 或未知码返回 None
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SchedError::CapacityExhausted),
            2 => Some(SchedError::TaskNotFound),
            _ => None,
        }
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::CapacityExhausted => f.write_str("too many tasks"),
            SchedError::TaskNotFound => f.write_str("cannot delete task"),
        }
    }
}

/// 单槽错误寄存器
///
/// 0 表示无错误。可在中断和主循环中同时访问。
pub struct ErrorRegister {
    code: AtomicU8,
}

impl ErrorRegister {
    /// 创建空寄存器
    pub const fn new() -> Self {
        Self {
            code: AtomicU8::new(0),
        }
    }

    /// 记录错误 (覆盖之前未读取的错误)
    #[inline(always)]
    pub fn record(&self, err: SchedError) {
        self.code.store(err.code(), Ordering::Release);
    }

    /// 读取并清除
    #[inline(always)]
    pub fn take(&self) -> Option<SchedError> {
        SchedError::from_code(self.code.swap(0, Ordering::AcqRel))
    }

    /// 清除
    #[inline(always)]
    pub fn clear(&self) {
        self.code.store(0, Ordering::Release);
    }
}

impl Default for ErrorRegister {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SchedError::CapacityExhausted.code(), 1);
        assert_eq!(SchedError::TaskNotFound.code(), 2);
        assert_eq!(SchedError::from_code(0), None);
        assert_eq!(SchedError::from_code(2), Some(SchedError::TaskNotFound));
        assert_eq!(SchedError::from_code(9), None);
    }

    #[test]
    fn test_register_read_clears() {
        let reg = ErrorRegister::new();
        assert_eq!(reg.take(), None);

        reg.record(SchedError::TaskNotFound);
        assert_eq!(reg.take(), Some(SchedError::TaskNotFound));
        assert_eq!(reg.take(), None);
    }

    #[test]
    fn test_register_latest_wins() {
        let reg = ErrorRegister::new();
        reg.record(SchedError::TaskNotFound);
        reg.record(SchedError::CapacityExhausted);
        assert_eq!(reg.take(), Some(SchedError::CapacityExhausted));
        assert_eq!(reg.take(), None);
    }
}
