//! 同步原语封装
//!
//! 调度器的两个执行上下文 (tick 中断 与 主循环) 共享同一个队列，
//! 所有结构性修改都必须在临界区内完成。统一使用 CriticalSectionRawMutex，
//! 以确保在单核/双核、裸机/主机环境下的正确性

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

// ===== 类型别名: 简化使用 =====

/// 临界区阻塞互斥锁 - 中断与主循环共享的可变状态
///
/// `lock` 期间屏蔽中断 (主机端为全局锁)，闭包返回即释放。
/// 内部可变性由 `RefCell` 提供。
///
/// # Example
/// ```ignore
/// static STATE: CriticalBlockingMutex<u32> = CriticalBlockingMutex::new(RefCell::new(0));
///
/// STATE.lock(|cell| *cell.borrow_mut() += 1);
/// ```
pub type CriticalBlockingMutex<T> = Mutex<CriticalSectionRawMutex, RefCell<T>>;

/// 创建新的阻塞互斥锁
#[inline]
pub const fn new_blocking_mutex<T>(value: T) -> CriticalBlockingMutex<T> {
    Mutex::new(RefCell::new(value))
}

// ===== 优化的原子操作封装 =====

use portable_atomic::{AtomicU64, Ordering};

/// 原子计数器 - 用于 tick 计数和统计
///
/// 部分目标 (如 Xtensa、Cortex-M0) 不原生支持 64 位原子，由 portable_atomic 兜底
pub struct AtomicCounter {
    count: AtomicU64,
}

impl AtomicCounter {
    /// 创建新的计数器
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
        }
    }

    /// 增加并返回新值
    #[inline(always)]
    pub fn increment(&self) -> u64 {
        self.count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 获取当前值
    #[inline(always)]
    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// 重置为 0
    #[inline(always)]
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increment_reset() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
        counter.reset();
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_blocking_mutex_roundtrip() {
        let state: CriticalBlockingMutex<u32> = new_blocking_mutex(1);
        state.lock(|cell| *cell.borrow_mut() += 41);
        assert_eq!(state.lock(|cell| *cell.borrow()), 42);
    }
}
