//! 同步原语模块
//!
//! 提供中断安全的同步原语，基于 embassy-sync / critical-section 封装:
//! - `CriticalBlockingMutex`: 临界区阻塞互斥锁
//! - `AtomicCounter`: 64 位原子计数器

pub mod primitives;

pub use primitives::{AtomicCounter, CriticalBlockingMutex};
