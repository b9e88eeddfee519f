//! deltasched - 资源受限系统的协作式任务调度器
//!
//! 本库提供以下核心功能:
//! - 增量延迟队列: tick 中断 O(1)，与任务数量无关
//! - 协作式分发: 主循环中按到期顺序执行任务，周期任务原地重新排队
//! - 临界区保护: tick 中断与主循环之间无撕裂读写
//! - 条件编译日志系统
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use deltasched::DefaultScheduler;
//!
//! static SCHED: DefaultScheduler<'static> = DefaultScheduler::new();
//! static HEARTBEAT: fn() = heartbeat;
//!
//! SCHED.init();
//! SCHED.add_task(&HEARTBEAT, 0, 100).ok();   // 每秒一次 (100 × 10 ms)
//!
//! // 10 ms 定时器中断: SCHED.advance();
//! loop {
//!     SCHED.dispatch();
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod sched;
pub mod sync;
pub mod util;

// ===== 重导出常用类型 =====
pub use sched::{
    DefaultScheduler,
    Job,
    Pending,
    SchedError,
    Scheduler,
    SchedulerStats,
    TaskId,
};

// ===== 版本信息 =====
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 系统配置常量
///
/// tick 周期是固定的系统常量，部署时需与定时器配置一致。
pub mod config {
    /// tick 周期 (毫秒)
    pub const TICK_MS: u32 = 10;

    /// 默认最大任务数 (`DefaultScheduler` 的槽位数量)
    pub const MAX_TASKS: usize = 40;

    /// "无任务" 的原始 id
    pub const NO_TASK_ID: u32 = 0;
}
