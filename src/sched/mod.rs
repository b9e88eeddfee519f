//! 调度器模块
//!
//! - `task`: 任务 id、回调抽象与任务记录
//! - `queue`: 增量延迟队列 (O(1) tick)
//! - `scheduler`: 调度器上下文、tick 入口与主循环分发
//! - `error`: 错误类型与单槽错误寄存器

pub mod error;
pub mod queue;
pub mod scheduler;
pub mod task;

pub use error::{ErrorRegister, SchedError};
pub use queue::{DeltaQueue, Pending};
pub use scheduler::{DefaultScheduler, Scheduler, SchedulerStats};
pub use task::{Job, TaskId, TaskRecord};
