//! 任务定义 — 身份、回调与周期
//!
//! 任务回调是 `&dyn Job`: 闭包、实现了 `Job` 的结构体、普通 `fn()` 都可以，
//! 因此任务可以携带自己的状态而不依赖全局变量。引用永不为空，
//! 空回调在类型层面就无法出现。

use core::fmt;
use core::num::NonZeroU32;

use crate::config::NO_TASK_ID;

/// 可调度的工作单元
///
/// 在主循环上下文中同步执行，必须快速返回 (协作式，不可阻塞)。
pub trait Job: Sync {
    /// 执行一次
    fn run(&self);
}

impl<F> Job for F
where
    F: Fn() + Sync,
{
    #[inline(always)]
    fn run(&self) {
        self()
    }
}

/// 任务 id
///
/// 从 1 开始单调分配；0 保留为 "无任务"，因此用 `NonZeroU32` 表示，
/// `Option<TaskId>` 与裸 `u32` 大小相同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(NonZeroU32);

impl TaskId {
    /// 由原始值构造，`NO_TASK_ID` 返回 None
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(TaskId(id)),
            None => None,
        }
    }

    /// 原始值
    #[inline]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// 将 `Option<TaskId>` 还原为原始值 (None → `NO_TASK_ID`)
    #[inline]
    pub fn raw_or_none(id: Option<TaskId>) -> u32 {
        id.map_or(NO_TASK_ID, TaskId::get)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(feature = "log-defmt")]
impl defmt::Format for TaskId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "#{}", self.0.get())
    }
}

/// 任务记录
///
/// `id`/`job`/`period` 在生命周期内不变。排队期间的相对延迟 (delta)
/// 存放在队列节点上，见 [`DeltaQueue`](super::queue::DeltaQueue)。
#[derive(Clone, Copy)]
pub struct TaskRecord<'a> {
    /// 任务 id
    pub id: TaskId,
    /// 任务回调
    pub job: &'a dyn Job,
    /// 周期 (tick)，0 = 一次性
    pub period: u32,
}

impl<'a> TaskRecord<'a> {
    /// 创建新的任务记录
    pub fn new(id: TaskId, job: &'a dyn Job, period: u32) -> Self {
        Self {
            id,
            job,
            period,
        }
    }

    /// 是否为周期任务
    #[inline(always)]
    pub fn is_periodic(&self) -> bool {
        self.period != 0
    }
}

impl fmt::Debug for TaskRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRecord")
            .field("id", &self.id)
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    struct Counter(AtomicU32);

    impl Job for Counter {
        fn run(&self) {
            self.0.fetch_add(10, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_task_id_zero_reserved() {
        assert_eq!(TaskId::from_raw(0), None);
        let id = TaskId::from_raw(7).unwrap();
        assert_eq!(id.get(), 7);
        assert_eq!(TaskId::raw_or_none(Some(id)), 7);
        assert_eq!(TaskId::raw_or_none(None), NO_TASK_ID);
        assert_eq!(core::mem::size_of::<Option<TaskId>>(), 4);
    }

    #[test]
    fn test_closure_and_struct_jobs() {
        let hits = AtomicU32::new(0);
        let closure = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let counter = Counter(AtomicU32::new(0));

        let jobs: [&dyn Job; 2] = [&closure, &counter];
        for job in jobs {
            job.run();
        }

        assert_eq!(hits.load(Ordering::Relaxed), 1);
        assert_eq!(counter.0.load(Ordering::Relaxed), 10);
    }

    #[test]
    fn test_record_periodic() {
        fn noop() {}
        let id = TaskId::from_raw(1).unwrap();
        assert!(!TaskRecord::new(id, &noop, 0).is_periodic());
        assert!(TaskRecord::new(id, &noop, 5).is_periodic());
    }
}
