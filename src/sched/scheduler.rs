//! 协作式调度器
//!
//! 两个执行上下文共享同一个队列:
//! - tick 中断: 固定周期调用 [`Scheduler::advance`] (O(1)，不阻塞)
//! - 主循环: 反复调用 [`Scheduler::dispatch`]，以及 `add_task` / `delete_task`
//!
//! 每次结构性修改都在一个尽量短的临界区内完成；任务回调在临界区之外执行，
//! 因此回调内部可以再次调用 `add_task` / `delete_task` / `init`。
//!
//! # 示例
//!
//! ```rust,ignore
//! use deltasched::{DefaultScheduler, Job};
//!
//! static SCHED: DefaultScheduler<'static> = DefaultScheduler::new();
//! static BLINK: fn() = toggle_led;
//!
//! SCHED.add_task(&BLINK, 0, 50)?;   // 立即执行，之后每 50 tick
//!
//! // 定时器中断 (10 ms)
//! fn on_timer() { SCHED.advance(); }
//!
//! // 主循环
//! loop { SCHED.dispatch(); }
//! ```

use crate::config::{MAX_TASKS, TICK_MS};
use crate::sync::primitives::{new_blocking_mutex, AtomicCounter, CriticalBlockingMutex};
use crate::util::log::*;

use super::error::{ErrorRegister, SchedError};
use super::queue::{DeltaQueue, Pending};
use super::task::{Job, TaskId, TaskRecord};

/// 默认容量的调度器
pub type DefaultScheduler<'a> = Scheduler<'a, MAX_TASKS>;

/// 正在执行的任务 (已出队，槽位仍被占用)
#[derive(Clone, Copy)]
struct Running {
    slot: u16,
    id: TaskId,
    /// 执行期间被删除: 槽位已归还，不再重新排队
    cancelled: bool,
}

/// 受临界区保护的调度器状态
struct State<'a, const N: usize> {
    queue: DeltaQueue<'a, N>,
    /// 下一个分配的 id (从 1 开始)
    next_id: u32,
    running: Option<Running>,
    dispatched: u64,
    overruns: u64,
}

impl<'a, const N: usize> State<'a, N> {
    const fn new() -> Self {
        Self {
            queue: DeltaQueue::new(),
            next_id: 1,
            running: None,
            dispatched: 0,
            overruns: 0,
        }
    }

    /// 分配下一个 id
    ///
    /// 计数器回绕时跳过 0；回绕后与仍存活的任务 id 冲突的情况不做处理。
    fn bump_id(&mut self) {
        self.next_id = match self.next_id.wrapping_add(1) {
            0 => 1,
            next => next,
        };
    }
}

/// 一次出队的结果
enum Step<'a> {
    Run(TaskRecord<'a>),
    Idle,
    Nested,
}

/// 调度器统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// 累计执行的任务次数
    pub dispatched: u64,
    /// 队首已到期时到达的 tick 数 (dispatch 来不及)
    pub overruns: u64,
    /// 当前排队任务数
    pub queued: usize,
    /// 容量
    pub capacity: usize,
}

/// 协作式 delta-queue 调度器
///
/// # 类型参数
///
/// - `'a`: 任务回调的生命周期 (`static` 调度器使用 `'static`)
/// - `N`: 最大任务数
pub struct Scheduler<'a, const N: usize> {
    state: CriticalBlockingMutex<State<'a, N>>,
    ticks: AtomicCounter,
    errors: ErrorRegister,
}

impl<'a, const N: usize> Scheduler<'a, N> {
    /// 创建空调度器，可放入 `static`
    pub const fn new() -> Self {
        Self {
            state: new_blocking_mutex(State::new()),
            ticks: AtomicCounter::new(),
            errors: ErrorRegister::new(),
        }
    }

    /// 复位: 清空队列，tick 计数与 id 计数归零，清除错误寄存器
    ///
    /// 幂等。在任务回调中调用时，正在执行的任务不会被重新排队。
    pub fn init(&self) {
        self.state.lock(|cell| {
            *cell.borrow_mut() = State::new();
            self.ticks.reset();
        });
        self.errors.clear();
        log_info!("Scheduler initialised (capacity {}, tick {} ms)", N, TICK_MS);
    }

    /// tick 中断入口
    ///
    /// O(1)，可在中断上下文调用。队首已到期时本次 tick 不会推进队列，
    /// 计为一次 overrun。
    pub fn advance(&self) {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            if !state.queue.advance() && !state.queue.is_empty() {
                state.overruns += 1;
                log_trace!("Tick absorbed by due head ({} overruns)", state.overruns);
            }
            self.ticks.increment();
        });
    }

    /// 主循环入口: 执行所有已到期的任务
    ///
    /// 逐个摘下到期的队首并在临界区外执行；周期任务执行完毕后以
    /// `period` 为延迟原地重新排队。返回本次执行的任务数。
    ///
    /// 不可重入: 在任务回调中调用会直接返回 0。
    pub fn dispatch(&self) -> usize {
        let mut ran = 0;

        loop {
            let step = self.state.lock(|cell| {
                let mut state = cell.borrow_mut();
                if state.running.is_some() {
                    return Step::Nested;
                }
                match state.queue.pop_due() {
                    Some((slot, record)) => {
                        state.running = Some(Running {
                            slot,
                            id: record.id,
                            cancelled: false,
                        });
                        Step::Run(record)
                    }
                    None => Step::Idle,
                }
            });

            let record = match step {
                Step::Run(record) => record,
                Step::Idle => break,
                Step::Nested => {
                    log_error!("dispatch() called from inside a task; ignored");
                    break;
                }
            };

            record.job.run();
            ran += 1;

            self.state.lock(|cell| Self::finish(&mut cell.borrow_mut(), record));
        }

        ran
    }

    /// 任务执行完毕: 周期任务原地重新排队，其余归还槽位
    fn finish(state: &mut State<'a, N>, record: TaskRecord<'a>) {
        // running 为空说明回调中调用了 init()，槽位已随队列一起复位
        let Some(run) = state.running.take() else {
            return;
        };
        state.dispatched += 1;

        // 执行期间被删除: 槽位已归还，可能已被回调中新加的任务占用
        if run.cancelled {
            return;
        }

        if record.is_periodic() {
            let relinked = state.queue.relink(run.slot, record.period);
            debug_assert_msg!(relinked, "Running slot {} could not be relinked", run.slot);
        } else {
            let _ = state.queue.release(run.slot);
        }
    }

    /// 添加任务
    ///
    /// `delay`: 首次执行前的 tick 数；`period`: 之后的执行间隔，0 表示一次性任务。
    /// 失败时同时写入错误寄存器。
    pub fn add_task(&self, job: &'a dyn Job, delay: u32, period: u32) -> Result<TaskId, SchedError> {
        let result = self.state.lock(|cell| -> Result<TaskId, SchedError> {
            let mut state = cell.borrow_mut();
            let id = TaskId::from_raw(state.next_id).ok_or(SchedError::CapacityExhausted)?;
            state.queue.insert(TaskRecord::new(id, job, period), delay)?;
            state.bump_id();
            Ok(id)
        });

        match result {
            Ok(id) => log_debug!("Task {} added (delay {}, period {})", id, delay, period),
            Err(err) => {
                self.errors.record(err);
                log_warn!("Add task failed: {}", err);
            }
        }
        result
    }

    /// 删除任务
    ///
    /// 排队中的任务立即移除；正在执行的任务 (回调内删除自己) 不再重新排队。
    /// 未知 id 或已执行完毕的一次性任务返回 `TaskNotFound`。
    pub fn delete_task(&self, id: TaskId) -> Result<(), SchedError> {
        let result = self.state.lock(|cell| -> Result<(), SchedError> {
            let mut state = cell.borrow_mut();
            if state.queue.remove(id).is_ok() {
                return Ok(());
            }
            // 正在执行的任务: 立即归还槽位，finish 不再触碰它
            let running = state.running;
            match running {
                Some(run) if run.id == id && !run.cancelled => {
                    state.running = Some(Running { cancelled: true, ..run });
                    let _ = state.queue.release(run.slot);
                    Ok(())
                }
                _ => Err(SchedError::TaskNotFound),
            }
        });

        match result {
            Ok(()) => log_debug!("Task {} deleted", id),
            Err(err) => {
                self.errors.record(err);
                log_warn!("Delete task {} failed: {}", id, err);
            }
        }
        result
    }

    /// 按原始 id 删除 (`NO_TASK_ID` 视为未找到)
    pub fn delete_raw(&self, raw: u32) -> Result<(), SchedError> {
        match TaskId::from_raw(raw) {
            Some(id) => self.delete_task(id),
            None => {
                self.errors.record(SchedError::TaskNotFound);
                Err(SchedError::TaskNotFound)
            }
        }
    }

    /// 启动以来的 tick 数
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// 当前时间 (毫秒) = tick 数 × `TICK_MS`
    #[inline]
    pub fn current_time_ms(&self) -> u64 {
        self.ticks.get() * u64::from(TICK_MS)
    }

    /// 读取并清除最近一次错误
    #[inline]
    pub fn error_code(&self) -> Option<SchedError> {
        self.errors.take()
    }

    /// 排队中的任务数
    pub fn len(&self) -> usize {
        self.state.lock(|cell| cell.borrow().queue.len())
    }

    /// 是否没有排队任务
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 距下一个任务到期的 tick 数 (空闲/休眠决策用)
    pub fn next_due(&self) -> Option<u32> {
        self.state.lock(|cell| cell.borrow().queue.next_due())
    }

    /// 任务是否仍在排队
    pub fn contains(&self, id: TaskId) -> bool {
        self.state.lock(|cell| cell.borrow().queue.contains(id))
    }

    /// 待执行任务快照 (按触发顺序)
    pub fn pending(&self) -> heapless::Vec<Pending, N> {
        self.state.lock(|cell| cell.borrow().queue.pending())
    }

    /// 获取统计信息
    pub fn stats(&self) -> SchedulerStats {
        self.state.lock(|cell| {
            let state = cell.borrow();
            SchedulerStats {
                dispatched: state.dispatched,
                overruns: state.overruns,
                queued: state.queue.len(),
                capacity: state.queue.capacity(),
            }
        })
    }
}

impl<const N: usize> Default for Scheduler<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
