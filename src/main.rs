//! deltasched - 主机端演示
//!
//! 后台线程充当 10 ms 定时器中断 (tick 源)，主线程运行分发循环:
//! - 心跳任务: 每 50 tick
//! - LED 闪烁任务: 携带自身状态，由 StaticCell 分配
//! - 一次性任务: 2 秒后删除心跳任务，3 秒后停机
//!
//! 运行: `cargo run --features std`

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use deltasched::config::TICK_MS;
use deltasched::{DefaultScheduler, Job, SchedError, TaskId};
use static_cell::StaticCell;

// ===== 静态分配 =====
/// 调度器实例 (tick 线程与主循环共享)
static SCHED: DefaultScheduler<'static> = DefaultScheduler::new();

/// LED 闪烁任务状态
static BLINKER: StaticCell<Blinker> = StaticCell::new();

static RUNNING: AtomicBool = AtomicBool::new(true);
static HEARTBEAT_ID: AtomicU32 = AtomicU32::new(0);

static HEARTBEAT: fn() = heartbeat;
static STOP_HEARTBEAT: fn() = stop_heartbeat;
static SHUTDOWN: fn() = shutdown;

/// 带状态的任务: 每次执行翻转一次 LED
struct Blinker {
    toggles: AtomicU32,
}

impl Job for Blinker {
    fn run(&self) {
        let n = self.toggles.fetch_add(1, Ordering::Relaxed) + 1;
        let level = if n % 2 == 1 { "on" } else { "off" };
        println!("[{:>6} ms] LED {}", SCHED.current_time_ms(), level);
    }
}

fn heartbeat() {
    println!("[{:>6} ms] heartbeat", SCHED.current_time_ms());
}

fn stop_heartbeat() {
    match SCHED.delete_raw(HEARTBEAT_ID.load(Ordering::Relaxed)) {
        Ok(()) => println!("[{:>6} ms] heartbeat stopped", SCHED.current_time_ms()),
        Err(err) => println!("[{:>6} ms] stop failed: {}", SCHED.current_time_ms(), err),
    }
}

fn shutdown() {
    RUNNING.store(false, Ordering::Release);
}

fn main() -> Result<(), SchedError> {
    SCHED.init();

    let blinker: &'static Blinker = BLINKER.init(Blinker {
        toggles: AtomicU32::new(0),
    });

    // 心跳添加失败时记为 NO_TASK_ID，停止任务会报告未找到
    let heartbeat = SCHED.add_task(&HEARTBEAT, 0, 50).ok();
    HEARTBEAT_ID.store(TaskId::raw_or_none(heartbeat), Ordering::Relaxed);
    SCHED.add_task(blinker, 10, 25)?;
    SCHED.add_task(&STOP_HEARTBEAT, 2000 / TICK_MS, 0)?;
    SCHED.add_task(&SHUTDOWN, 3000 / TICK_MS, 0)?;

    println!("deltasched {} - tick {} ms, {} tasks queued", deltasched::VERSION, TICK_MS, SCHED.len());

    // tick 源: 模拟定时器中断
    let ticker = thread::spawn(|| {
        while RUNNING.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(u64::from(TICK_MS)));
            SCHED.advance();
        }
    });

    // 主循环
    while RUNNING.load(Ordering::Acquire) {
        if SCHED.dispatch() == 0 {
            // 空闲: 相当于 WFI
            thread::sleep(Duration::from_millis(1));
        }
    }

    let _ = ticker.join();

    let stats = SCHED.stats();
    println!(
        "dispatched {} jobs, {} overruns, {} still queued, last error {:?}",
        stats.dispatched,
        stats.overruns,
        stats.queued,
        SCHED.error_code()
    );
    Ok(())
}
