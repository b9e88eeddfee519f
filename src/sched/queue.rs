//! 增量延迟队列 (delta queue)
//!
//! 按触发时刻升序排列的单链表，每个节点只保存 "比前驱节点晚多少 tick"
//! (队首则是 "距现在多少 tick")。这样 tick 中断只需把队首减 1，
//! 与任务数量无关，O(1)；代价是插入/删除需要 O(n) 遍历。
//!
//! # 不变式
//!
//! 对链表中任意节点 N: 从队首到 N (含) 的 delta 之和等于 N 的剩余 tick 数。
//! 相同触发时刻的节点按插入顺序排列 (先插入先触发)。
//!
//! # 存储
//!
//! 固定容量的槽位数组 (无堆分配)，链表用 u16 索引连接，空闲槽位组成
//! 侵入式空闲链表。从未使用过的槽位按水位线顺序分配，因此 `new` 是 `const fn`。
//!
//! ```text
//! head ─▶ [A δ=3] ─▶ [B δ=0] ─▶ [C δ=5] ─▶ ∅
//!          绝对 3      绝对 3      绝对 8
//! ```
//!
//! 本模块不加锁；互斥由调度器负责。

use heapless::Vec;

use super::error::SchedError;
use super::task::{TaskId, TaskRecord};

/// 槽位链接
type Link = Option<u16>;

/// 队列节点
#[derive(Clone, Copy)]
struct Node<'a> {
    /// None = 空闲槽位
    record: Option<TaskRecord<'a>>,
    /// 相对前驱节点的延迟 (tick)
    delta: u32,
    /// 排队时为后继节点，空闲时为空闲链表的下一个槽位
    next: Link,
    /// 是否在链表中 (已出队但仍占用槽位的节点为 false)
    linked: bool,
}

impl<'a> Node<'a> {
    const VACANT: Self = Self {
        record: None,
        delta: 0,
        next: None,
        linked: false,
    };
}

/// 待执行任务快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    /// 任务 id
    pub id: TaskId,
    /// 距现在的剩余 tick 数 (绝对值)
    pub remaining: u32,
    /// 周期 (tick)
    pub period: u32,
}

/// 增量延迟队列
///
/// # 类型参数
///
/// - `'a`: 任务回调的生命周期
/// - `N`: 槽位数量 (最大 65535)
pub struct DeltaQueue<'a, const N: usize> {
    nodes: [Node<'a>; N],
    head: Link,
    free: Link,
    /// 水位线: `fresh..N` 的槽位从未被使用过
    fresh: u16,
    /// 链表中的节点数
    queued: u16,
    /// 已占用槽位数 (含已出队未归还的节点)
    allocated: u16,
}

impl<'a, const N: usize> DeltaQueue<'a, N> {
    /// 创建空队列
    pub const fn new() -> Self {
        assert!(N <= u16::MAX as usize, "DeltaQueue capacity must fit u16");

        Self {
            nodes: [Node::VACANT; N],
            head: None,
            free: None,
            fresh: 0,
            queued: 0,
            allocated: 0,
        }
    }

    /// 总容量
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// 链表中的任务数
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.queued as usize
    }

    /// 链表是否为空
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// 已占用槽位数
    #[inline(always)]
    pub fn allocated(&self) -> usize {
        self.allocated as usize
    }

    /// 距下一次触发的 tick 数 (即队首 delta)
    #[inline]
    pub fn next_due(&self) -> Option<u32> {
        self.head.map(|h| self.nodes[h as usize].delta)
    }

    /// 插入任务，`delay` 为距现在的绝对 tick 数
    ///
    /// 返回占用的槽位索引。槽位耗尽时返回 `CapacityExhausted`，队列不变。
    pub fn insert(&mut self, record: TaskRecord<'a>, delay: u32) -> Result<u16, SchedError> {
        let slot = self.acquire().ok_or(SchedError::CapacityExhausted)?;
        self.nodes[slot as usize].record = Some(record);
        self.link(slot, delay);
        Ok(slot)
    }

    /// 按 id 删除任务
    ///
    /// 被删节点的 delta 并入后继节点，保证其余节点的触发时刻不变。
    pub fn remove(&mut self, id: TaskId) -> Result<TaskRecord<'a>, SchedError> {
        let mut prev: Link = None;
        let mut cursor = self.head;

        while let Some(idx) = cursor {
            let node = self.nodes[idx as usize];
            match node.record {
                Some(record) if record.id == id => {
                    self.unlink(prev, idx);
                    self.free_slot(idx);
                    return Ok(record);
                }
                _ => {
                    prev = cursor;
                    cursor = node.next;
                }
            }
        }

        Err(SchedError::TaskNotFound)
    }

    /// tick 推进: 队首 delta 减 1
    ///
    /// 只修改一个字段，不分配、不改链表结构、不调用任务。
    /// 返回 false 表示本次 tick 未被消费 (队列为空或队首已到期)。
    #[inline]
    pub fn advance(&mut self) -> bool {
        match self.head {
            Some(h) if self.nodes[h as usize].delta > 0 => {
                self.nodes[h as usize].delta -= 1;
                true
            }
            _ => false,
        }
    }

    /// 摘下已到期 (delta == 0) 的队首
    ///
    /// 节点离开链表但仍占用槽位，随后必须 `relink` 或 `release`。
    pub fn pop_due(&mut self) -> Option<(u16, TaskRecord<'a>)> {
        let head = self.head?;
        let node = self.nodes[head as usize];
        if node.delta != 0 {
            return None;
        }
        let record = node.record?;
        // 队首 delta 为 0，后继的 delta 本就相对于 "现在"，无需修正
        self.unlink(None, head);
        Some((head, record))
    }

    /// 将已出队的节点以新的绝对延迟重新插入 (同一记录、同一槽位)
    ///
    /// 槽位不处于 "已出队" 状态时返回 false。
    pub fn relink(&mut self, slot: u16, delay: u32) -> bool {
        match self.nodes.get(slot as usize) {
            Some(node) if node.record.is_some() && !node.linked => {
                self.link(slot, delay);
                true
            }
            _ => false,
        }
    }

    /// 归还已出队节点的槽位
    pub fn release(&mut self, slot: u16) -> Option<TaskRecord<'a>> {
        let node = self.nodes.get(slot as usize).copied()?;
        if node.linked {
            return None;
        }
        let record = node.record?;
        self.free_slot(slot);
        Some(record)
    }

    /// 清空队列 (含已出队未归还的节点)
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// 链表中是否存在该 id
    pub fn contains(&self, id: TaskId) -> bool {
        self.iter().any(|(record, _)| record.id == id)
    }

    /// 按触发顺序列出所有待执行任务及其绝对剩余 tick
    pub fn pending(&self) -> Vec<Pending, N> {
        let mut out = Vec::new();
        let mut accum: u32 = 0;
        for (record, delta) in self.iter() {
            accum += delta;
            // 容量为 N，链表节点数不会超过 N
            let _ = out.push(Pending {
                id: record.id,
                remaining: accum,
                period: record.period,
            });
        }
        out
    }

    /// 按链表顺序遍历 (记录, delta)
    fn iter(&self) -> Iter<'_, 'a, N> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    // ===== 内部: 链表操作 =====

    /// 按绝对延迟把槽位接入链表
    fn link(&mut self, slot: u16, delay: u32) {
        let s = slot as usize;

        match self.head {
            Some(h) if delay >= self.nodes[h as usize].delta => {
                // 跳过所有触发时刻 <= delay 的节点 (相同时刻排在已有节点之后)
                let mut current = h;
                let mut accum = self.nodes[h as usize].delta;
                while let Some(n) = self.nodes[current as usize].next {
                    let next_delta = self.nodes[n as usize].delta;
                    if accum + next_delta > delay {
                        break;
                    }
                    accum += next_delta;
                    current = n;
                }

                let own = delay - accum;
                let following = self.nodes[current as usize].next;
                self.nodes[s].delta = own;
                self.nodes[s].next = following;
                self.nodes[current as usize].next = Some(slot);
                if let Some(f) = following {
                    self.nodes[f as usize].delta -= own;
                }
            }
            old_head => {
                // 空队列或比队首更早: 成为新队首
                self.nodes[s].delta = delay;
                self.nodes[s].next = old_head;
                if let Some(h) = old_head {
                    self.nodes[h as usize].delta -= delay;
                }
                self.head = Some(slot);
            }
        }

        self.nodes[s].linked = true;
        self.queued += 1;
    }

    /// 把 `idx` 从链表摘下 (`prev` 为其前驱)，delta 并入后继
    fn unlink(&mut self, prev: Link, idx: u16) {
        let node = self.nodes[idx as usize];
        if let Some(next) = node.next {
            self.nodes[next as usize].delta += node.delta;
        }
        match prev {
            Some(p) => self.nodes[p as usize].next = node.next,
            None => self.head = node.next,
        }

        let n = &mut self.nodes[idx as usize];
        n.next = None;
        n.delta = 0;
        n.linked = false;
        self.queued -= 1;
    }

    // ===== 内部: 槽位分配 =====

    fn acquire(&mut self) -> Option<u16> {
        let slot = match self.free {
            Some(slot) => {
                self.free = self.nodes[slot as usize].next;
                slot
            }
            None if (self.fresh as usize) < N => {
                let slot = self.fresh;
                self.fresh += 1;
                slot
            }
            None => return None,
        };
        self.allocated += 1;
        Some(slot)
    }

    fn free_slot(&mut self, slot: u16) {
        self.nodes[slot as usize] = Node {
            next: self.free,
            ..Node::VACANT
        };
        self.free = Some(slot);
        self.allocated -= 1;
    }
}

impl<const N: usize> Default for DeltaQueue<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// 链表迭代器
struct Iter<'q, 'a, const N: usize> {
    queue: &'q DeltaQueue<'a, N>,
    cursor: Link,
}

impl<'q, 'a, const N: usize> Iterator for Iter<'q, 'a, N> {
    type Item = (TaskRecord<'a>, u32);

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.queue.nodes[self.cursor? as usize];
        self.cursor = node.next;
        node.record.map(|record| (record, node.delta))
    }
}
