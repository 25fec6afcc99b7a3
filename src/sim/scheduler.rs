/// Virtual-clock timer queue.
///
/// Stand-in for a GUI toolkit's `after(ms, callback)`: tasks are one-shot
/// and identified by a `Task` tag; a recurring chain re-arms itself after
/// each firing with whatever delay its `Recurring` source computes then.
///
/// Dispatch is strictly one task at a time, earliest due first, ties in
/// registration order. `halt()` drops everything pending and refuses new
/// registrations, so nothing fires after the game stops.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Most animation ticks a single frame may catch up on.
pub const MAX_CATCHUP_TICKS: u64 = 4;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Task {
    Animate,
    SpawnEnemy,
}

/// A self-rescheduling task source: asked for its next delay every time
/// it is (re)armed.
pub trait Recurring {
    fn next_delay_ms(&self) -> u64;
}

/// Fixed-period animation cadence.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    pub period_ms: u64,
}

impl Recurring for FrameClock {
    fn next_delay_ms(&self) -> u64 {
        self.period_ms
    }
}

/// Wall time → game time. Whole milliseconds are handed on and the
/// remainder carried to the next frame. A frame longer than
/// `MAX_CATCHUP_TICKS` periods is cut short and the excess dropped.
#[derive(Clone, Debug)]
pub struct GameClock {
    now_ms: u64,
    carry: Duration,
    max_step_ms: u64,
}

impl GameClock {
    pub fn new(tick_rate_ms: u64) -> Self {
        GameClock {
            now_ms: 0,
            carry: Duration::ZERO,
            max_step_ms: tick_rate_ms.max(1).saturating_mul(MAX_CATCHUP_TICKS),
        }
    }

    /// Account for one frame of wall time; returns the new game time.
    pub fn advance(&mut self, frame: Duration) -> u64 {
        self.carry += frame;
        let whole_ms = self.carry.as_millis() as u64;
        if whole_ms > self.max_step_ms {
            self.carry = Duration::ZERO;
            self.now_ms += self.max_step_ms;
        } else {
            self.carry -= Duration::from_millis(whole_ms);
            self.now_ms += whole_ms;
        }
        self.now_ms
    }
}

// Field order matters: the derived Ord compares due time, then sequence.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug)]
struct Pending {
    due_ms: u64,
    seq: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<Pending>>,
    halted: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    #[allow(dead_code)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Register `task` to fire `delay_ms` after the current virtual time.
    /// Returns false (and drops the task) once halted.
    pub fn after(&mut self, delay_ms: u64, task: Task) -> bool {
        if self.halted { return false; }
        let seq = self.seq;
        self.seq += 1;
        self.queue.push(Reverse(Pending {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            task,
        }));
        true
    }

    /// Arm `task` with the delay its source asks for right now.
    pub fn arm(&mut self, source: &dyn Recurring, task: Task) -> bool {
        self.after(source.next_delay_ms(), task)
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock
    /// to its due time. When nothing is due, the clock moves to `until_ms`
    /// and `None` is returned.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Task> {
        if !self.halted {
            let due = matches!(self.queue.peek(), Some(Reverse(p)) if p.due_ms <= until_ms);
            if due {
                if let Some(Reverse(p)) = self.queue.pop() {
                    self.now_ms = self.now_ms.max(p.due_ms);
                    return Some(p.task);
                }
            }
        }
        self.now_ms = self.now_ms.max(until_ms);
        None
    }

    #[allow(dead_code)]
    pub fn is_pending(&self, task: Task) -> bool {
        self.queue.iter().any(|Reverse(p)| p.task == task)
    }

    #[allow(dead_code)]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Cancel every pending task and refuse new ones. Idempotent.
    pub fn halt(&mut self) {
        self.halted = true;
        self.queue.clear();
    }
}
