//! Virtual time scheduler for deterministic tests.
//!
//! Time is a logical tick counter that only moves when the test advances it.
//! Due work runs strictly in (due tick, submission order) order and the clock
//! jumps to each task's tick before it runs, so timing assertions are exact
//! and never depend on the wall clock. One tick reads as one millisecond when
//! seen through [`Scheduler::now`].

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::Scheduler;
use crate::prelude::*;

// ==================== Internal State ====================

#[derive(Default)]
struct VirtualState {
  clock: u64,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: u64,
  task_id: usize,
  task: Box<dyn FnOnce() + Send>,
  handle: SharedSubscription,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler. Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct TestScheduler(Arc<Mutex<VirtualState>>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// The current virtual tick.
  pub fn clock(&self) -> u64 { self.0.lock().clock }

  /// Number of tasks waiting in the queue, cancelled ones included until
  /// their tick is reached.
  pub fn pending_count(&self) -> usize { self.0.lock().task_queue.len() }

  /// Schedules `task` at the absolute tick `at`. A tick in the past is
  /// treated as "now".
  pub fn schedule_absolute<F>(&self, at: u64, task: F) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = SharedSubscription::default();
    let mut state = self.0.lock();
    let scheduled_time = at.max(state.clock);
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    state.task_queue.push(ScheduledTask {
      scheduled_time,
      task_id,
      task: Box::new(task),
      handle: handle.clone(),
    });
    handle
  }

  /// Schedules `task` `ticks` after the current tick.
  pub fn schedule_relative<F>(&self, ticks: u64, task: F) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let at = self.clock().saturating_add(ticks);
    self.schedule_absolute(at, task)
  }

  /// Runs every task due at or before `tick`, then leaves the clock at
  /// `tick`. The clock never moves backwards.
  pub fn advance_to(&self, tick: u64) {
    self.execute_tasks_until(Some(tick));
    let mut state = self.0.lock();
    state.clock = state.clock.max(tick);
  }

  pub fn advance_by(&self, ticks: u64) {
    let target = self.clock().saturating_add(ticks);
    self.advance_to(target);
  }

  /// Runs queued work until the queue is empty, including work scheduled by
  /// the tasks themselves.
  pub fn flush(&self) { self.execute_tasks_until(None); }

  fn execute_tasks_until(&self, target_time: Option<u64>) {
    loop {
      let task = {
        let mut state = self.0.lock();
        let should_stop = state
          .task_queue
          .peek()
          .map_or(true, |peek| target_time.is_some_and(|limit| peek.scheduled_time > limit));
        if should_stop {
          None
        } else {
          state.task_queue.pop().map(|task| {
            state.clock = state.clock.max(task.scheduled_time);
            task
          })
        }
      };

      let Some(ScheduledTask { task, mut handle, scheduled_time, .. }) = task else {
        break;
      };
      if handle.is_closed() {
        continue;
      }
      tracing::trace!(tick = scheduled_time, "virtual scheduler runs task");
      task();
      handle.unsubscribe();
    }
  }
}

impl Scheduler for TestScheduler {
  fn now(&self) -> Duration { Duration::from_millis(self.clock()) }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let ticks = delay.map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    self.schedule_relative(ticks, task)
  }
}
