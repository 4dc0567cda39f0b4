use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  thread,
  time::{Duration, Instant},
};

use super::{wall_clock_now, Scheduler};
use crate::prelude::*;

// ==================== Trampoline State ====================

#[derive(Default)]
struct Trampoline {
  queue: BinaryHeap<QueuedTask>,
  next_task_id: usize,
  draining: bool,
}

struct QueuedTask {
  due: Instant,
  task_id: usize,
  task: Box<dyn FnOnce() + Send>,
  handle: SharedSubscription,
}

impl PartialEq for QueuedTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.task_id == other.task_id }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for QueuedTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

thread_local! {
  static TRAMPOLINE: RefCell<Trampoline> = RefCell::new(Trampoline::default());
}

/// Resets the draining flag even if a task panics, so the thread can drain
/// again later.
struct DrainGuard;

impl Drop for DrainGuard {
  fn drop(&mut self) {
    TRAMPOLINE.with(|t| {
      let mut t = t.borrow_mut();
      t.draining = false;
      t.queue.clear();
    });
  }
}

// ==================== CurrentThreadScheduler ====================

/// A trampoline on the calling thread.
///
/// The outermost `schedule` call on a thread drains the queue to completion
/// before returning; work scheduled while draining is queued instead of
/// running nested, so self-rescheduling tasks never grow the stack. Each
/// thread owns its own queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  /// Whether the current thread is inside a drain loop.
  pub fn is_draining() -> bool { TRAMPOLINE.with(|t| t.borrow().draining) }

  fn drain() {
    let _guard = DrainGuard;
    loop {
      let next = TRAMPOLINE.with(|t| t.borrow_mut().queue.pop());
      let Some(QueuedTask { due, task, mut handle, .. }) = next else {
        break;
      };
      if handle.is_closed() {
        continue;
      }
      let now = Instant::now();
      if due > now {
        thread::sleep(due - now);
        if handle.is_closed() {
          continue;
        }
      }
      task();
      handle.unsubscribe();
    }
  }
}

impl Scheduler for CurrentThreadScheduler {
  fn now(&self) -> Duration { wall_clock_now() }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = SharedSubscription::default();
    let due = Instant::now() + delay.unwrap_or_default();
    let should_drain = TRAMPOLINE.with(|t| {
      let mut t = t.borrow_mut();
      let task_id = t.next_task_id;
      t.next_task_id += 1;
      t.queue.push(QueuedTask {
        due,
        task_id,
        task: Box::new(task),
        handle: handle.clone(),
      });
      !std::mem::replace(&mut t.draining, true)
    });
    if should_drain {
      tracing::trace!("current thread trampoline starts draining");
      Self::drain();
    }
    handle
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use super::*;

  #[test]
  fn nested_work_is_queued_not_nested() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    CurrentThreadScheduler.schedule(
      move || {
        c_log.lock().unwrap().push("outer start");
        let cc_log = c_log.clone();
        CurrentThreadScheduler.schedule(move || cc_log.lock().unwrap().push("inner"), None);
        c_log.lock().unwrap().push("outer end");
      },
      None,
    );
    assert_eq!(*log.lock().unwrap(), vec!["outer start", "outer end", "inner"]);
    assert!(!CurrentThreadScheduler::is_draining());
  }

  #[test]
  fn deep_recursion_does_not_overflow() {
    fn step(n: usize, count: Arc<Mutex<usize>>) {
      *count.lock().unwrap() += 1;
      if n > 0 {
        CurrentThreadScheduler.schedule(move || step(n - 1, count), None);
      }
    }
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    CurrentThreadScheduler.schedule(move || step(100_000, c_count), None);
    assert_eq!(*count.lock().unwrap(), 100_001);
  }

  #[test]
  fn cancelled_before_run_is_skipped() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    CurrentThreadScheduler.schedule(
      move || {
        let cc_log = c_log.clone();
        let mut pending = CurrentThreadScheduler.schedule(move || cc_log.lock().unwrap().push(1), None);
        pending.unsubscribe();
        let cc_log = c_log.clone();
        CurrentThreadScheduler.schedule(move || cc_log.lock().unwrap().push(2), None);
      },
      None,
    );
    assert_eq!(*log.lock().unwrap(), vec![2]);
  }

  #[test]
  fn delayed_work_runs_in_due_order() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    CurrentThreadScheduler.schedule(
      move || {
        for (v, delay) in [(1, 20), (2, 5), (3, 5)] {
          let cc_log = c_log.clone();
          CurrentThreadScheduler.schedule(
            move || cc_log.lock().unwrap().push(v),
            Some(Duration::from_millis(delay)),
          );
        }
      },
      None,
    );
    assert_eq!(*log.lock().unwrap(), vec![2, 3, 1]);
  }
}
