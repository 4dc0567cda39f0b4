use std::{
  collections::BTreeMap,
  sync::{Arc, Weak},
  thread::{self, JoinHandle},
  time::{Duration, Instant},
};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::{wall_clock_now, Scheduler};
use crate::{error::SchedulerError, prelude::*};

type TaskKey = (Instant, usize);

struct Entry {
  task: Box<dyn FnOnce() + Send>,
  handle: SharedSubscription,
}

impl Entry {
  fn run(self) {
    let Entry { task, mut handle } = self;
    if !handle.is_closed() {
      task();
      handle.unsubscribe();
    }
  }
}

#[derive(Default)]
struct LoopState {
  queue: BTreeMap<TaskKey, Entry>,
  next_task_id: usize,
  shutdown: bool,
}

#[derive(Default)]
struct Shared {
  state: Mutex<LoopState>,
  wakeup: Condvar,
}

impl Shared {
  fn run(self: Arc<Self>) {
    tracing::debug!(thread = ?thread::current().name(), "event loop worker started");
    let mut state = self.state.lock();
    loop {
      let Some(&(due, task_id)) = state.queue.keys().next() else {
        if state.shutdown {
          break;
        }
        self.wakeup.wait(&mut state);
        continue;
      };
      if due > Instant::now() {
        self.wakeup.wait_until(&mut state, due);
        continue;
      }
      if let Some(entry) = state.queue.remove(&(due, task_id)) {
        MutexGuard::unlocked(&mut state, || entry.run());
      }
    }
    drop(state);
    tracing::debug!("event loop worker stopped");
  }

  fn cancel(&self, key: TaskKey) {
    let removed = self.state.lock().queue.remove(&key);
    if removed.is_some() {
      tracing::trace!("removed cancelled task from the event loop queue");
    }
  }
}

/// Owns the worker thread. Once the last scheduler clone is gone the worker
/// finishes what is still queued and exits; cancelled tasks leave the queue
/// so they never hold it up.
struct Worker {
  shared: Arc<Shared>,
  thread: Option<JoinHandle<()>>,
}

impl Drop for Worker {
  fn drop(&mut self) {
    self.shared.state.lock().shutdown = true;
    self.shared.wakeup.notify_one();
    // detached: waiting here could block on work due far in the future
    drop(self.thread.take());
  }
}

/// A scheduler backed by one dedicated thread with a time-ordered queue.
///
/// The worker sleeps until the earliest task is due or new work arrives.
/// Cancelling a task that has not run yet removes it from the queue.
#[derive(Clone)]
pub struct EventLoopScheduler {
  shared: Arc<Shared>,
  _worker: Arc<Worker>,
}

impl EventLoopScheduler {
  /// Spawns a worker with the default configuration.
  pub fn spawn() -> Result<Self, SchedulerError> { EventLoopBuilder::new().build() }

  pub fn builder() -> EventLoopBuilder { EventLoopBuilder::new() }

  /// Number of tasks waiting in the queue.
  pub fn pending_count(&self) -> usize { self.shared.state.lock().queue.len() }
}

impl Scheduler for EventLoopScheduler {
  fn now(&self) -> Duration { wall_clock_now() }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = SharedSubscription::default();
    let due = Instant::now() + delay.unwrap_or_default();
    let key = {
      let mut state = self.shared.state.lock();
      let key = (due, state.next_task_id);
      state.next_task_id += 1;
      state.queue.insert(key, Entry { task: Box::new(task), handle: handle.clone() });
      key
    };
    self.shared.wakeup.notify_one();

    let shared: Weak<Shared> = Arc::downgrade(&self.shared);
    handle.add_teardown(move || {
      if let Some(shared) = shared.upgrade() {
        shared.cancel(key);
      }
    });
    handle
  }
}

/// Configuration for an [`EventLoopScheduler`] worker thread.
pub struct EventLoopBuilder {
  name: String,
  stack_size: Option<usize>,
}

impl EventLoopBuilder {
  pub fn new() -> Self { Self { name: "rx-event-loop".to_owned(), stack_size: None } }

  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn stack_size(mut self, size: usize) -> Self {
    assert!(size > 0, "stack_size must be > 0");

    self.stack_size = Some(size);
    self
  }

  pub fn build(self) -> Result<EventLoopScheduler, SchedulerError> {
    let shared = Arc::new(Shared::default());
    let mut builder = thread::Builder::new().name(self.name.clone());
    if let Some(size) = self.stack_size {
      builder = builder.stack_size(size);
    }
    let c_shared = shared.clone();
    let thread = builder
      .spawn(move || c_shared.run())
      .map_err(|source| SchedulerError::Spawn { name: self.name, source })?;
    Ok(EventLoopScheduler {
      _worker: Arc::new(Worker { shared: shared.clone(), thread: Some(thread) }),
      shared,
    })
  }
}

impl Default for EventLoopBuilder {
  fn default() -> Self { Self::new() }
}
