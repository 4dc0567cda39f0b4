use std::time::Duration;

use futures::executor::ThreadPool;

use super::{wall_clock_now, Scheduler};
use crate::{error::SchedulerError, prelude::*};

/// Runs tasks on a `futures` thread pool. Delays are awaited on a timer, so a
/// waiting task does not hold a pool thread.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  pub fn new() -> Result<Self, SchedulerError> {
    let pool = ThreadPool::builder()
      .name_prefix("rx-pool-")
      .create()
      .map_err(SchedulerError::ThreadPool)?;
    Ok(Self { pool })
  }

  pub fn with_pool(pool: ThreadPool) -> Self { Self { pool } }
}

impl Scheduler for ThreadPoolScheduler {
  fn now(&self) -> Duration { wall_clock_now() }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = SharedSubscription::default();
    let mut c_handle = handle.clone();
    self.pool.spawn_ok(async move {
      if let Some(delay) = delay {
        futures_time::task::sleep(delay.into()).await;
      }
      if !c_handle.is_closed() {
        task();
        c_handle.unsubscribe();
      }
    });
    handle
  }
}

#[cfg(test)]
mod test {
  use std::{sync::mpsc, thread};

  use super::*;

  #[test]
  fn runs_on_pool_thread() {
    let scheduler = ThreadPoolScheduler::new().unwrap();
    let (tx, rx) = mpsc::channel();
    scheduler.schedule(move || tx.send(thread::current().id()).unwrap(), None);
    let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, thread::current().id());
  }

  #[test]
  fn cancelled_delayed_task_is_skipped() {
    let scheduler = ThreadPoolScheduler::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    let mut handle = scheduler.schedule(move || c_tx.send(1).unwrap(), Some(Duration::from_millis(50)));
    handle.unsubscribe();
    scheduler.schedule(move || tx.send(2).unwrap(), Some(Duration::from_millis(100)));
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
  }

  #[test]
  fn delayed_tasks_do_not_hold_pool_threads() {
    let pool = ThreadPool::builder().pool_size(1).create().unwrap();
    let scheduler = ThreadPoolScheduler::with_pool(pool);
    let (tx, rx) = mpsc::channel();
    for _ in 0..4 {
      let tx = tx.clone();
      scheduler.schedule(move || tx.send("delayed").unwrap(), Some(Duration::from_secs(2)));
    }
    scheduler.schedule(move || tx.send("immediate").unwrap(), None);
    assert_eq!(rx.recv_timeout(Duration::from_millis(500)).unwrap(), "immediate");
  }
}
