use std::{thread, time::Duration};

use super::{wall_clock_now, Scheduler, TaskState};
use crate::prelude::*;

/// Runs every task synchronously on the calling thread, blocking through any
/// delay. Work a task schedules from inside itself runs nested, right away.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { wall_clock_now() }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    if let Some(delay) = delay {
      thread::sleep(delay);
    }
    task();
    let mut handle = SharedSubscription::default();
    handle.unsubscribe();
    handle
  }

  fn schedule_repeating<F>(
    &self, mut task: F, period: Duration, first_delay: Option<Duration>,
  ) -> SharedSubscription
  where
    F: FnMut(usize) -> TaskState + Send + 'static,
  {
    thread::sleep(first_delay.unwrap_or(period));
    let mut invokes = 0;
    while task(invokes) == TaskState::Continue {
      invokes += 1;
      thread::sleep(period);
    }
    let mut handle = SharedSubscription::default();
    handle.unsubscribe();
    handle
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use super::*;

  #[test]
  fn runs_nested_work_inline() {
    let log = Arc::new(Mutex::new(vec![]));
    let c_log = log.clone();
    ImmediateScheduler.schedule(
      move || {
        c_log.lock().unwrap().push("outer start");
        let cc_log = c_log.clone();
        ImmediateScheduler.schedule(move || cc_log.lock().unwrap().push("inner"), None);
        c_log.lock().unwrap().push("outer end");
      },
      None,
    );
    assert_eq!(*log.lock().unwrap(), vec!["outer start", "inner", "outer end"]);
  }

  #[test]
  fn repeating_runs_until_finished() {
    let count = Arc::new(Mutex::new(0));
    let c_count = count.clone();
    let handle = ImmediateScheduler.schedule_repeating(
      move |i| {
        *c_count.lock().unwrap() += 1;
        if i < 3 { TaskState::Continue } else { TaskState::Finished }
      },
      Duration::from_millis(1),
      Some(Duration::ZERO),
    );
    assert_eq!(*count.lock().unwrap(), 4);
    assert!(handle.is_closed());
  }
}
