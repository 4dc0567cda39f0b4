//! Schedulers decide when and on which thread a unit of work runs.
//!
//! Every scheduled task hands back a [`SharedSubscription`]. Unsubscribing it
//! before the task runs prevents the run; unsubscribing a repeating task
//! stops future runs but never interrupts one in flight.

use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::prelude::*;

mod current_thread;
mod event_loop;
mod immediate;
mod test_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use current_thread::CurrentThreadScheduler;
pub use event_loop::{EventLoopBuilder, EventLoopScheduler};
pub use immediate::ImmediateScheduler;
pub use test_scheduler::TestScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// What a repeating task wants after one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
  Continue,
  Finished,
}

/// A Scheduler is an object to order task and schedule their execution.
pub trait Scheduler: Clone + Send + 'static {
  /// The scheduler's notion of the current time, measured from its own
  /// origin. Real schedulers count from process start, the virtual scheduler
  /// counts ticks as milliseconds.
  fn now(&self) -> Duration;

  /// Runs `task` once, after `delay` if one is given.
  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static;

  /// Runs `task` every `period`, first after `first_delay` (defaults to one
  /// period). The task receives how many times it ran before and can end the
  /// repetition by returning [`TaskState::Finished`].
  fn schedule_repeating<F>(
    &self, task: F, period: Duration, first_delay: Option<Duration>,
  ) -> SharedSubscription
  where
    F: FnMut(usize) -> TaskState + Send + 'static,
  {
    let handle = SharedSubscription::default();
    repeat(self, handle.clone(), Box::new(task), period, first_delay.unwrap_or(period), 0);
    handle
  }
}

type RepeatingTask = Box<dyn FnMut(usize) -> TaskState + Send>;

fn repeat<Sch: Scheduler>(
  scheduler: &Sch, handle: SharedSubscription, mut task: RepeatingTask, period: Duration,
  delay: Duration, invokes: usize,
) {
  let c_scheduler = scheduler.clone();
  let c_handle = handle.clone();
  let step = scheduler.schedule(
    move || {
      if c_handle.is_closed() {
        return;
      }
      match task(invokes) {
        TaskState::Continue if !c_handle.is_closed() => {
          repeat(&c_scheduler, c_handle, task, period, period, invokes + 1)
        }
        _ => {
          let mut c_handle = c_handle;
          c_handle.unsubscribe();
        }
      }
    },
    Some(delay),
  );
  handle.add(step);
}

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Wall-clock time since the process-wide scheduler epoch.
pub(crate) fn wall_clock_now() -> Duration { EPOCH.elapsed() }
