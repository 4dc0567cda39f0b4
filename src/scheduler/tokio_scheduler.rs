use std::time::Duration;

use tokio::runtime::Handle;

use super::{wall_clock_now, Scheduler};
use crate::prelude::*;

/// Runs tasks on a tokio runtime. The runtime needs its time driver enabled
/// for delayed work.
#[derive(Clone)]
pub struct TokioScheduler(pub Handle);

impl TokioScheduler {
  /// Uses the runtime the caller is running in.
  ///
  /// # Panics
  ///
  /// Panics when called outside of a tokio runtime.
  pub fn current() -> Self { TokioScheduler(Handle::current()) }
}

impl Scheduler for TokioScheduler {
  fn now(&self) -> Duration { wall_clock_now() }

  fn schedule<F>(&self, task: F, delay: Option<Duration>) -> SharedSubscription
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = SharedSubscription::default();
    let mut c_handle = handle.clone();
    let join = self.0.spawn(async move {
      if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
      }
      if !c_handle.is_closed() {
        task();
        c_handle.unsubscribe();
      }
    });
    handle.add_teardown(move || join.abort());
    handle
  }
}
