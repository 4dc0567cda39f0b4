use std::{convert::Infallible, time::Duration};

use crate::prelude::*;

/// Creates an observable which emits `0, 1, 2, ..` on `scheduler`, the first
/// value one `period` after subscribing and then every `period`.
///
/// It never completes on its own; bound it with `take` or dispose it.
pub fn interval<Sch: Scheduler>(period: Duration, scheduler: Sch) -> IntervalObservable<Sch> {
  IntervalObservable { scheduler, period, first_delay: None }
}

/// Like [`interval`], but the first value is emitted after `first_delay`.
pub fn interval_at<Sch: Scheduler>(
  period: Duration, first_delay: Duration, scheduler: Sch,
) -> IntervalObservable<Sch> {
  IntervalObservable { scheduler, period, first_delay: Some(first_delay) }
}

#[derive(Clone)]
pub struct IntervalObservable<Sch> {
  scheduler: Sch,
  period: Duration,
  first_delay: Option<Duration>,
}

impl<Sch: Scheduler> Observable for IntervalObservable<Sch> {
  type Item = usize;
  type Err = Infallible;

  fn actual_subscribe<O>(self, mut subscriber: Subscriber<O>)
  where
    O: Observer<usize, Infallible> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let handle = self.scheduler.schedule_repeating(
      move |seq| {
        if subscriber.is_closed() {
          return TaskState::Finished;
        }
        subscriber.next(seq);
        TaskState::Continue
      },
      self.period,
      self.first_delay,
    );
    subscription.add(handle);
  }
}
