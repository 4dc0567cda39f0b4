use std::{convert::Infallible, ops::Range};

use crate::prelude::*;

/// Creates an observable emitting `count` sequential integers starting at
/// `start`, then completing.
pub fn range(start: i64, count: usize) -> RangeObservable {
  RangeObservable { start, count }
}

#[derive(Clone, Copy, Debug)]
pub struct RangeObservable {
  start: i64,
  count: usize,
}

impl RangeObservable {
  fn values(&self) -> Range<i64> {
    let count = i64::try_from(self.count).unwrap_or(i64::MAX);
    self.start..self.start.saturating_add(count)
  }
}

impl Observable for RangeObservable {
  type Item = i64;
  type Err = Infallible;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<i64, Infallible> + Send + 'static,
  {
    observable::from_iter(self.values()).actual_subscribe(subscriber)
  }
}
