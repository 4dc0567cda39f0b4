use std::collections::VecDeque;

use super::subject_core::{Retention, SubjectCore, Terminal};
use crate::prelude::*;

/// A subject that records the values passing through it and replays them to
/// every later subscriber, followed by the terminal event if there was one.
pub struct ReplaySubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  /// Keeps the most recent `capacity` values, or every value when `None`.
  pub fn new(capacity: Option<usize>) -> Self {
    let values = VecDeque::with_capacity(capacity.unwrap_or_default());
    ReplaySubject { core: SubjectCore::new(Retention::Window { capacity, values }) }
  }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl<Item, Err> Default for ReplaySubject<Item, Err> {
  fn default() -> Self { Self::new(None) }
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self { ReplaySubject { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn next(&mut self, value: Item) { self.core.next(value) }

  fn error(self, err: Err) { self.core.terminate(Terminal::Errored(err)) }

  fn complete(self) { self.core.terminate(Terminal::Completed) }

  fn is_closed(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Observable for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.core.subscribe(subscriber)
  }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use crate::prelude::*;

  fn collect<S>(subject: S) -> Arc<Mutex<Vec<i32>>>
  where
    S: Observable<Item = i32, Err = ()>,
  {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    subject.subscribe_err(move |v| c_values.lock().unwrap().push(v), |_| {});
    values
  }

  #[test]
  fn replays_everything_when_unbounded() {
    let mut subject = ReplaySubject::<i32, ()>::default();
    (0..4).for_each(|v| subject.next(v));
    let values = collect(subject.clone());
    subject.next(4);
    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2, 3, 4]);
  }

  #[test]
  fn bounded_window() {
    let mut subject = ReplaySubject::<i32, ()>::new(Some(2));
    (0..4).for_each(|v| subject.next(v));
    assert_eq!(*collect(subject.clone()).lock().unwrap(), vec![2, 3]);
  }

  #[test]
  fn zero_capacity_replays_nothing() {
    let mut subject = ReplaySubject::<i32, ()>::new(Some(0));
    subject.next(1);
    assert!(collect(subject.clone()).lock().unwrap().is_empty());
  }

  #[test]
  fn values_then_terminal_after_completion() {
    let mut subject = ReplaySubject::<i32, ()>::default();
    subject.next(1);
    subject.clone().complete();
    subject.next(2);

    let completed = Arc::new(Mutex::new(false));
    let c_completed = completed.clone();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    subject.subscribe_all(
      move |v| c_values.lock().unwrap().push(v),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );
    assert_eq!(*values.lock().unwrap(), vec![1]);
    assert!(*completed.lock().unwrap());
  }
}
