use super::subject_core::{Retention, SubjectCore, Terminal};
use crate::prelude::*;

/// Emits only the last value it received, and only once it completes.
///
/// Subscribers arriving after completion get that value followed by the
/// completion. An error is forwarded without any value.
pub struct AsyncSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> AsyncSubject<Item, Err> {
  pub fn new() -> Self { AsyncSubject { core: SubjectCore::new(Retention::Last(None)) } }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl<Item, Err> Default for AsyncSubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for AsyncSubject<Item, Err> {
  fn clone(&self) -> Self { AsyncSubject { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for AsyncSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn next(&mut self, value: Item) { self.core.next(value) }

  fn error(self, err: Err) { self.core.terminate(Terminal::Errored(err)) }

  fn complete(self) { self.core.terminate(Terminal::Completed) }

  fn is_closed(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Observable for AsyncSubject<Item, Err>
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
