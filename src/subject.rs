//! Subjects are observers and observables at the same time: every value
//! pushed into one is multicast to all of its current subscribers.
//!
//! Clones of a subject share the same observer list, so one clone can be
//! handed to a source as its observer while others are subscribed to.

mod async_subject;
mod replay_subject;
mod subject_core;

pub use async_subject::AsyncSubject;
pub use replay_subject::ReplaySubject;

use self::subject_core::{Retention, SubjectCore, Terminal};
use crate::prelude::*;

/// A multicast hub without memory for values.
///
/// Late subscribers see only future values. Once the subject terminated, a
/// new subscriber immediately receives that terminal event and nothing else.
pub struct Subject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Subject { core: SubjectCore::new(Retention::Nothing) } }

  /// Number of observers currently attached.
  pub fn observer_count(&self) -> usize { self.core.observer_count() }

  /// Returns `true` once `error` or `complete` has been called.
  pub fn is_stopped(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { core: self.core.clone() } }
}

impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  #[inline]
  fn next(&mut self, value: Item) { self.core.next(value) }

  #[inline]
  fn error(self, err: Err) { self.core.terminate(Terminal::Errored(err)) }

  #[inline]
  fn complete(self) { self.core.terminate(Terminal::Completed) }

  #[inline]
  fn is_closed(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Observable for Subject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.core.subscribe(subscriber)
  }
}
