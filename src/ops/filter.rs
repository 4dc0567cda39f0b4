use crate::prelude::*;

#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(
      FilterObserver { observer, filter: self.filter },
      subscription,
    ))
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct FilterWithErrOp<S, F> {
  pub(crate) source: S,
  pub(crate) filter: F,
}

impl<S, F> Observable for FilterWithErrOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> Result<bool, S::Err> + Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    self.source.actual_subscribe(Subscriber::new(
      FilterWithErrObserver { observer: Some(subscriber), filter: self.filter },
      subscription,
    ))
  }
}

/// Holds the downstream subscriber itself: a failing predicate must end the
/// stream from inside `next`, which also disposes the shared subscription
/// and so the source.
pub struct FilterWithErrObserver<O, F> {
  observer: Option<Subscriber<O>>,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterWithErrObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.filter)(&value) {
      Ok(true) => self.observer.next(value),
      Ok(false) => {}
      Err(err) => self.observer.take().error(err),
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
