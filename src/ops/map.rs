use crate::prelude::*;

#[derive(Clone)]
pub struct MapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B + Send + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<B, S::Err> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(
      MapObserver { observer, map: self.func },
      subscription,
    ))
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  map: F,
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next((self.map)(value)) }
  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[derive(Clone)]
pub struct MapErrOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, E> Observable for MapErrOp<S, F>
where
  S: Observable,
  F: FnOnce(S::Err) -> E + Send + 'static,
{
  type Item = S::Item;
  type Err = E;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, E> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(
      MapErrObserver { observer, map_err: self.func },
      subscription,
    ))
  }
}

pub struct MapErrObserver<O, F> {
  observer: O,
  map_err: F,
}

impl<Item, Err, O, F, E> Observer<Item, Err> for MapErrObserver<O, F>
where
  O: Observer<Item, E>,
  F: FnOnce(Err) -> E,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }
  #[inline]
  fn error(self, err: Err) { self.observer.error((self.map_err)(err)) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
