use crate::prelude::*;

/// Applies `binary_op` to an accumulator and every source value and emits
/// each intermediate accumulator, starting from `initial_value`.
#[derive(Clone)]
pub struct ScanOp<S, F, Acc> {
  pub(crate) source: S,
  pub(crate) binary_op: F,
  pub(crate) initial_value: Acc,
}

pub struct ScanObserver<O, F, Acc> {
  observer: O,
  binary_op: F,
  acc: Acc,
}

impl<S, F, Acc> Observable for ScanOp<S, F, Acc>
where
  S: Observable,
  Acc: Clone + Send + 'static,
  F: FnMut(Acc, S::Item) -> Acc + Send + 'static,
{
  type Item = Acc;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Acc, S::Err> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(
      ScanObserver { observer, binary_op: self.binary_op, acc: self.initial_value },
      subscription,
    ))
  }
}

impl<Item, Err, O, F, Acc> Observer<Item, Err> for ScanObserver<O, F, Acc>
where
  O: Observer<Acc, Err>,
  F: FnMut(Acc, Item) -> Acc,
  Acc: Clone,
{
  fn next(&mut self, value: Item) {
    let acc = (self.binary_op)(self.acc.clone(), value);
    self.acc = acc.clone();
    self.observer.next(acc)
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Scan whose accumulator is seeded by the first source value. That first
/// value is emitted unchanged.
#[derive(Clone)]
pub struct ScanFirstOp<S, F> {
  pub(crate) source: S,
  pub(crate) binary_op: F,
}

pub struct ScanFirstObserver<O, F, Item> {
  observer: O,
  binary_op: F,
  acc: Option<Item>,
}

impl<S, F> Observable for ScanFirstOp<S, F>
where
  S: Observable,
  S::Item: Clone + Send + 'static,
  F: FnMut(S::Item, S::Item) -> S::Item + Send + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(
      ScanFirstObserver { observer, binary_op: self.binary_op, acc: None },
      subscription,
    ))
  }
}

impl<Item, Err, O, F> Observer<Item, Err> for ScanFirstObserver<O, F, Item>
where
  O: Observer<Item, Err>,
  F: FnMut(Item, Item) -> Item,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    let acc = match self.acc.take() {
      Some(acc) => (self.binary_op)(acc, value),
      None => value,
    };
    self.acc = Some(acc.clone());
    self.observer.next(acc)
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
