use crate::prelude::*;

/// Emits every value of `source1`, then subscribes `source2` and emits its
/// values.
///
/// `source2` is not subscribed before `source1` completes, and never if
/// `source1` errors or the downstream is disposed first.
#[derive(Clone)]
pub struct ConcatOp<S1, S2> {
  pub(crate) source1: S1,
  pub(crate) source2: S2,
}

impl<S1, S2> Observable for ConcatOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item, Err = S1::Err> + Send + 'static,
{
  type Item = S1::Item;
  type Err = S1::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S1::Item, S1::Err> + Send + 'static,
  {
    let first = subscriber.subscription.child();
    self.source1.actual_subscribe(Subscriber::new(
      ConcatObserver { observer: Some(subscriber), next_source: Some(self.source2) },
      first,
    ))
  }
}

pub struct ConcatObserver<O, S> {
  observer: Option<Subscriber<O>>,
  next_source: Option<S>,
}

impl<Item, Err, O, S> Observer<Item, Err> for ConcatObserver<O, S>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item = Item, Err = Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(mut self) {
    let (Some(observer), Some(source)) = (self.observer.take(), self.next_source.take()) else {
      return;
    };
    if !observer.is_closed() {
      // the second source shares the downstream subscription directly
      source.actual_subscribe(observer);
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
