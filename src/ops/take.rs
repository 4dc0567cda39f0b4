use crate::prelude::*;

/// Emits only the first `count` values emitted by the source Observable.
///
/// If the source emits fewer than `count` values then all of its values are
/// emitted. After that it completes, regardless if the source completes, and
/// the source is unsubscribed.
#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    if self.count == 0 {
      subscriber.complete();
      return;
    }
    let subscription = subscriber.subscription.clone();
    self.source.actual_subscribe(Subscriber::new(
      TakeObserver { observer: Some(subscriber), count: self.count, hits: 0 },
      subscription,
    ))
  }
}

pub struct TakeObserver<O> {
  observer: Option<Subscriber<O>>,
  count: usize,
  hits: usize,
}

impl<Item, Err, O> Observer<Item, Err> for TakeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.hits < self.count {
      self.hits += 1;
      self.observer.next(value);
      if self.hits == self.count {
        self.observer.take().complete();
      }
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }
  #[inline]
  fn complete(self) { self.observer.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  };

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let completed = Arc::new(AtomicBool::new(false));
    let next_count = Arc::new(Mutex::new(0));
    let c_completed = completed.clone();
    let c_next_count = next_count.clone();

    observable::from_iter(0..100).take(5).subscribe_all(
      move |_| *c_next_count.lock().unwrap() += 1,
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    assert_eq!(*next_count.lock().unwrap(), 5);
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn take_zero_completes_without_subscribing() {
    let completed = Arc::new(AtomicBool::new(false));
    let c_completed = completed.clone();
    let subject = Subject::<i32, ()>::default();
    subject.clone().take(0).subscribe_all(
      |_| unreachable!(),
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );
    assert!(completed.load(Ordering::Relaxed));
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn unsubscribes_source_after_last_value() {
    let subject = Subject::<i32, ()>::default();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let subscription = subject
      .clone()
      .take(2)
      .subscribe_err(move |v| c_values.lock().unwrap().push(v), |_| {});
    let mut source = subject.clone();
    source.next(1);
    source.next(2);
    source.next(3);
    assert_eq!(*values.lock().unwrap(), vec![1, 2]);
    assert!(subscription.is_closed());
    assert_eq!(subject.observer_count(), 0);
  }
}
