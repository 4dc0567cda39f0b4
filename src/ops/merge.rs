use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::prelude::*;

/// Interleaves the values of two sources as they arrive.
///
/// Each source runs under its own child of the downstream subscription. The
/// merged stream completes when both sources completed; an error from either
/// is forwarded once and disposes both.
#[derive(Clone)]
pub struct MergeOp<S1, S2> {
  pub(crate) source1: S1,
  pub(crate) source2: S2,
}

impl<S1, S2> Observable for MergeOp<S1, S2>
where
  S1: Observable,
  S2: Observable<Item = S1::Item, Err = S1::Err>,
  S1::Item: Send + 'static,
  S1::Err: Send + 'static,
{
  type Item = S1::Item;
  type Err = S1::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S1::Item, S1::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let merge = MergeObserver {
      downstream: SerialObserver::new(subscriber),
      pending: Arc::new(AtomicUsize::new(2)),
    };
    self
      .source1
      .actual_subscribe(Subscriber::new(merge.clone(), subscription.child()));
    self
      .source2
      .actual_subscribe(Subscriber::new(merge, subscription.child()));
  }
}

pub struct MergeObserver<O, Item, Err> {
  downstream: SerialObserver<Subscriber<O>, Item, Err>,
  pending: Arc<AtomicUsize>,
}

impl<O, Item, Err> Clone for MergeObserver<O, Item, Err> {
  fn clone(&self) -> Self {
    MergeObserver { downstream: self.downstream.clone(), pending: self.pending.clone() }
  }
}

impl<O, Item, Err> Observer<Item, Err> for MergeObserver<O, Item, Err>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { SerialObserver::next(&self.downstream, value) }

  fn error(self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(self) {
    if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
      SerialObserver::complete(&self.downstream)
    }
  }

  fn is_closed(&self) -> bool { SerialObserver::is_closed(&self.downstream) }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use crate::prelude::*;

  #[test]
  fn odd_even_merge() {
    // three collection to store streams emissions
    let odd_store = Arc::new(Mutex::new(vec![]));
    let even_store = Arc::new(Mutex::new(vec![]));
    let numbers_store = Arc::new(Mutex::new(vec![]));

    let c_odd_store = odd_store.clone();
    let c_even_store = even_store.clone();
    let c_numbers_store = numbers_store.clone();

    let mut numbers = Subject::<i32, ()>::default();
    // enabling multiple observers for even stream;
    let even = numbers.clone().filter(|v| *v % 2 == 0);
    // enabling multiple observers for odd stream;
    let odd = numbers.clone().filter(|v| *v % 2 != 0);

    // merge odd and even stream again
    let merged = even.clone().merge(odd.clone());

    //  attach observers
    merged.subscribe_err(move |v| c_numbers_store.lock().unwrap().push(v), |_| {});
    odd.subscribe_err(move |v| c_odd_store.lock().unwrap().push(v), |_| {});
    even.subscribe_err(move |v| c_even_store.lock().unwrap().push(v), |_| {});

    (0..10).for_each(|v| {
      numbers.next(v);
    });

    assert_eq!(*even_store.lock().unwrap(), vec![0, 2, 4, 6, 8]);
    assert_eq!(*odd_store.lock().unwrap(), vec![1, 3, 5, 7, 9]);
    assert_eq!(*numbers_store.lock().unwrap(), (0..10).collect::<Vec<_>>());
  }

  #[test]
  fn merge_unsubscribe_work() {
    let mut numbers = Subject::<i32, ()>::default();
    let even = numbers.clone().filter(|v| *v % 2 == 0);
    let odd = numbers.clone().filter(|v| *v % 2 != 0);

    even
      .merge(odd)
      .subscribe_err(|_| unreachable!("oh, unsubscribe not work."), |_| {})
      .unsubscribe();

    numbers.next(1);
    assert_eq!(numbers.observer_count(), 0);
  }

  #[test]
  fn completed_test() {
    let completed = Arc::new(AtomicBool::new(false));
    let c_completed = completed.clone();
    let even = Subject::<i32, ()>::default();
    let odd = Subject::<i32, ()>::default();

    even.clone().merge(odd.clone()).subscribe_all(
      |_| {},
      |_| {},
      move || c_completed.store(true, Ordering::Relaxed),
    );

    even.clone().complete();
    assert!(!completed.load(Ordering::Relaxed));
    odd.clone().complete();
    assert!(completed.load(Ordering::Relaxed));
  }

  #[test]
  fn error_test() {
    let completed = Arc::new(AtomicBool::new(false));
    let errored = Arc::new(AtomicUsize::new(0));
    let c_completed = completed.clone();
    let c_errored = errored.clone();
    let even = Subject::<i32, &'static str>::default();
    let odd = Subject::<i32, &'static str>::default();

    even.clone().merge(odd.clone()).subscribe_all(
      |_| {},
      move |_| {
        c_errored.fetch_add(1, Ordering::Relaxed);
      },
      move || c_completed.store(true, Ordering::Relaxed),
    );

    odd.clone().error("");
    assert_eq!(even.observer_count(), 0);
    even.clone().error("");
    even.clone().complete();

    assert!(!completed.load(Ordering::Relaxed));
    assert_eq!(errored.load(Ordering::Relaxed), 1);
  }

  #[test]
  fn merge_fork() {
    let o = observable::from_iter(0..10).merge(observable::from_iter(10..20));
    let count = Arc::new(AtomicUsize::new(0));
    let c_count = count.clone();
    o.clone().merge(o).subscribe(move |_| {
      c_count.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(count.load(Ordering::Relaxed), 40);
  }

  #[test]
  fn finished_source_is_pruned() {
    let a = Subject::<i32, ()>::default();
    let b = Subject::<i32, ()>::default();
    let subscription = a.clone().merge(b.clone()).subscribe_err(|_| {}, |_| {});
    assert_eq!(subscription.0.teardown_size(), 2);
    a.clone().complete();
    assert_eq!(subscription.0.teardown_size(), 1);
    assert!(!subscription.is_closed());
  }
}
