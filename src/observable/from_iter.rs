use std::convert::Infallible;

use crate::prelude::*;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Emission stops early once the subscriber is closed, so `from_iter` over an
/// unbounded iterator is fine as long as something downstream ends it.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(0..10).subscribe(|v| println!("{v},"));
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

/// Creates an observable producing a single value.
#[inline]
pub fn of<Item>(v: Item) -> ObservableIter<std::iter::Once<Item>> {
  from_iter(std::iter::once(v))
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<Iter> Observable for ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  type Item = Iter::Item;
  type Err = Infallible;

  fn actual_subscribe<O>(self, mut subscriber: Subscriber<O>)
  where
    O: Observer<Iter::Item, Infallible> + Send + 'static,
  {
    for v in self.0 {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(v);
    }
    subscriber.complete();
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use crate::prelude::*;
  use bencher::{benchmark_group, Bencher};

  #[test]
  fn from_range() {
    let hit_count = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let (c_hit, c_completed) = (hit_count.clone(), completed.clone());
    observable::from_iter(0..100).subscribe_all(
      move |_| {
        c_hit.fetch_add(1, Ordering::Relaxed);
      },
      |_| {},
      move || {
        c_completed.fetch_add(1, Ordering::Relaxed);
      },
    );

    assert_eq!(hit_count.load(Ordering::Relaxed), 100);
    assert_eq!(completed.load(Ordering::Relaxed), 1);
  }

  #[test]
  fn of() {
    let value = Arc::new(Mutex::new(0));
    let c_value = value.clone();
    observable::of(100).subscribe(move |v| *c_value.lock().unwrap() = v);
    assert_eq!(*value.lock().unwrap(), 100);
  }

  #[test]
  fn stops_on_unbounded_iterator() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    observable::from_iter(0..)
      .take(3)
      .subscribe(move |v| c_values.lock().unwrap().push(v));
    assert_eq!(*values.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn fork() {
    let count = Arc::new(AtomicUsize::new(0));
    let c_count = count.clone();
    let source = observable::from_iter(vec![0; 100]);
    let c2_count = count.clone();
    source.clone().subscribe(move |_| {
      c_count.fetch_add(1, Ordering::Relaxed);
    });
    source.subscribe(move |_| {
      c2_count.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(count.load(Ordering::Relaxed), 200);
  }

  #[test]
  fn bench() { do_bench(); }

  benchmark_group!(do_bench, bench_from_range);

  fn bench_from_range(b: &mut Bencher) { b.iter(from_range); }
}
