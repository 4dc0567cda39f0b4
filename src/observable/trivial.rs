use std::{convert::Infallible, marker::PhantomData};

use crate::prelude::*;

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(err: Err) -> ThrowObservable<Item, Err> {
  ThrowObservable(err, PhantomData)
}

pub struct ThrowObservable<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ThrowObservable<Item, Err> {
  fn clone(&self) -> Self { ThrowObservable(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for ThrowObservable<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    subscriber.error(self.0)
  }
}

/// Creates an observable that produces no values and completes immediately.
pub fn empty<Item>() -> EmptyObservable<Item> { EmptyObservable(PhantomData) }

pub struct EmptyObservable<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for EmptyObservable<Item> {
  fn clone(&self) -> Self { EmptyObservable(PhantomData) }
}

impl<Item> Observable for EmptyObservable<Item> {
  type Item = Item;
  type Err = Infallible;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Infallible> + Send + 'static,
  {
    subscriber.complete()
  }
}

/// Creates an observable that never emits anything and never terminates.
pub fn never<Item>() -> NeverObservable<Item> { NeverObservable(PhantomData) }

pub struct NeverObservable<Item>(PhantomData<fn() -> Item>);

impl<Item> Clone for NeverObservable<Item> {
  fn clone(&self) -> Self { NeverObservable(PhantomData) }
}

impl<Item> Observable for NeverObservable<Item> {
  type Item = Item;
  type Err = Infallible;

  #[inline]
  fn actual_subscribe<O>(self, _subscriber: Subscriber<O>)
  where
    O: Observer<Item, Infallible> + Send + 'static,
  {
  }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use crate::prelude::*;

  #[test]
  fn throw() {
    let value_emitted = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let errored = Arc::new(AtomicUsize::new(0));
    let (c_value, c_completed, c_errored) = (value_emitted.clone(), completed.clone(), errored.clone());

    observable::throw_err::<i32, _>("oops").subscribe_all(
      move |_| {
        c_value.fetch_add(1, Ordering::Relaxed);
      },
      move |e| {
        assert_eq!(e, "oops");
        c_errored.fetch_add(1, Ordering::Relaxed);
      },
      move || {
        c_completed.fetch_add(1, Ordering::Relaxed);
      },
    );
    assert_eq!(value_emitted.load(Ordering::Relaxed), 0);
    assert_eq!(completed.load(Ordering::Relaxed), 0);
    assert_eq!(errored.load(Ordering::Relaxed), 1);
  }

  #[test]
  fn empty() {
    let hits = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let (c_hits, c_completed) = (hits.clone(), completed.clone());
    observable::empty::<i32>().subscribe_all(
      move |_| {
        c_hits.fetch_add(1, Ordering::Relaxed);
      },
      |_| {},
      move || {
        c_completed.fetch_add(1, Ordering::Relaxed);
      },
    );
    assert_eq!(hits.load(Ordering::Relaxed), 0);
    assert_eq!(completed.load(Ordering::Relaxed), 1);
  }

  #[test]
  fn never_keeps_subscription_open() {
    let subscription = observable::never::<i32>().subscribe(|_| unreachable!());
    assert!(!subscription.is_closed());
  }
}
