//! The `Observable` trait, the factories that create sources, and the
//! chainable operator surface in [`ObservableExt`].

use std::fmt::Debug;

use crate::{ops::*, prelude::*};

mod connectable;
mod create;
mod from_iter;
mod interval;
mod range;
mod trivial;

pub use connectable::ConnectableObservable;
pub use create::{create, BoxedSubscriber, ObservableFn};
pub use from_iter::{from_iter, of, ObservableIter};
pub use interval::{interval, interval_at, IntervalObservable};
pub use range::{range, RangeObservable};
pub use trivial::{empty, never, throw_err, EmptyObservable, NeverObservable, ThrowObservable};

/// A representation of any set of values over any amount of time.
///
/// An observable is an immutable description of how to produce a sequence.
/// All mutable state belongs to a subscription and is created in
/// `actual_subscribe`, so subscribing a cold observable twice produces the
/// sequence twice.
pub trait Observable: Sized {
  type Item;
  type Err;

  /// Starts production into `subscriber`. The producer must stop once the
  /// subscriber's subscription is closed, and anything it allocates that
  /// outlives this call must be registered in that subscription.
  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static;
}

pub trait ObservableExt: Observable {
  // ==================== subscribe ====================

  /// Subscribes `observer`, returning the subscription that controls it.
  fn subscribe_with<O>(self, observer: O) -> SubscriptionWrapper<SharedSubscription>
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::default();
    self.actual_subscribe(Subscriber::new(observer, subscription.clone()));
    SubscriptionWrapper(subscription)
  }

  /// Subscribes `observer` under a child of `parent`, so disposing `parent`
  /// also disposes this subscription.
  fn subscribe_in<O>(self, observer: O, parent: &SharedSubscription) -> SharedSubscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscription = parent.child();
    self.actual_subscribe(Subscriber::new(observer, subscription.clone()));
    subscription
  }

  /// Subscribes a `next` handler only. An error arriving here has nowhere to
  /// go and panics.
  fn subscribe<N>(self, next: N) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    Self::Err: Debug,
  {
    self.subscribe_with(FnMutObserver(next))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
  {
    self.subscribe_with(ObserverErr { next, error })
  }

  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> SubscriptionWrapper<SharedSubscription>
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_with(ObserverAll { next, error, complete })
  }

  // ==================== transform ====================

  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Converts the error of the stream.
  fn map_err<E, F>(self, f: F) -> MapErrOp<Self, F>
  where
    F: FnOnce(Self::Err) -> E,
  {
    MapErrOp { source: self, func: f }
  }

  /// Emit only those items from an Observable that pass a predicate.
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, filter }
  }

  /// Like [`filter`](ObservableExt::filter), but a predicate failure ends the
  /// stream with that error and unsubscribes the source.
  fn filter_with_err<F>(self, filter: F) -> FilterWithErrOp<Self, F>
  where
    F: FnMut(&Self::Item) -> Result<bool, Self::Err>,
  {
    FilterWithErrOp { source: self, filter }
  }

  /// Emits only the first `count` values, then completes and unsubscribes
  /// the source.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp { source: self, count } }

  /// Applies `binary_op` to an accumulator and each value, starting from
  /// `initial_value`, and emits every intermediate accumulator.
  fn scan_initial<Acc, F>(self, initial_value: Acc, binary_op: F) -> ScanOp<Self, F, Acc>
  where
    F: FnMut(Acc, Self::Item) -> Acc,
  {
    ScanOp { source: self, binary_op, initial_value }
  }

  /// Works like [`scan_initial`](ObservableExt::scan_initial) but the first
  /// value seeds the accumulator and is emitted unchanged.
  fn scan<F>(self, binary_op: F) -> ScanFirstOp<Self, F>
  where
    F: FnMut(Self::Item, Self::Item) -> Self::Item,
  {
    ScanFirstOp { source: self, binary_op }
  }

  // ==================== flatten / combine ====================

  /// Maps every value to an inner observable and merges the values of all
  /// inner observables. Completes once the source and every inner
  /// observable completed.
  fn flat_map<F, Inner>(self, f: F) -> FlatMapOp<Self, PlainSelector<F>>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    FlatMapOp { source: self, selector: PlainSelector(f) }
  }

  /// `flat_map` with fallible selectors. `collection_selector` picks the
  /// inner observable for a value, `result_selector` combines the value with
  /// each of its inner values. An `Err` from either ends the stream.
  fn flat_map_with_err<CS, RS, Inner, Out>(
    self, collection_selector: CS, result_selector: RS,
  ) -> FlatMapOp<Self, ResultSelector<CS, RS>>
  where
    CS: FnMut(&Self::Item) -> Result<Inner, Self::Err>,
    RS: FnMut(&Self::Item, Inner::Item) -> Result<Out, Self::Err>,
    Inner: Observable<Err = Self::Err>,
  {
    FlatMapOp {
      source: self,
      selector: ResultSelector::new(collection_selector, result_selector),
    }
  }

  /// Flattens an observable of observables by merging the inner ones.
  fn merge_all(self) -> FlatMapOp<Self, IdentitySelector>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    FlatMapOp { source: self, selector: IdentitySelector }
  }

  /// Interleaves the values of both observables as they arrive.
  fn merge<S>(self, other: S) -> MergeOp<Self, S>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    MergeOp { source1: self, source2: other }
  }

  /// Emits all values of `self`, then subscribes `other` and emits its
  /// values.
  fn concat<S>(self, other: S) -> ConcatOp<Self, S>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    ConcatOp { source1: self, source2: other }
  }

  /// Pairs the n-th value of `self` with the n-th value of `other`.
  fn zip<S>(self, other: S) -> ZipOp<Self, S>
  where
    S: Observable<Err = Self::Err>,
  {
    ZipOp { a: self, b: other }
  }

  /// Emits `binary_op(latest_a, latest_b)` whenever either source emits,
  /// once both have emitted at least once.
  fn combine_latest<S, F, Out>(self, other: S, binary_op: F) -> CombineLatestOp<Self, S, F>
  where
    S: Observable<Err = Self::Err>,
    F: FnMut(Self::Item, S::Item) -> Out,
  {
    CombineLatestOp { a: self, b: other, binary_op }
  }

  // ==================== notifications ====================

  /// Turns every event into a [`Notification`] value. The resulting stream
  /// completes right after the source's terminal event.
  fn materialize(self) -> MaterializeOp<Self> { MaterializeOp { source: self } }

  /// The inverse of [`materialize`](ObservableExt::materialize).
  fn dematerialize(self) -> DematerializeOp<Self> { DematerializeOp { source: self } }

  // ==================== multicast ====================

  /// Shares one subscription to `self` through a [`Subject`] once
  /// connected.
  fn publish(self) -> ConnectableObservable<Self, Subject<Self::Item, Self::Err>> {
    ConnectableObservable::new(self, Subject::default())
  }

  /// Like [`publish`](ObservableExt::publish), but only the last value is
  /// delivered, after the source completes, to current and late
  /// subscribers.
  fn publish_last(self) -> ConnectableObservable<Self, AsyncSubject<Self::Item, Self::Err>> {
    ConnectableObservable::new(self, AsyncSubject::default())
  }

  /// Like [`publish`](ObservableExt::publish), but late subscribers first
  /// receive up to `capacity` of the most recent values (all of them when
  /// `None`).
  fn replay(
    self, capacity: Option<usize>,
  ) -> ConnectableObservable<Self, ReplaySubject<Self::Item, Self::Err>> {
    ConnectableObservable::new(self, ReplaySubject::new(capacity))
  }

  // ==================== scheduling ====================

  /// Performs the subscription to `self` as a task on `scheduler`.
  fn subscribe_on<Sch: Scheduler>(self, scheduler: Sch) -> SubscribeOnOp<Self, Sch> {
    SubscribeOnOp { source: self, scheduler }
  }

  /// Delivers every event on `scheduler`, in order.
  fn observe_on<Sch: Scheduler>(self, scheduler: Sch) -> ObserveOnOp<Self, Sch> {
    ObserveOnOp { source: self, scheduler }
  }
}

impl<T: Observable> ObservableExt for T {}
