use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use parking_lot::Mutex;

use crate::prelude::*;

/// Picks the inner observable for an outer value.
///
/// An `Err` ends the whole flattened stream with that error.
pub trait FlatMapSelector<Item, Err> {
  type Inner: Observable<Err = Err>;

  fn select(&mut self, value: Item) -> Result<Self::Inner, Err>;
}

/// Selector from a plain closure, it cannot fail.
#[derive(Clone)]
pub struct PlainSelector<F>(pub(crate) F);

impl<Item, Err, F, Inner> FlatMapSelector<Item, Err> for PlainSelector<F>
where
  F: FnMut(Item) -> Inner,
  Inner: Observable<Err = Err>,
{
  type Inner = Inner;

  #[inline]
  fn select(&mut self, value: Item) -> Result<Inner, Err> { Ok((self.0)(value)) }
}

/// The outer values are observables already.
#[derive(Clone, Copy, Default)]
pub struct IdentitySelector;

impl<Item, Err> FlatMapSelector<Item, Err> for IdentitySelector
where
  Item: Observable<Err = Err>,
{
  type Inner = Item;

  #[inline]
  fn select(&mut self, value: Item) -> Result<Item, Err> { Ok(value) }
}

/// A fallible collection selector paired with a fallible result selector
/// that sees the outer value next to every inner value.
///
/// The result selector is shared by every inner subscription (and by clones
/// of this selector), so it runs under a lock.
pub struct ResultSelector<CS, RS> {
  collection: CS,
  result: Arc<Mutex<RS>>,
}

impl<CS, RS> ResultSelector<CS, RS> {
  pub fn new(collection: CS, result: RS) -> Self {
    ResultSelector { collection, result: Arc::new(Mutex::new(result)) }
  }
}

impl<CS: Clone, RS> Clone for ResultSelector<CS, RS> {
  fn clone(&self) -> Self {
    ResultSelector { collection: self.collection.clone(), result: self.result.clone() }
  }
}

impl<Item, Err, CS, RS, Inner, Out> FlatMapSelector<Item, Err> for ResultSelector<CS, RS>
where
  CS: FnMut(&Item) -> Result<Inner, Err>,
  RS: FnMut(&Item, Inner::Item) -> Result<Out, Err> + Send + 'static,
  Inner: Observable<Err = Err>,
  Item: Send + Sync + 'static,
{
  type Inner = ResultSelectOp<Inner, Item, RS>;

  fn select(&mut self, value: Item) -> Result<Self::Inner, Err> {
    let source = (self.collection)(&value)?;
    Ok(ResultSelectOp { source, value: Arc::new(value), result: self.result.clone() })
  }
}

/// One inner observable of [`ResultSelector`], mapping its values through
/// the result selector.
pub struct ResultSelectOp<S, Item, RS> {
  source: S,
  value: Arc<Item>,
  result: Arc<Mutex<RS>>,
}

impl<S, Item, RS, Out> Observable for ResultSelectOp<S, Item, RS>
where
  S: Observable,
  Item: Send + Sync + 'static,
  RS: FnMut(&Item, S::Item) -> Result<Out, S::Err> + Send + 'static,
{
  type Item = Out;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Out, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    self.source.actual_subscribe(Subscriber::new(
      ResultSelectObserver {
        observer: Some(subscriber),
        value: self.value,
        result: self.result,
      },
      subscription,
    ))
  }
}

pub struct ResultSelectObserver<O, Item, RS> {
  observer: Option<Subscriber<O>>,
  value: Arc<Item>,
  result: Arc<Mutex<RS>>,
}

impl<InnerItem, Err, O, Item, RS, Out> Observer<InnerItem, Err> for ResultSelectObserver<O, Item, RS>
where
  O: Observer<Out, Err>,
  RS: FnMut(&Item, InnerItem) -> Result<Out, Err>,
{
  fn next(&mut self, value: InnerItem) {
    if self.observer.is_none() {
      return;
    }
    let selected = (self.result.lock())(&self.value, value);
    match selected {
      Ok(v) => self.observer.next(v),
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

/// Maps every source value to an inner observable and merges the values of
/// all inner observables.
///
/// The outer subscription and every inner subscription are children of the
/// downstream subscription: any error, or disposing the downstream, tears all
/// of them down, while an inner that completes detaches only itself. The
/// stream completes once the source and every inner completed.
#[derive(Clone)]
pub struct FlatMapOp<S, Sel> {
  pub(crate) source: S,
  pub(crate) selector: Sel,
}

impl<S, Sel> Observable for FlatMapOp<S, Sel>
where
  S: Observable,
  S::Err: Send + 'static,
  Sel: FlatMapSelector<S::Item, S::Err> + Send + 'static,
  <Sel::Inner as Observable>::Item: Send + 'static,
{
  type Item = <Sel::Inner as Observable>::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Self::Item, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let outer_subscription = subscription.child();
    let outer = OuterObserver {
      selector: self.selector,
      downstream: SerialObserver::new(subscriber),
      // the outer source itself counts as one pending stream
      pending: Arc::new(AtomicUsize::new(1)),
      subscription,
    };
    self.source.actual_subscribe(Subscriber::new(outer, outer_subscription));
  }
}

pub struct OuterObserver<Sel, O, Out, Err> {
  selector: Sel,
  downstream: SerialObserver<Subscriber<O>, Out, Err>,
  pending: Arc<AtomicUsize>,
  subscription: SharedSubscription,
}

impl<Item, Err, Sel, O, Out> Observer<Item, Err> for OuterObserver<Sel, O, Out, Err>
where
  Sel: FlatMapSelector<Item, Err>,
  Sel::Inner: Observable<Item = Out, Err = Err>,
  O: Observer<Out, Err> + Send + 'static,
  Out: Send + 'static,
  Err: Send + 'static,
{
  fn next(&mut self, value: Item) {
    match self.selector.select(value) {
      Ok(inner) => {
        self.pending.fetch_add(1, Ordering::AcqRel);
        let inner_observer =
          InnerObserver { downstream: self.downstream.clone(), pending: self.pending.clone() };
        inner.actual_subscribe(Subscriber::new(inner_observer, self.subscription.child()));
      }
      Err(err) => SerialObserver::error(&self.downstream, err),
    }
  }

  fn error(self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(self) { complete_one(&self.pending, &self.downstream) }

  fn is_closed(&self) -> bool { SerialObserver::is_closed(&self.downstream) }
}

pub struct InnerObserver<O, Out, Err> {
  downstream: SerialObserver<Subscriber<O>, Out, Err>,
  pending: Arc<AtomicUsize>,
}

impl<O, Out, Err> Observer<Out, Err> for InnerObserver<O, Out, Err>
where
  O: Observer<Out, Err>,
{
  #[inline]
  fn next(&mut self, value: Out) { SerialObserver::next(&self.downstream, value) }

  fn error(self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(self) { complete_one(&self.pending, &self.downstream) }

  fn is_closed(&self) -> bool { SerialObserver::is_closed(&self.downstream) }
}

fn complete_one<O, Out, Err>(pending: &AtomicUsize, downstream: &SerialObserver<Subscriber<O>, Out, Err>)
where
  O: Observer<Out, Err>,
{
  if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
    SerialObserver::complete(downstream)
  }
}
