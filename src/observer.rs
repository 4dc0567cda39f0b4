//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::fmt::Debug;

use crate::rc::MutArc;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  ///
  /// This consumes the observer, as no more values can be emitted after an
  /// error
  fn error(self, err: Err);

  /// Handle completion of the observable
  ///
  /// This consumes the observer, as no more values can be emitted after
  /// completion
  fn complete(self);

  /// Returns `true` if the observer is closed and will not accept more values.
  ///
  /// Synchronous sources like `from_iter` poll it to stop emitting early.
  fn is_closed(&self) -> bool;
}

// ============================================================================
// DynObserver Trait - Object-safe Observer
// ============================================================================

/// Helper trait to enable object-safe Observers (Box<dyn Observer>)
///
/// Standard Observer trait is not object-safe because methods take `self` by
/// value. DynObserver mirrors the interface but adapts it for vtables.
pub trait DynObserver<Item, Err> {
  fn box_next(&mut self, value: Item);
  fn box_error(self: Box<Self>, err: Err);
  fn box_complete(self: Box<Self>);
  fn box_is_closed(&self) -> bool;
}

impl<T, Item, Err> DynObserver<Item, Err> for T
where
  T: Observer<Item, Err>,
{
  fn box_next(&mut self, value: Item) { self.next(value); }
  fn box_error(self: Box<Self>, err: Err) { self.error(err); }
  fn box_complete(self: Box<Self>) { self.complete(); }
  fn box_is_closed(&self) -> bool { self.is_closed() }
}

/// Boxed value observer, the element type of every multicast observer list.
pub type BoxedObserver<Item, Err> = Box<dyn DynObserver<Item, Err> + Send>;

impl<Item, Err> Observer<Item, Err> for BoxedObserver<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (**self).box_next(value) }

  #[inline]
  fn error(self, err: Err) { self.box_error(err) }

  #[inline]
  fn complete(self) { self.box_complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).box_is_closed() }
}

// ============================================================================
// Closure adapters
// ============================================================================

/// Observer built from a single `next` closure.
///
/// It has nowhere to send an error, so an error reaching it is logged and
/// then raised as a panic.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnMutObserver<F>
where
  F: FnMut(Item),
  Err: Debug,
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }

  fn error(self, err: Err) {
    tracing::error!(?err, "unhandled error reached a subscriber without an error handler");
    panic!("unhandled observable error: {err:?}");
  }

  #[inline]
  fn complete(self) {}

  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from `next` and `error` closures.
#[derive(Clone)]
pub struct ObserverErr<N, E> {
  pub(crate) next: N,
  pub(crate) error: E,
}

impl<N, E, Item, Err> Observer<Item, Err> for ObserverErr<N, E>
where
  N: FnMut(Item),
  E: FnOnce(Err),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.next)(v); }
  #[inline]
  fn error(self, err: Err) { (self.error)(err); }
  #[inline]
  fn complete(self) {}
  #[inline]
  fn is_closed(&self) -> bool { false }
}

/// Observer built from `next`, `error` and `complete` closures.
#[derive(Clone)]
pub struct ObserverAll<N, E, C> {
  pub(crate) next: N,
  pub(crate) error: E,
  pub(crate) complete: C,
}

impl<N, E, C, Item, Err> Observer<Item, Err> for ObserverAll<N, E, C>
where
  N: FnMut(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.next)(v); }
  #[inline]
  fn error(self, err: Err) { (self.error)(err); }
  #[inline]
  fn complete(self) { (self.complete)(); }
  #[inline]
  fn is_closed(&self) -> bool { false }
}

// ============================================================================
// Observer implementations for Option and reference-counted Option wrappers
// ============================================================================

/// Option observer - None ignores all events, Some delegates to inner
impl<O, Item, Err> Observer<Item, Err> for Option<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(inner) = self {
      inner.next(value);
    }
  }

  fn error(self, err: Err) {
    if let Some(inner) = self {
      inner.error(err);
    }
  }

  fn complete(self) {
    if let Some(inner) = self {
      inner.complete();
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Observer::is_closed) }
}

/// MutArc<Option<O>> - shared ownership observer.
/// Terminal events take the inner observer out and call it after the lock is
/// released, so the callee may re-enter.
impl<O, Item, Err> Observer<Item, Err> for MutArc<Option<O>>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.rc_deref_mut().next(value); }

  fn error(self, err: Err) {
    let inner = self.rc_deref_mut().take();
    inner.error(err);
  }

  fn complete(self) {
    let inner = self.rc_deref_mut().take();
    inner.complete();
  }

  fn is_closed(&self) -> bool { self.rc_deref_mut().is_closed() }
}

// ============================================================================
// Tests
// ============================================================================
