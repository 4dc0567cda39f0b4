use std::{
  any::Any,
  fmt::{Debug, Formatter},
  sync::{Arc, Weak},
};

use parking_lot::Mutex;
use smallvec::SmallVec;

/// Subscription returns from `Observable.subscribe(Subscriber)` to allow
///  unsubscribing.
pub trait SubscriptionLike {
  /// This allows deregistering an stream before it has finished receiving all
  /// events (i.e. before onCompleted is called).
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

pub trait TearDownSize: SubscriptionLike {
  fn teardown_size(&self) -> usize;
}

/// Handle returned by [`SharedSubscription::add`], used to detach a child
/// again without disposing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TeardownKey(usize);

/// A composite, thread-safe subscription.
///
/// Unsubscribing it runs every registered teardown exactly once, in
/// registration order. Anything added after it was unsubscribed is disposed
/// on the spot. Teardowns always run outside of the internal lock, so a
/// teardown may freely call back into the subscription that owns it.
#[derive(Clone, Default)]
pub struct SharedSubscription(Arc<Mutex<Inner>>);

enum Teardown {
  Subscription(Box<dyn SubscriptionLike + Send>),
  Fn(Box<dyn FnOnce() + Send>),
}

impl Teardown {
  fn is_closed(&self) -> bool {
    match self {
      Teardown::Subscription(s) => s.is_closed(),
      Teardown::Fn(_) => false,
    }
  }

  fn run(self) {
    match self {
      Teardown::Subscription(mut s) => s.unsubscribe(),
      Teardown::Fn(f) => f(),
    }
  }
}

#[derive(Default)]
struct Inner {
  closed: bool,
  next_key: usize,
  teardown: SmallVec<[(TeardownKey, Teardown); 1]>,
}

impl Inner {
  fn push(&mut self, v: Teardown) -> Result<TeardownKey, Teardown> {
    if self.closed {
      return Err(v);
    }
    self.teardown.retain(|(_, v)| !v.is_closed());
    let key = TeardownKey(self.next_key);
    self.next_key += 1;
    self.teardown.push((key, v));
    Ok(key)
  }
}

impl SharedSubscription {
  /// Attaches `subscription` so it is disposed together with `self`.
  pub fn add<S>(&self, subscription: S) -> TeardownKey
  where
    S: SubscriptionLike + Send + 'static,
  {
    if self.is_same(&subscription) {
      return TeardownKey(usize::MAX);
    }
    self.push(Teardown::Subscription(Box::new(subscription)))
  }

  /// Registers a closure to run once when `self` is unsubscribed.
  pub fn add_teardown(&self, f: impl FnOnce() + Send + 'static) -> TeardownKey {
    self.push(Teardown::Fn(Box::new(f)))
  }

  /// Detaches a previously added child without disposing it.
  pub fn remove(&self, key: TeardownKey) {
    let removed = {
      let mut inner = self.0.lock();
      inner
        .teardown
        .iter()
        .position(|(k, _)| *k == key)
        .map(|idx| inner.teardown.remove(idx))
    };
    // dropped outside of the lock, the child may own another subscription
    drop(removed);
  }

  /// Creates a subscription owned by `self` that detaches itself from `self`
  /// once it is unsubscribed, so finished children don't pile up in a long
  /// lived parent.
  pub fn child(&self) -> SharedSubscription {
    let child = SharedSubscription::default();
    let key = self.add(child.clone());
    let parent: Weak<Mutex<Inner>> = Arc::downgrade(&self.0);
    child.add_teardown(move || {
      if let Some(parent) = parent.upgrade() {
        SharedSubscription(parent).remove(key);
      }
    });
    child
  }

  fn push(&self, v: Teardown) -> TeardownKey {
    let rejected = self.0.lock().push(v);
    match rejected {
      Ok(key) => key,
      Err(v) => {
        v.run();
        TeardownKey(usize::MAX)
      }
    }
  }

  fn is_same(&self, other: &dyn Any) -> bool {
    if let Some(other) = other.downcast_ref::<Self>() {
      Arc::ptr_eq(&self.0, &other.0)
    } else {
      false
    }
  }
}

impl TearDownSize for SharedSubscription {
  fn teardown_size(&self) -> usize { self.0.lock().teardown.len() }
}

impl SubscriptionLike for SharedSubscription {
  fn unsubscribe(&mut self) {
    let teardown = {
      let mut inner = self.0.lock();
      if inner.closed {
        return;
      }
      inner.closed = true;
      std::mem::take(&mut inner.teardown)
    };
    for (_, v) in teardown {
      v.run();
    }
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.lock().closed }
}

impl Debug for SharedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let inner = self.0.lock();
    f.debug_struct("SharedSubscription")
      .field("closed", &inner.closed)
      .field("teardown_count", &inner.teardown.len())
      .finish()
  }
}

impl<T: ?Sized> SubscriptionLike for Box<T>
where
  T: SubscriptionLike,
{
  #[inline]
  fn unsubscribe(&mut self) {
    let s = &mut **self;
    s.unsubscribe()
  }

  #[inline]
  fn is_closed(&self) -> bool {
    let s = &**self;
    s.is_closed()
  }
}

/// Wrapper around a subscription which provides the
/// `unsubscribe_when_dropped()` method.
#[derive(Debug, Clone)]
pub struct SubscriptionWrapper<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionWrapper<T> {
  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard<T> {
    SubscriptionGuard(self.0)
  }

  /// Consumes this wrapper and returns the underlying subscription.
  pub fn into_inner(self) -> T { self.0 }
}

impl<T: SubscriptionLike> SubscriptionLike for SubscriptionWrapper<T> {
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
  #[inline]
  fn unsubscribe(&mut self) { self.0.unsubscribe() }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard<T: SubscriptionLike>(pub(crate) T);

impl<T: SubscriptionLike> SubscriptionGuard<T> {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: T) -> SubscriptionGuard<T> {
    SubscriptionGuard(subscription)
  }
}

impl<T: SubscriptionLike> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}
