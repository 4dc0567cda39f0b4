//! Zip operator implementation
//!
//! Zip combines items from two observables pairwise, emitting a tuple when
//! both sources have emitted a value.

use std::{cell::RefCell, collections::VecDeque, sync::Arc};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::prelude::*;

// ==================== Zip Operator ====================

/// Zip operator
///
/// Buffers the values of each source in arrival order and emits `(a, b)` as
/// soon as both buffers hold a value. Completes as soon as a source has
/// completed and its buffer is empty, because no further pair can be formed.
/// Pairs are forwarded while the buffers are held, so a completion racing in
/// from the other source cannot overtake a pair already formed.
#[derive(Clone)]
pub struct ZipOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

// ==================== Shared State ====================

struct ZipState<ItemA, ItemB> {
  buffer_a: VecDeque<ItemA>,
  buffer_b: VecDeque<ItemB>,
  completed_a: bool,
  completed_b: bool,
}

impl<ItemA, ItemB> ZipState<ItemA, ItemB> {
  fn exhausted(&self) -> bool {
    self.completed_a && self.buffer_a.is_empty() || self.completed_b && self.buffer_b.is_empty()
  }
}

type SharedState<ItemA, ItemB> = Arc<ReentrantMutex<RefCell<ZipState<ItemA, ItemB>>>>;
type StateGuard<'a, ItemA, ItemB> = ReentrantMutexGuard<'a, RefCell<ZipState<ItemA, ItemB>>>;
type Downstream<O, ItemA, ItemB, Err> = SerialObserver<Subscriber<O>, (ItemA, ItemB), Err>;

// ==================== Observable Implementation ====================

impl<A, B> Observable for ZipOp<A, B>
where
  A: Observable,
  B: Observable<Err = A::Err>,
  A::Item: Send + 'static,
  B::Item: Send + 'static,
  A::Err: Send + 'static,
{
  type Item = (A::Item, B::Item);
  type Err = A::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Self::Item, A::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let downstream = SerialObserver::new(subscriber);
    let state = Arc::new(ReentrantMutex::new(RefCell::new(ZipState {
      buffer_a: VecDeque::new(),
      buffer_b: VecDeque::new(),
      completed_a: false,
      completed_b: false,
    })));

    let a_observer = ZipAObserver { state: state.clone(), downstream: downstream.clone() };
    self.a.actual_subscribe(Subscriber::new(a_observer, subscription.child()));
    let b_observer = ZipBObserver { state, downstream };
    self.b.actual_subscribe(Subscriber::new(b_observer, subscription.child()));
  }
}

// ==================== Observer Implementations ====================

pub struct ZipAObserver<O, ItemA, ItemB, Err> {
  state: SharedState<ItemA, ItemB>,
  downstream: Downstream<O, ItemA, ItemB, Err>,
}

pub struct ZipBObserver<O, ItemA, ItemB, Err> {
  state: SharedState<ItemA, ItemB>,
  downstream: Downstream<O, ItemA, ItemB, Err>,
}

fn complete_if_exhausted<O, ItemA, ItemB, Err>(
  guard: &StateGuard<'_, ItemA, ItemB>, downstream: &Downstream<O, ItemA, ItemB, Err>,
) where
  O: Observer<(ItemA, ItemB), Err>,
{
  let exhausted = guard.borrow().exhausted();
  if exhausted {
    SerialObserver::complete(downstream)
  }
}

impl<O, ItemA, ItemB, Err> Observer<ItemA, Err> for ZipAObserver<O, ItemA, ItemB, Err>
where
  O: Observer<(ItemA, ItemB), Err>,
{
  fn next(&mut self, value: ItemA) {
    let guard = self.state.lock();
    let pair = {
      let mut state = guard.borrow_mut();
      match state.buffer_b.pop_front() {
        Some(b) => Some((value, b)),
        None => {
          state.buffer_a.push_back(value);
          None
        }
      }
    };
    if let Some(pair) = pair {
      SerialObserver::next(&self.downstream, pair);
      complete_if_exhausted(&guard, &self.downstream);
    }
  }

  fn error(self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(self) {
    let guard = self.state.lock();
    guard.borrow_mut().completed_a = true;
    complete_if_exhausted(&guard, &self.downstream);
  }

  fn is_closed(&self) -> bool { SerialObserver::is_closed(&self.downstream) }
}

impl<O, ItemA, ItemB, Err> Observer<ItemB, Err> for ZipBObserver<O, ItemA, ItemB, Err>
where
  O: Observer<(ItemA, ItemB), Err>,
{
  fn next(&mut self, value: ItemB) {
    let guard = self.state.lock();
    let pair = {
      let mut state = guard.borrow_mut();
      match state.buffer_a.pop_front() {
        Some(a) => Some((a, value)),
        None => {
          state.buffer_b.push_back(value);
          None
        }
      }
    };
    if let Some(pair) = pair {
      SerialObserver::next(&self.downstream, pair);
      complete_if_exhausted(&guard, &self.downstream);
    }
  }

  fn error(self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(self) {
    let guard = self.state.lock();
    guard.borrow_mut().completed_b = true;
    complete_if_exhausted(&guard, &self.downstream);
  }

  fn is_closed(&self) -> bool { SerialObserver::is_closed(&self.downstream) }
}

// ==================== Tests ====================
