use std::{cell::RefCell, sync::Arc};

use parking_lot::ReentrantMutex;

use crate::prelude::*;

/// Emits `binary_op(latest_a, latest_b)` whenever either source emits, once
/// both have emitted at least once. Completes after both sources completed.
#[derive(Clone)]
pub struct CombineLatestOp<A, B, BinaryOp> {
  pub(crate) a: A,
  pub(crate) b: B,
  pub(crate) binary_op: BinaryOp,
}

impl<A, B, BinaryOp, OutputItem> Observable for CombineLatestOp<A, B, BinaryOp>
where
  A: Observable,
  B: Observable<Err = A::Err>,
  BinaryOp: FnMut(A::Item, B::Item) -> OutputItem + Send + 'static,
  A::Item: Clone + Send + 'static,
  B::Item: Clone + Send + 'static,
  A::Err: Send + 'static,
  OutputItem: Send + 'static,
{
  type Item = OutputItem;
  type Err = A::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<OutputItem, A::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let combine = CombineLatestObserver {
      state: Arc::new(ReentrantMutex::new(RefCell::new(CombineState {
        a: None,
        b: None,
        completed: 0,
        binary_op: self.binary_op,
      }))),
      downstream: SerialObserver::new(subscriber),
    };
    self
      .a
      .actual_subscribe(Subscriber::new(AObserver(combine.clone()), subscription.child()));
    self
      .b
      .actual_subscribe(Subscriber::new(BObserver(combine), subscription.child()));
  }
}

enum CombineItem<A, B> {
  ItemA(A),
  ItemB(B),
}

struct CombineState<A, B, BinaryOp> {
  a: Option<A>,
  b: Option<B>,
  completed: usize,
  binary_op: BinaryOp,
}

/// Outputs are forwarded while the state is held, so they reach the
/// downstream in the order they were computed.
pub struct CombineLatestObserver<O, A, B, BinaryOp, OutputItem, Err> {
  state: Arc<ReentrantMutex<RefCell<CombineState<A, B, BinaryOp>>>>,
  downstream: SerialObserver<Subscriber<O>, OutputItem, Err>,
}

impl<O, A, B, BinaryOp, OutputItem, Err> Clone
  for CombineLatestObserver<O, A, B, BinaryOp, OutputItem, Err>
{
  fn clone(&self) -> Self {
    CombineLatestObserver { state: self.state.clone(), downstream: self.downstream.clone() }
  }
}

impl<O, A, B, BinaryOp, OutputItem, Err> CombineLatestObserver<O, A, B, BinaryOp, OutputItem, Err>
where
  O: Observer<OutputItem, Err>,
  BinaryOp: FnMut(A, B) -> OutputItem,
  A: Clone,
  B: Clone,
{
  fn next(&self, value: CombineItem<A, B>) {
    let guard = self.state.lock();
    let output = {
      let mut state = guard.borrow_mut();
      match value {
        CombineItem::ItemA(v) => state.a = Some(v),
        CombineItem::ItemB(v) => state.b = Some(v),
      }
      match (state.a.clone(), state.b.clone()) {
        (Some(a), Some(b)) => Some((state.binary_op)(a, b)),
        _ => None,
      }
    };
    if let Some(output) = output {
      SerialObserver::next(&self.downstream, output);
    }
  }

  fn error(&self, err: Err) { SerialObserver::error(&self.downstream, err) }

  fn complete(&self) {
    let guard = self.state.lock();
    let all_completed = {
      let mut state = guard.borrow_mut();
      state.completed += 1;
      state.completed == 2
    };
    if all_completed {
      SerialObserver::complete(&self.downstream)
    }
  }
}

pub struct AObserver<C>(C);

pub struct BObserver<C>(C);

impl<O, A, B, BinaryOp, OutputItem, Err> Observer<A, Err>
  for AObserver<CombineLatestObserver<O, A, B, BinaryOp, OutputItem, Err>>
where
  O: Observer<OutputItem, Err>,
  BinaryOp: FnMut(A, B) -> OutputItem,
  A: Clone,
  B: Clone,
{
  #[inline]
  fn next(&mut self, value: A) { self.0.next(CombineItem::ItemA(value)) }
  #[inline]
  fn error(self, err: Err) { self.0.error(err) }
  #[inline]
  fn complete(self) { self.0.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}

impl<O, A, B, BinaryOp, OutputItem, Err> Observer<B, Err>
  for BObserver<CombineLatestObserver<O, A, B, BinaryOp, OutputItem, Err>>
where
  O: Observer<OutputItem, Err>,
  BinaryOp: FnMut(A, B) -> OutputItem,
  A: Clone,
  B: Clone,
{
  #[inline]
  fn next(&mut self, value: B) { self.0.next(CombineItem::ItemB(value)) }
  #[inline]
  fn error(self, err: Err) { self.0.error(err) }
  #[inline]
  fn complete(self) { self.0.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.downstream.is_closed() }
}
