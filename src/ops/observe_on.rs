use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::prelude::*;

/// Re-emits every event of the source on `scheduler`.
///
/// Events are queued in arrival order and drained by one scheduled task at a
/// time, so the downstream sees them in order and never concurrently, even
/// on a multi-threaded scheduler. Nothing is delivered once the downstream
/// subscription is closed.
#[derive(Clone)]
pub struct ObserveOnOp<S, Sch> {
  pub(crate) source: S,
  pub(crate) scheduler: Sch,
}

impl<S, Sch> Observable for ObserveOnOp<S, Sch>
where
  S: Observable,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let upstream = subscription.child();
    let observer = ObserveOnObserver {
      state: Arc::new(Mutex::new(ObserveOnState {
        pending: VecDeque::new(),
        draining: false,
        observer: Some(subscriber),
      })),
      scheduler: self.scheduler,
      subscription,
    };
    self.source.actual_subscribe(Subscriber::new(observer, upstream));
  }
}

struct ObserveOnState<O, Item, Err> {
  pending: VecDeque<Notification<Item, Err>>,
  draining: bool,
  /// `None` while an event is being delivered and after a terminal event.
  observer: Option<O>,
}

type SharedState<O, Item, Err> = Arc<Mutex<ObserveOnState<Subscriber<O>, Item, Err>>>;

pub struct ObserveOnObserver<O, Item, Err, Sch> {
  state: SharedState<O, Item, Err>,
  scheduler: Sch,
  subscription: SharedSubscription,
}

impl<O, Item, Err, Sch> ObserveOnObserver<O, Item, Err, Sch>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  Sch: Scheduler,
{
  fn enqueue(&self, notification: Notification<Item, Err>) {
    if self.subscription.is_closed() {
      return;
    }
    let start_drain = {
      let mut state = self.state.lock();
      state.pending.push_back(notification);
      !std::mem::replace(&mut state.draining, true)
    };
    if start_drain {
      let state = self.state.clone();
      let handle = self.scheduler.schedule(move || drain(&state), None);
      self.subscription.add(handle);
    }
  }
}

fn drain<O, Item, Err>(state: &SharedState<O, Item, Err>)
where
  O: Observer<Item, Err>,
{
  loop {
    let (notification, observer) = {
      let mut state = state.lock();
      let observer = match state.observer.take() {
        Some(observer) if !observer.is_closed() => observer,
        _ => {
          state.pending.clear();
          state.draining = false;
          return;
        }
      };
      let Some(notification) = state.pending.pop_front() else {
        state.observer = Some(observer);
        state.draining = false;
        return;
      };
      (notification, observer)
    };
    if let Some(observer) = notification.accept(observer) {
      state.lock().observer = Some(observer);
    }
  }
}

impl<O, Item, Err, Sch> Observer<Item, Err> for ObserveOnObserver<O, Item, Err, Sch>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  Sch: Scheduler,
{
  #[inline]
  fn next(&mut self, value: Item) { self.enqueue(Notification::Next(value)) }
  #[inline]
  fn error(self, err: Err) { self.enqueue(Notification::Error(err)) }
  #[inline]
  fn complete(self) { self.enqueue(Notification::Completed) }
  #[inline]
  fn is_closed(&self) -> bool { self.subscription.is_closed() }
}
