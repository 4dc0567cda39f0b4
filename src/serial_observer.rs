use std::{cell::RefCell, collections::VecDeque, sync::Arc};

use parking_lot::ReentrantMutex;

use crate::prelude::*;

/// Serializes every call into one downstream observer.
///
/// Calls from different threads are mutually exclusive. A call made from
/// inside a delivery on the same thread (for example a value pushed while
/// the downstream is unsubscribing) is queued and delivered once the outer
/// delivery returns, so the downstream never sees nested calls. Once a
/// terminal event is delivered everything else is dropped.
pub struct SerialObserver<O, Item, Err>(Arc<ReentrantMutex<RefCell<SerialState<O, Item, Err>>>>);

struct SerialState<O, Item, Err> {
  observer: Option<O>,
  pending: VecDeque<Notification<Item, Err>>,
  busy: bool,
  done: bool,
}

impl<O, Item, Err> Clone for SerialObserver<O, Item, Err> {
  fn clone(&self) -> Self { SerialObserver(self.0.clone()) }
}

impl<O, Item, Err> SerialObserver<O, Item, Err>
where
  O: Observer<Item, Err>,
{
  pub fn new(observer: O) -> Self {
    SerialObserver(Arc::new(ReentrantMutex::new(RefCell::new(SerialState {
      observer: Some(observer),
      pending: VecDeque::new(),
      busy: false,
      done: false,
    }))))
  }

  #[inline]
  pub fn next(&self, value: Item) { self.deliver(Notification::Next(value)) }

  #[inline]
  pub fn error(&self, err: Err) { self.deliver(Notification::Error(err)) }

  #[inline]
  pub fn complete(&self) { self.deliver(Notification::Completed) }

  pub fn is_closed(&self) -> bool {
    let guard = self.0.lock();
    let state = guard.borrow();
    state.done || state.observer.as_ref().map_or(false, |o| o.is_closed())
  }

  fn deliver(&self, notification: Notification<Item, Err>) {
    let guard = self.0.lock();
    {
      let mut state = guard.borrow_mut();
      if state.done {
        tracing::trace!("dropping event delivered after a terminal event");
        return;
      }
      state.pending.push_back(notification);
      if state.busy {
        return;
      }
      state.busy = true;
    }

    loop {
      let (notification, observer) = {
        let mut state = guard.borrow_mut();
        let Some(notification) = state.pending.pop_front() else {
          state.busy = false;
          return;
        };
        let Some(observer) = state.observer.take() else {
          state.pending.clear();
          state.busy = false;
          return;
        };
        if notification.is_terminal() {
          state.done = true;
          state.pending.clear();
        }
        (notification, observer)
      };
      if let Some(observer) = notification.accept(observer) {
        guard.borrow_mut().observer = Some(observer);
      }
    }
  }
}

impl<O, Item, Err> Observer<Item, Err> for SerialObserver<O, Item, Err>
where
  O: Observer<Item, Err>,
{
  #[inline]
  fn next(&mut self, value: Item) { SerialObserver::next(self, value) }

  #[inline]
  fn error(self, err: Err) { SerialObserver::error(&self, err) }

  #[inline]
  fn complete(self) { SerialObserver::complete(&self) }

  #[inline]
  fn is_closed(&self) -> bool { SerialObserver::is_closed(self) }
}
