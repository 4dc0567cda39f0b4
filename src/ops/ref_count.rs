//! Makes a [`ConnectableObservable`] behave like an ordinary observable and
//! automates the way you connect to it.
//!
//! Internally it counts the subscribers and connects (only once) to the
//! source when the first one arrives. When the last one leaves it
//! disconnects. A later subscriber connects again. This way everything
//! before the published `ref_count` has only a single subscription,
//! independently of the number of subscribers downstream.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::prelude::*;

#[derive(Default)]
struct RefCountState {
  count: usize,
  connection: Option<SharedSubscription>,
}

pub struct RefCount<S, Sub> {
  connectable: Arc<ConnectableObservable<S, Sub>>,
  state: Arc<Mutex<RefCountState>>,
}

impl<S, Sub> Clone for RefCount<S, Sub> {
  fn clone(&self) -> Self {
    RefCount { connectable: self.connectable.clone(), state: self.state.clone() }
  }
}

impl<S, Sub> RefCount<S, Sub> {
  pub(crate) fn new(connectable: ConnectableObservable<S, Sub>) -> Self {
    RefCount { connectable: Arc::new(connectable), state: Arc::default() }
  }

  /// Another handle to the same shared connection.
  #[inline]
  pub fn fork(&self) -> Self { self.clone() }

  /// Number of subscribers currently attached.
  pub fn subscriber_count(&self) -> usize { self.state.lock().count }
}

impl<S, Sub> Observable for RefCount<S, Sub>
where
  S: Observable + Clone,
  Sub: Observable<Item = S::Item, Err = S::Err>
    + Observer<S::Item, S::Err>
    + Clone
    + Send
    + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    // attach before connecting so values emitted during `connect` are seen
    self.connectable.fork().actual_subscribe(subscriber);
    if subscription.is_closed() {
      return;
    }

    let first = {
      let mut state = self.state.lock();
      state.count += 1;
      state.count == 1
    };
    let state = self.state.clone();
    subscription.add_teardown(move || {
      let connection = {
        let mut state = state.lock();
        state.count -= 1;
        if state.count == 0 { state.connection.take() } else { None }
      };
      if let Some(mut connection) = connection {
        tracing::debug!("ref_count lost its last subscriber, disconnecting");
        connection.unsubscribe();
      }
    });

    if first {
      tracing::debug!("ref_count got its first subscriber, connecting");
      let mut connection = self.connectable.connect().into_inner();
      let mut state = self.state.lock();
      if state.count == 0 {
        drop(state);
        connection.unsubscribe();
      } else {
        state.connection = Some(connection);
      }
    }
  }
}
