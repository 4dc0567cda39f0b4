use std::convert::Infallible;

use crate::prelude::*;

/// Delivers every event of the source as a [`Notification`] value.
///
/// The source's terminal event is emitted as a value and followed by a
/// completion, so a materialized stream never errors.
#[derive(Clone)]
pub struct MaterializeOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for MaterializeOp<S>
where
  S: Observable,
{
  type Item = Notification<S::Item, S::Err>;
  type Err = Infallible;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Self::Item, Infallible> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    self.source.actual_subscribe(Subscriber::new(MaterializeObserver(observer), subscription))
  }
}

pub struct MaterializeObserver<O>(O);

impl<Item, Err, O> Observer<Item, Err> for MaterializeObserver<O>
where
  O: Observer<Notification<Item, Err>, Infallible>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(Notification::Next(value)) }

  fn error(mut self, err: Err) {
    self.0.next(Notification::Error(err));
    self.0.complete()
  }

  fn complete(mut self) {
    self.0.next(Notification::Completed);
    self.0.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Turns [`Notification`] values back into the events they describe.
///
/// The source itself must not fail, its errors travel as values. An `Error`
/// or `Completed` value ends the stream and unsubscribes the source.
#[derive(Clone)]
pub struct DematerializeOp<S> {
  pub(crate) source: S,
}

impl<S, Item, Err> Observable for DematerializeOp<S>
where
  S: Observable<Item = Notification<Item, Err>, Err = Infallible>,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    self
      .source
      .actual_subscribe(Subscriber::new(DematerializeObserver(Some(subscriber)), subscription))
  }
}

pub struct DematerializeObserver<O>(Option<Subscriber<O>>);

impl<Item, Err, O> Observer<Notification<Item, Err>, Infallible> for DematerializeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Notification<Item, Err>) {
    match value {
      Notification::Next(v) => self.0.next(v),
      Notification::Error(err) => self.0.take().error(err),
      Notification::Completed => self.0.take().complete(),
    }
  }

  fn error(self, err: Infallible) { match err {} }
  #[inline]
  fn complete(self) { self.0.complete() }
  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::{Arc, Mutex};

  use crate::{prelude::*, testing::*};

  #[test]
  fn materialize_completed_stream() {
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    observable::from_iter(1..=2)
      .materialize()
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    assert_eq!(
      *values.lock().unwrap(),
      vec![Notification::Next(1), Notification::Next(2), Notification::Completed]
    );
  }

  #[test]
  fn materialize_turns_error_into_value() {
    let sc = TestScheduler::new();
    let xs = sc.create_hot_observable(vec![
      on_next(210, 1),
      on_error(220, RuntimeError::new("materialized")),
      on_next(230, 2),
    ]);
    let c_xs = xs.clone();
    let res = sc.start(move || c_xs.materialize());

    assert_eq!(
      res.messages(),
      vec![
        on_next(210, Notification::Next(1)),
        on_next(220, Notification::Error(RuntimeError::new("materialized"))),
        on_completed(220),
      ]
    );
    assert_eq!(xs.subscriptions(), vec![subscribed(200, 220)]);
  }

  #[test]
  fn dematerialize_restores_events() {
    let values = Arc::new(Mutex::new(vec![]));
    let err = Arc::new(Mutex::new(None));
    let (c_values, c_err) = (values.clone(), err.clone());
    observable::from_iter(vec![
      Notification::Next(1),
      Notification::Next(2),
      Notification::Error("stop"),
      Notification::Next(3),
    ])
    .dematerialize()
    .subscribe_err(
      move |v| c_values.lock().unwrap().push(v),
      move |e| *c_err.lock().unwrap() = Some(e),
    );

    assert_eq!(*values.lock().unwrap(), vec![1, 2]);
    assert_eq!(*err.lock().unwrap(), Some("stop"));
  }

  #[test]
  fn round_trip_keeps_events() {
    let values = Arc::new(Mutex::new(vec![]));
    let err = Arc::new(Mutex::new(None));
    let (c_values, c_err) = (values.clone(), err.clone());
    let mut subject = Subject::<i32, RuntimeError>::default();
    subject
      .clone()
      .materialize()
      .dematerialize()
      .subscribe_err(
        move |v| c_values.lock().unwrap().push(v),
        move |e| *c_err.lock().unwrap() = Some(e),
      );

    subject.next(7);
    subject.error(RuntimeError::new("boom"));
    assert_eq!(*values.lock().unwrap(), vec![7]);
    assert_eq!(*err.lock().unwrap(), Some(RuntimeError::new("boom")));
  }
}
