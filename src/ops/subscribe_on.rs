use crate::prelude::*;

/// Performs the subscription to the source as a task on `scheduler`.
///
/// The task handle belongs to the downstream subscription, so disposing it
/// before the task ran means the source is never subscribed.
#[derive(Clone)]
pub struct SubscribeOnOp<S, Sch> {
  pub(crate) source: S,
  pub(crate) scheduler: Sch,
}

impl<S, Sch> Observable for SubscribeOnOp<S, Sch>
where
  S: Observable + Send + 'static,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    let source = self.source;
    let handle = self
      .scheduler
      .schedule(move || source.actual_subscribe(subscriber), None);
    subscription.add(handle);
  }
}

#[cfg(test)]
mod test {
  use std::{
    sync::{mpsc, Arc, Mutex},
    thread,
    time::Duration,
  };

  use crate::prelude::*;

  #[test]
  fn event_loop() {
    let event_loop = EventLoopScheduler::spawn().unwrap();
    let (tx, rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    observable::from_iter(1..5).subscribe_on(event_loop).subscribe_all(
      move |v| tx.send((v, thread::current().id())).unwrap(),
      |_| {},
      move || done_tx.send(()).unwrap(),
    );

    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received.iter().map(|(v, _)| *v).collect::<Vec<_>>(), (1..5).collect::<Vec<_>>());
    assert!(received.iter().all(|(_, id)| *id != thread::current().id()));
  }

  #[test]
  fn unsubscribe_before_task_runs() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(vec![]));
    let c_emitted = emitted.clone();
    let source = Subject::<i32, ()>::default();
    source
      .clone()
      .subscribe_on(scheduler.clone())
      .subscribe_err(move |v| c_emitted.lock().unwrap().push(v), |_| {})
      .unsubscribe();

    scheduler.flush();
    assert_eq!(source.observer_count(), 0);
    assert!(emitted.lock().unwrap().is_empty());
  }

  #[test]
  fn subscribes_when_task_runs() {
    let scheduler = TestScheduler::new();
    let source = Subject::<i32, ()>::default();
    let _subscription = source
      .clone()
      .subscribe_on(scheduler.clone())
      .subscribe_err(|_| {}, |_| {});

    assert_eq!(source.observer_count(), 0);
    scheduler.flush();
    assert_eq!(source.observer_count(), 1);
  }
}
