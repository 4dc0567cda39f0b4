//! Marble testing on top of [`TestScheduler`].
//!
//! Sources are described as lists of timestamped notifications, consumers
//! record what they receive together with the virtual tick, and both sides
//! are compared as plain vectors:
//!
//! ```
//! use rxcore::{prelude::*, testing::*};
//!
//! let sc = TestScheduler::new();
//! let xs = sc.create_hot_observable(vec![
//!   on_next(150, 1),
//!   on_next(210, 2),
//!   on_next(220, 3),
//!   on_completed::<i32, RuntimeError>(230),
//! ]);
//! let c_xs = xs.clone();
//! let res = sc.start(move || c_xs.map(|v| v * 10));
//!
//! assert_eq!(res.messages(), vec![on_next(210, 20), on_next(220, 30), on_completed(230)]);
//! assert_eq!(xs.subscriptions(), vec![subscribed(200, 230)]);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::prelude::*;

/// Tick at which [`TestScheduler::start`] calls the observable factory.
pub const CREATED: u64 = 100;
/// Tick at which [`TestScheduler::start`] subscribes to the created
/// observable.
pub const SUBSCRIBED: u64 = 200;
/// Tick at which [`TestScheduler::start`] disposes the subscription.
pub const DISPOSED: u64 = 1000;

/// A value stamped with the virtual tick it was produced at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
  pub time: u64,
  pub value: T,
}

impl<T> Recorded<T> {
  pub fn new(time: u64, value: T) -> Self { Recorded { time, value } }
}

pub fn on_next<Item, Err>(time: u64, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Next(value))
}

pub fn on_error<Item, Err>(time: u64, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Error(err))
}

pub fn on_completed<Item, Err>(time: u64) -> Recorded<Notification<Item, Err>> {
  Recorded::new(time, Notification::Completed)
}

/// The ticks between which a test source had one subscriber attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionWindow {
  pub subscribe: u64,
  pub unsubscribe: u64,
}

pub fn subscribed(subscribe: u64, unsubscribe: u64) -> SubscriptionWindow {
  SubscriptionWindow { subscribe, unsubscribe }
}

/// A window that was never closed.
pub fn subscribed_forever(subscribe: u64) -> SubscriptionWindow { subscribed(subscribe, u64::MAX) }

pub type Messages<Item, Err> = Vec<Recorded<Notification<Item, Err>>>;

#[derive(Clone, Default)]
struct WindowLog(Arc<Mutex<Vec<SubscriptionWindow>>>);

impl WindowLog {
  /// Opens a window now and closes it when `subscription` is disposed.
  fn track(&self, scheduler: &TestScheduler, subscription: &SharedSubscription) {
    let index = {
      let mut windows = self.0.lock();
      windows.push(subscribed_forever(scheduler.clock()));
      windows.len() - 1
    };
    let windows = self.0.clone();
    let scheduler = scheduler.clone();
    subscription.add_teardown(move || windows.lock()[index].unsubscribe = scheduler.clock());
  }

  fn snapshot(&self) -> Vec<SubscriptionWindow> { self.0.lock().clone() }
}

// ==================== hot ====================

/// A source whose messages happen at absolute ticks whether or not anybody
/// listens. Subscribers only see what happens while they are attached.
pub struct HotObservable<Item, Err> {
  scheduler: TestScheduler,
  subject: Subject<Item, Err>,
  windows: WindowLog,
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self {
    HotObservable {
      scheduler: self.scheduler.clone(),
      subject: self.subject.clone(),
      windows: self.windows.clone(),
    }
  }
}

impl<Item, Err> HotObservable<Item, Err> {
  pub fn subscriptions(&self) -> Vec<SubscriptionWindow> { self.windows.snapshot() }
}

impl<Item, Err> Observable for HotObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    self.windows.track(&self.scheduler, &subscriber.subscription);
    self.subject.actual_subscribe(subscriber)
  }
}

// ==================== cold ====================

/// A source that plays its messages relative to the moment of each
/// subscription, independently for every subscriber.
pub struct ColdObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Arc<Messages<Item, Err>>,
  windows: WindowLog,
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    ColdObservable {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      windows: self.windows.clone(),
    }
  }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub fn subscriptions(&self) -> Vec<SubscriptionWindow> { self.windows.snapshot() }
}

impl<Item, Err> Observable for ColdObservable<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscription = subscriber.subscription.clone();
    self.windows.track(&self.scheduler, &subscription);
    let observer = MutArc::own(Some(subscriber));
    for Recorded { time, value } in self.messages.iter().cloned() {
      let observer = observer.clone();
      let handle = self.scheduler.schedule_relative(time, move || {
        value.accept(observer);
      });
      subscription.add(handle);
    }
  }
}

// ==================== recorder ====================

/// An observer that records every event with the tick it arrived at.
pub struct TestObserver<Item, Err> {
  scheduler: TestScheduler,
  messages: Arc<Mutex<Messages<Item, Err>>>,
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    TestObserver { scheduler: self.scheduler.clone(), messages: self.messages.clone() }
  }
}

impl<Item: Clone, Err: Clone> TestObserver<Item, Err> {
  pub fn messages(&self) -> Messages<Item, Err> { self.messages.lock().clone() }
}

impl<Item, Err> TestObserver<Item, Err> {
  fn record(&self, notification: Notification<Item, Err>) {
    let time = self.scheduler.clock();
    self.messages.lock().push(Recorded::new(time, notification));
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)) }

  fn error(self, err: Err) { self.record(Notification::Error(err)) }

  fn complete(self) { self.record(Notification::Completed) }

  fn is_closed(&self) -> bool { false }
}

// ==================== scheduler entry points ====================

impl TestScheduler {
  /// Schedules every message at its absolute tick.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Messages<Item, Err>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    let subject = Subject::default();
    for Recorded { time, value } in messages {
      let subject = subject.clone();
      self.schedule_absolute(time, move || {
        value.accept(subject);
      });
    }
    HotObservable { scheduler: self.clone(), subject, windows: WindowLog::default() }
  }

  /// Messages are played relative to each subscription.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Messages<Item, Err>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable {
      scheduler: self.clone(),
      messages: Arc::new(messages),
      windows: WindowLog::default(),
    }
  }

  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> {
    TestObserver { scheduler: self.clone(), messages: Arc::default() }
  }

  /// Creates the observable at [`CREATED`], subscribes at [`SUBSCRIBED`],
  /// disposes at [`DISPOSED`] and runs the scheduler to the end.
  pub fn start<F, S>(&self, create: F) -> TestObserver<S::Item, S::Err>
  where
    F: FnOnce() -> S + Send + 'static,
    S: Observable + Send + 'static,
    S::Item: Send + 'static,
    S::Err: Send + 'static,
  {
    self.start_with(create, CREATED, SUBSCRIBED, DISPOSED)
  }

  /// Like [`start`](TestScheduler::start), but disposes at `dispose_at`.
  pub fn start_until<F, S>(&self, create: F, dispose_at: u64) -> TestObserver<S::Item, S::Err>
  where
    F: FnOnce() -> S + Send + 'static,
    S: Observable + Send + 'static,
    S::Item: Send + 'static,
    S::Err: Send + 'static,
  {
    self.start_with(create, CREATED, SUBSCRIBED, dispose_at)
  }

  pub fn start_with<F, S>(
    &self, create: F, create_at: u64, subscribe_at: u64, dispose_at: u64,
  ) -> TestObserver<S::Item, S::Err>
  where
    F: FnOnce() -> S + Send + 'static,
    S: Observable + Send + 'static,
    S::Item: Send + 'static,
    S::Err: Send + 'static,
  {
    let observer = self.create_observer();
    let source: Arc<Mutex<Option<S>>> = Arc::default();
    let subscription: Arc<Mutex<Option<SubscriptionWrapper<SharedSubscription>>>> = Arc::default();

    let c_source = source.clone();
    self.schedule_absolute(create_at, move || *c_source.lock() = Some(create()));

    let c_subscription = subscription.clone();
    let c_observer = observer.clone();
    self.schedule_absolute(subscribe_at, move || {
      let created = source.lock().take();
      if let Some(source) = created {
        let handle = source.subscribe_with(c_observer);
        *c_subscription.lock() = Some(handle);
      }
    });

    self.schedule_absolute(dispose_at, move || {
      let handle = subscription.lock().take();
      if let Some(mut handle) = handle {
        handle.unsubscribe();
      }
    });

    self.flush();
    observer
  }
}
