//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::{RuntimeError, SchedulerError},
  notification::Notification,
  observable,
  observable::{BoxedSubscriber, ConnectableObservable, Observable, ObservableExt},
  observer::{BoxedObserver, DynObserver, FnMutObserver, Observer, ObserverAll, ObserverErr},
  rc::MutArc,
  scheduler::{
    CurrentThreadScheduler, EventLoopBuilder, EventLoopScheduler, ImmediateScheduler, Scheduler,
    TaskState, TestScheduler,
  },
  serial_observer::SerialObserver,
  subject::{AsyncSubject, ReplaySubject, Subject},
  subscriber::Subscriber,
  subscription::*,
};
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
