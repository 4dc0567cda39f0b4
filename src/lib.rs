//! # rxcore: a reactive-streams engine
//!
//! Composable observable sequences, pluggable schedulers and virtual-time
//! marble testing.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazy description of a sequence, plus the operator surface in [`ObservableExt`] |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subject`] | Observer and multicast observable at once |
//! | [`Scheduler`] | Decides when and on which thread work runs |
//! | [`SharedSubscription`] | Handle to cancel an active subscription |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] on top of
//!   `futures::executor::ThreadPool`
//! - **`tokio-scheduler`**: a scheduler driving a tokio runtime handle
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler
//! [`SharedSubscription`]: subscription::SharedSubscription
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod serial_observer;
pub mod subject;
pub mod subscriber;
pub mod subscription;
pub mod testing;

pub use prelude::*;
