use std::{borrow::Cow, io};

use thiserror::Error;

/// Failures raised while setting up a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
  #[error("failed to spawn event loop worker `{name}`")]
  Spawn {
    name: String,
    #[source]
    source: io::Error,
  },
  #[error("failed to build thread pool")]
  ThreadPool(#[source] io::Error),
}

/// A plain message error, usable as the `Err` type of a stream.
///
/// It is `Clone + PartialEq` so it can travel through multicast operators
/// and be compared in recorded test output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("{0}")]
pub struct RuntimeError(Cow<'static, str>);

impl RuntimeError {
  pub fn new(message: impl Into<Cow<'static, str>>) -> Self { RuntimeError(message.into()) }

  pub fn message(&self) -> &str { &self.0 }
}

impl From<&'static str> for RuntimeError {
  fn from(message: &'static str) -> Self { RuntimeError::new(message) }
}

impl From<String> for RuntimeError {
  fn from(message: String) -> Self { RuntimeError::new(message) }
}

#[cfg(test)]
mod test {
  use std::error::Error as _;

  use super::*;

  #[test]
  fn runtime_error_displays_its_message() {
    let err = RuntimeError::new("error in unsubscribed stream");
    assert_eq!(err.to_string(), "error in unsubscribed stream");
    assert_eq!(err, RuntimeError::from(String::from("error in unsubscribed stream")));
  }

  #[test]
  fn spawn_error_keeps_its_source() {
    let err = SchedulerError::Spawn {
      name: "worker".into(),
      source: io::Error::new(io::ErrorKind::Other, "no threads left"),
    };
    assert_eq!(err.to_string(), "failed to spawn event loop worker `worker`");
    assert!(err.source().is_some());
  }
}
