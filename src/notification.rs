use crate::prelude::*;

/// A reified observer event, so sequences of events can be handled like
/// sequences of data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  /// Replays this event into `observer`. The observer is handed back while it
  /// can still receive events, i.e. after a `Next`.
  pub fn accept<O>(self, mut observer: O) -> Option<O>
  where
    O: Observer<Item, Err>,
  {
    match self {
      Notification::Next(v) => {
        observer.next(v);
        Some(observer)
      }
      Notification::Error(err) => {
        observer.error(err);
        None
      }
      Notification::Completed => {
        observer.complete();
        None
      }
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }

  pub fn map<B>(self, f: impl FnOnce(Item) -> B) -> Notification<B, Err> {
    match self {
      Notification::Next(v) => Notification::Next(f(v)),
      Notification::Error(err) => Notification::Error(err),
      Notification::Completed => Notification::Completed,
    }
  }
}
