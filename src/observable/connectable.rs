use crate::{ops::RefCount, prelude::*};

/// A source paired with a subject. Subscribers attach to the subject and
/// see nothing until [`connect`](ConnectableObservable::connect) subscribes
/// the subject to the source, so all of them share one execution of it.
#[derive(Clone)]
pub struct ConnectableObservable<S, Sub> {
  pub(crate) source: S,
  pub(crate) subject: Sub,
}

impl<S, Sub> ConnectableObservable<S, Sub> {
  pub fn new(source: S, subject: Sub) -> Self { ConnectableObservable { source, subject } }

  /// A downstream view onto the shared subject.
  #[inline]
  pub fn fork(&self) -> Sub
  where
    Sub: Clone,
  {
    self.subject.clone()
  }

  /// Subscribes the subject to the source. Unsubscribing the returned
  /// connection stops the shared execution.
  pub fn connect(&self) -> SubscriptionWrapper<SharedSubscription>
  where
    S: Observable + Clone,
    Sub: Observer<S::Item, S::Err> + Clone + Send + 'static,
  {
    let connection = SharedSubscription::default();
    self
      .source
      .clone()
      .actual_subscribe(Subscriber::new(self.subject.clone(), connection.clone()));
    SubscriptionWrapper(connection)
  }

  /// Connects on the first subscriber and disconnects after the last one
  /// left.
  pub fn ref_count(self) -> RefCount<S, Sub> { RefCount::new(self) }
}

impl<S, Sub> Observable for ConnectableObservable<S, Sub>
where
  S: Observable,
  Sub: Observable<Item = S::Item, Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;

  #[inline]
  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<S::Item, S::Err> + Send + 'static,
  {
    self.subject.actual_subscribe(subscriber)
  }
}
