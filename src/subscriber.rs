use crate::prelude::*;

/// An observer bound to the subscription that controls its lifetime.
///
/// Values are only forwarded while the subscription is open. A terminal event
/// is forwarded first and then the subscription is unsubscribed, which tears
/// down everything upstream that registered itself in it.
pub struct Subscriber<O> {
  pub(crate) observer: O,
  pub(crate) subscription: SharedSubscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O, subscription: SharedSubscription) -> Self {
    Subscriber { observer, subscription }
  }

  #[inline]
  pub fn subscription(&self) -> &SharedSubscription { &self.subscription }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.subscription.is_closed() {
      self.observer.next(value)
    }
  }

  fn error(self, err: Err) {
    let Subscriber { observer, mut subscription } = self;
    if !subscription.is_closed() {
      observer.error(err);
      subscription.unsubscribe();
    }
  }

  fn complete(self) {
    let Subscriber { observer, mut subscription } = self;
    if !subscription.is_closed() {
      observer.complete();
      subscription.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.subscription.is_closed() || self.observer.is_closed() }
}
