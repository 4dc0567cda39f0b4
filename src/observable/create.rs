use std::marker::PhantomData;

use crate::prelude::*;

/// The subscriber handed to a [`create`] closure.
pub type BoxedSubscriber<Item, Err> = Subscriber<BoxedObserver<Item, Err>>;

/// Creates an observable from a function that drives the subscriber.
///
/// The closure runs once per subscription. It may emit synchronously, hand
/// the subscriber to another thread, or register cleanup with
/// `subscriber.subscription().add_teardown(..)`; emissions after the
/// subscription closed are dropped.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::create(|mut subscriber: BoxedSubscriber<i32, ()>| {
///   subscriber.next(1);
///   subscriber.next(2);
///   subscriber.complete();
/// })
/// .subscribe_err(|v| println!("{v}"), |_| {});
/// ```
pub fn create<F, Item, Err>(subscribe: F) -> ObservableFn<F, Item, Err>
where
  F: FnOnce(BoxedSubscriber<Item, Err>),
{
  ObservableFn(subscribe, PhantomData)
}

pub struct ObservableFn<F, Item, Err>(F, PhantomData<fn() -> (Item, Err)>);

impl<F: Clone, Item, Err> Clone for ObservableFn<F, Item, Err> {
  fn clone(&self) -> Self { ObservableFn(self.0.clone(), PhantomData) }
}

impl<F, Item, Err> Observable for ObservableFn<F, Item, Err>
where
  F: FnOnce(BoxedSubscriber<Item, Err>),
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let Subscriber { observer, subscription } = subscriber;
    let boxed: BoxedObserver<Item, Err> = Box::new(observer);
    (self.0)(Subscriber::new(boxed, subscription))
  }
}
