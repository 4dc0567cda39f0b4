//! Integration tests for rxcore
//!
//! Tests operator chains, multicasting, and threading behavior through the
//! public API only.

use std::{
  convert::Infallible,
  sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc, Arc, Mutex,
  },
  thread,
  time::Duration,
};

use rxcore::{prelude::*, testing::*};

fn collector<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T) + Send + 'static) {
  let values = Arc::new(Mutex::new(vec![]));
  let c_values = values.clone();
  (values, move |v| c_values.lock().unwrap().push(v))
}

#[test]
fn test_basic_chain_integration() {
  let (result, push) = collector();

  observable::from_iter(1..=10)
    .map(|x| x * 2)
    .filter(|&x| x > 10)
    .take(3)
    .subscribe(push);

  assert_eq!(*result.lock().unwrap(), vec![12, 14, 16]);
}

#[test]
fn test_complex_chain_with_multiple_operators() {
  let (result, push) = collector();

  observable::from_iter(1..=20)
    .filter(|&x| x % 2 == 0)
    .map(|x| x * x)
    .scan_initial(0, |acc, v| acc + v)
    .filter(|&x| x > 50)
    .take(2)
    .subscribe(push);

  // Even squares: 4, 16, 36, 64, 100, ..
  // Running sum: 4, 20, 56, 120, ..
  assert_eq!(*result.lock().unwrap(), vec![56, 120]);
}

#[test]
fn test_subject_broadcasting() {
  let mut subject = Subject::<i32, Infallible>::default();
  let (mapped, push_mapped) = collector();
  let (direct, push_direct) = collector();

  subject.clone().map(|x| x * 10).filter(|&x| x > 50).subscribe(push_mapped);
  subject.clone().subscribe(push_direct);

  (1..=8).for_each(|v| subject.next(v));
  subject.complete();

  assert_eq!(*mapped.lock().unwrap(), vec![60, 70, 80]);
  assert_eq!(*direct.lock().unwrap(), (1..=8).collect::<Vec<_>>());
}

#[test]
fn test_flat_map_over_range() {
  let (result, push) = collector();
  observable::range(1, 3)
    .flat_map(|v| observable::from_iter(0..v))
    .subscribe(push);

  assert_eq!(*result.lock().unwrap(), vec![0, 0, 1, 0, 1, 2]);
}

#[test]
fn test_merge_concat_zip_together() {
  let (result, push) = collector();
  let evens = observable::from_iter(vec![0, 2, 4]);
  let odds = observable::from_iter(vec![1, 3, 5]);

  evens
    .clone()
    .concat(odds.clone())
    .zip(odds.merge(evens))
    .map(|(a, b)| a + b)
    .subscribe(push);

  // concat: 0 2 4 1 3 5, merge of synchronous sources: 1 3 5 0 2 4
  assert_eq!(*result.lock().unwrap(), vec![1, 5, 9, 1, 5, 9]);
}

#[test]
fn test_combine_latest_with_subjects() {
  let mut temperature = Subject::<i32, ()>::default();
  let mut unit = Subject::<&'static str, ()>::default();
  let (readings, push) = collector();

  temperature
    .clone()
    .combine_latest(unit.clone(), |t, u| format!("{t}{u}"))
    .subscribe_err(push, |_| {});

  temperature.next(20);
  unit.next("C");
  temperature.next(21);
  unit.next("F");

  assert_eq!(*readings.lock().unwrap(), vec!["20C", "21C", "21F"]);
}

#[test]
fn test_publish_ref_count_shares_one_execution() {
  let executions = Arc::new(AtomicUsize::new(0));
  let c_executions = executions.clone();
  let source = observable::create(move |mut subscriber: BoxedSubscriber<i32, ()>| {
    c_executions.fetch_add(1, Ordering::SeqCst);
    subscriber.next(1);
  });
  let shared = source.publish().ref_count();

  let (first, push_first) = collector();
  let (second, push_second) = collector();
  let mut s1 = shared.fork().subscribe_err(push_first, |_| {});
  let mut s2 = shared.fork().subscribe_err(push_second, |_| {});

  assert_eq!(executions.load(Ordering::SeqCst), 1);
  assert_eq!(*first.lock().unwrap(), vec![1]);
  assert!(second.lock().unwrap().is_empty());

  s1.unsubscribe();
  s2.unsubscribe();
  let _s3 = shared.fork().subscribe_err(|_| {}, |_| {});
  assert_eq!(executions.load(Ordering::SeqCst), 2);
}

#[test]
fn test_replay_and_publish_last() {
  let replayed = observable::from_iter(0..6).replay(Some(3));
  replayed.connect();
  let (late, push) = collector();
  replayed.fork().subscribe(push);
  assert_eq!(*late.lock().unwrap(), vec![3, 4, 5]);

  let last = observable::from_iter(0..6).publish_last();
  let (early, push) = collector();
  last.fork().subscribe(push);
  last.connect();
  assert_eq!(*early.lock().unwrap(), vec![5]);
}

#[test]
fn test_materialize_round_trip() {
  let (notifications, push) = collector();
  observable::throw_err::<i32, _>(RuntimeError::new("failed"))
    .materialize()
    .subscribe(push);
  assert_eq!(
    *notifications.lock().unwrap(),
    vec![Notification::Error(RuntimeError::new("failed"))]
  );

  let (values, push) = collector();
  observable::from_iter(vec![Notification::<_, Infallible>::Next(1), Notification::Completed])
    .dematerialize()
    .subscribe(push);
  assert_eq!(*values.lock().unwrap(), vec![1]);
}

#[test]
fn test_subscribe_on_and_observe_on_threads() {
  let subscribe_loop = EventLoopBuilder::new().name("subscribe-side").build().unwrap();
  let observe_loop = EventLoopBuilder::new().name("observe-side").build().unwrap();
  let (tx, rx) = mpsc::channel();
  let main = thread::current().id();

  observable::from_iter(0..5)
    .map(|v| (v, thread::current().name().map(str::to_owned)))
    .subscribe_on(subscribe_loop)
    .observe_on(observe_loop)
    .subscribe_all(
      move |(v, produced_on)| {
        tx.send((v, produced_on, thread::current().name().map(str::to_owned)))
          .unwrap();
      },
      |_| {},
      || {},
    );

  let received: Vec<_> = rx.iter().collect();
  assert_eq!(received.len(), 5);
  for (idx, (v, produced_on, observed_on)) in received.into_iter().enumerate() {
    assert_eq!(v, idx as i32);
    assert_eq!(produced_on.as_deref(), Some("subscribe-side"));
    assert_eq!(observed_on.as_deref(), Some("observe-side"));
  }
  assert_eq!(thread::current().id(), main);
}

#[test]
fn test_interval_on_event_loop_is_bounded_by_take() {
  let event_loop = EventLoopScheduler::spawn().unwrap();
  let (tx, rx) = mpsc::channel();
  observable::interval(Duration::from_millis(2), event_loop)
    .take(3)
    .subscribe_all(move |v| tx.send(v).unwrap(), |_| {}, || {});

  assert_eq!(rx.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_virtual_time_marbles() {
  let sc = TestScheduler::new();
  let xs = sc.create_hot_observable(vec![
    on_next(150, 1),
    on_next(210, 2),
    on_next(240, 3),
    on_next(300, 4),
    on_completed::<i32, RuntimeError>(400),
  ]);
  let ys = sc.create_cold_observable(vec![on_next(15, 10), on_completed(30)]);

  let (c_xs, c_ys) = (xs.clone(), ys.clone());
  let res = sc.start(move || {
    c_xs
      .filter(|v| v % 2 == 0)
      .flat_map(move |v| c_ys.clone().map(move |w| v * w))
  });

  assert_eq!(res.messages(), vec![on_next(225, 20), on_next(315, 40), on_completed(400)]);
  assert_eq!(xs.subscriptions(), vec![subscribed(200, 400)]);
  assert_eq!(ys.subscriptions(), vec![subscribed(210, 240), subscribed(300, 330)]);
}

#[test]
fn test_dispose_from_another_thread() {
  let scheduler = EventLoopScheduler::spawn().unwrap();
  let count = Arc::new(AtomicUsize::new(0));
  let c_count = count.clone();
  let subscription = observable::interval(Duration::from_millis(1), scheduler).subscribe(move |_| {
    c_count.fetch_add(1, Ordering::SeqCst);
  });

  thread::sleep(Duration::from_millis(20));
  let mut remote = subscription.clone();
  thread::spawn(move || remote.unsubscribe()).join().unwrap();
  // a tick already past its closed check may still land
  thread::sleep(Duration::from_millis(5));
  let seen = count.load(Ordering::SeqCst);
  thread::sleep(Duration::from_millis(20));
  assert!(subscription.is_closed());
  assert_eq!(count.load(Ordering::SeqCst), seen);
}

#[cfg(feature = "futures-scheduler")]
#[test]
fn test_thread_pool_observe_on_keeps_order() {
  let pool = ThreadPoolScheduler::new().unwrap();
  let (tx, rx) = mpsc::channel();
  observable::from_iter(0..50)
    .observe_on(pool)
    .subscribe_all(move |v| tx.send(v).unwrap(), |_| {}, || {});

  assert_eq!(rx.iter().collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
}

#[cfg(feature = "tokio-scheduler")]
#[tokio::test(flavor = "multi_thread")]
async fn test_tokio_scheduler_interval() {
  let (tx, rx) = mpsc::channel();
  observable::interval(Duration::from_millis(2), TokioScheduler::current())
    .take(3)
    .subscribe_all(move |v| tx.send(v).unwrap(), |_| {}, || {});

  let received = tokio::task::spawn_blocking(move || rx.iter().collect::<Vec<_>>())
    .await
    .unwrap();
  assert_eq!(received, vec![0, 1, 2]);
}
