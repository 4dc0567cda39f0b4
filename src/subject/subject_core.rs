use std::{
  cell::RefCell,
  collections::VecDeque,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
  },
};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};

use crate::prelude::*;

/// How a terminated stream is remembered for late subscribers.
#[derive(Clone)]
pub(crate) enum Terminal<Err> {
  Errored(Err),
  Completed,
}

impl<Err> Terminal<Err> {
  pub(crate) fn deliver<Item, O: Observer<Item, Err>>(self, observer: O) {
    match self {
      Terminal::Errored(err) => observer.error(err),
      Terminal::Completed => observer.complete(),
    }
  }
}

/// What a subject keeps of the values it has seen.
pub(crate) enum Retention<Item> {
  /// Values are only delivered to the observers attached right now.
  Nothing,
  /// Values are held back, the last one is delivered on completion.
  Last(Option<Item>),
  /// The most recent `capacity` values (all when `None`) are replayed to
  /// late subscribers.
  Window { capacity: Option<usize>, values: VecDeque<Item> },
}

struct State<Item, Err> {
  observers: Vec<(usize, BoxedObserver<Item, Err>)>,
  next_id: usize,
  terminal: Option<Terminal<Err>>,
  retention: Retention<Item>,
  // `observers` is moved out while a delivery runs, these hold what changed
  // in the meantime.
  emitting: bool,
  in_flight: Vec<usize>,
  pending_add: Vec<(usize, BoxedObserver<Item, Err>)>,
}

struct Shared<Item, Err> {
  state: ReentrantMutex<RefCell<State<Item, Err>>>,
  /// Ids of unsubscribed observers not pruned from `state` yet. Guarded by
  /// its own lock so unsubscribing never waits for a delivery in progress.
  removed: Mutex<Vec<usize>>,
  terminated: AtomicBool,
}

/// The observer list and terminal state shared by every clone of a subject.
///
/// The lock is re-entrant so an observer may subscribe to the subject that is
/// calling it; the new observer is parked until the delivery returns.
/// Unsubscribing only records the id, the entry is pruned by whoever holds
/// the delivery lock next. Emitting into the subject from one of its own
/// callbacks panics.
pub(crate) struct SubjectCore<Item, Err> {
  inner: Arc<Shared<Item, Err>>,
}

impl<Item, Err> Clone for SubjectCore<Item, Err> {
  fn clone(&self) -> Self { SubjectCore { inner: self.inner.clone() } }
}

type Guard<'a, Item, Err> = ReentrantMutexGuard<'a, RefCell<State<Item, Err>>>;
type Entries<Item, Err> = Vec<(usize, BoxedObserver<Item, Err>)>;

impl<Item, Err> SubjectCore<Item, Err> {
  pub(crate) fn new(retention: Retention<Item>) -> Self {
    let state = State {
      observers: vec![],
      next_id: 0,
      terminal: None,
      retention,
      emitting: false,
      in_flight: vec![],
      pending_add: vec![],
    };
    SubjectCore {
      inner: Arc::new(Shared {
        state: ReentrantMutex::new(RefCell::new(state)),
        removed: Mutex::new(vec![]),
        terminated: AtomicBool::new(false),
      }),
    }
  }

  pub(crate) fn observer_count(&self) -> usize {
    let guard = self.inner.state.lock();
    let pruned = self.prune(&guard);
    let count = {
      let state = guard.borrow();
      if state.emitting {
        let removed = self.inner.removed.lock();
        let live = state.in_flight.iter().filter(|id| !removed.contains(*id)).count();
        live + state.pending_add.len()
      } else {
        state.observers.len()
      }
    };
    drop(guard);
    drop(pruned);
    count
  }

  pub(crate) fn is_terminated(&self) -> bool { self.inner.terminated.load(Ordering::Acquire) }

  fn remove(&self, id: usize) {
    self.inner.removed.lock().push(id);
    // Whoever holds the delivery lock prunes when it is done.
    if let Some(guard) = self.inner.state.try_lock() {
      let pruned = self.prune(&guard);
      drop(guard);
      drop(pruned);
    }
  }

  /// Drops every recorded removal from the observer list. Does nothing
  /// while a delivery runs, the delivery prunes when it finishes. Returns
  /// the pruned entries so they are dropped after the lock is released.
  fn prune(&self, guard: &Guard<'_, Item, Err>) -> Entries<Item, Err> {
    let mut state = guard.borrow_mut();
    if state.emitting {
      return vec![];
    }
    let removed = std::mem::take(&mut *self.inner.removed.lock());
    if removed.is_empty() {
      return vec![];
    }
    let (gone, kept) = std::mem::take(&mut state.observers)
      .into_iter()
      .partition(|(id, _)| removed.contains(id));
    state.observers = kept;
    gone
  }

  fn begin_emit(guard: &Guard<'_, Item, Err>) -> Entries<Item, Err> {
    let mut state = guard.borrow_mut();
    assert!(!state.emitting, "re-entrant emission into a subject from one of its own observers");
    state.emitting = true;
    let observers = std::mem::take(&mut state.observers);
    state.in_flight = observers.iter().map(|(id, _)| *id).collect();
    observers
  }

  fn is_removed(&self, id: usize) -> bool { self.inner.removed.lock().contains(&id) }
}

impl<Item, Err> SubjectCore<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub(crate) fn next(&self, value: Item) {
    let guard = self.inner.state.lock();
    {
      let mut state = guard.borrow_mut();
      if state.terminal.is_some() {
        return;
      }
      match &mut state.retention {
        Retention::Nothing => {}
        Retention::Last(last) => {
          *last = Some(value);
          return;
        }
        Retention::Window { capacity, values } => {
          values.push_back(value.clone());
          if let Some(capacity) = *capacity {
            while values.len() > capacity {
              values.pop_front();
            }
          }
        }
      }
    }

    let mut observers = Self::begin_emit(&guard);
    for (id, observer) in observers.iter_mut() {
      if !self.is_removed(*id) {
        observer.next(value.clone());
      }
    }

    let mut pruned = {
      let mut state = guard.borrow_mut();
      state.emitting = false;
      state.in_flight.clear();
      let (closed, mut open): (Entries<Item, Err>, Entries<Item, Err>) =
        observers.into_iter().partition(|(_, o)| o.is_closed());
      open.append(&mut state.pending_add);
      state.observers = open;
      closed
    };
    pruned.extend(self.prune(&guard));
    drop(guard);
    drop(pruned);
  }

  pub(crate) fn terminate(&self, terminal: Terminal<Err>) {
    let guard = self.inner.state.lock();
    let last = {
      let mut state = guard.borrow_mut();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(terminal.clone());
      self.inner.terminated.store(true, Ordering::Release);
      match (&state.retention, &terminal) {
        (Retention::Last(Some(v)), Terminal::Completed) => Some(v.clone()),
        _ => None,
      }
    };
    tracing::trace!(completed = matches!(terminal, Terminal::Completed), "subject terminated");

    let observers = Self::begin_emit(&guard);
    for (id, mut observer) in observers {
      if self.is_removed(id) {
        continue;
      }
      if let Some(v) = &last {
        observer.next(v.clone());
      }
      terminal.clone().deliver::<Item, _>(observer);
    }

    let mut state = guard.borrow_mut();
    state.emitting = false;
    state.in_flight.clear();
    self.inner.removed.lock().clear();
  }

  /// Attaches `subscriber`, first replaying what the retention policy kept
  /// and the terminal event if there is one.
  pub(crate) fn subscribe<O>(&self, mut subscriber: Subscriber<O>)
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let guard = self.inner.state.lock();
    let pruned = self.prune(&guard);
    let (replay, terminal) = {
      let state = guard.borrow();
      let replay: Vec<Item> = match &state.retention {
        Retention::Nothing => vec![],
        Retention::Last(last) => match state.terminal {
          Some(Terminal::Completed) => last.iter().cloned().collect(),
          _ => vec![],
        },
        Retention::Window { values, .. } => values.iter().cloned().collect(),
      };
      (replay, state.terminal.clone())
    };

    for v in replay {
      subscriber.next(v);
    }
    if let Some(terminal) = terminal {
      terminal.deliver::<Item, _>(subscriber);
      return;
    }
    if subscriber.is_closed() {
      return;
    }

    let subscription = subscriber.subscription.clone();
    let id = {
      let mut state = guard.borrow_mut();
      let id = state.next_id;
      state.next_id += 1;
      let entry: (usize, BoxedObserver<Item, Err>) = (id, Box::new(subscriber));
      if state.emitting {
        state.pending_add.push(entry);
      } else {
        state.observers.push(entry);
      }
      id
    };
    drop(guard);
    drop(pruned);

    let core: Weak<_> = Arc::downgrade(&self.inner);
    subscription.add_teardown(move || {
      if let Some(inner) = core.upgrade() {
        SubjectCore { inner }.remove(id);
      }
    });
  }
}
