use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Shared, lockable ownership used to hand one observer to several producers.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  #[inline]
  pub fn rc_deref_mut(&self) -> MutexGuard<'_, T> { self.0.lock() }

  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}
