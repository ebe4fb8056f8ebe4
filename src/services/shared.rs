use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Local state shared between concurrently running operations.
///
/// Guards are taken once a response is in hand and dropped before the next
/// await, so a slow request never blocks another interaction. Whichever
/// response resolves last writes last.
#[derive(Debug, Default)]
pub(crate) struct Shared<T> {
    inner: RwLock<T>,
}

impl<T> Shared<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, T> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, T> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
