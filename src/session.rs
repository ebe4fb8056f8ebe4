use std::sync::{Arc, RwLock};

use crate::models::{Session, User};

/// Process-wide session handle handed to the networking layer.
///
/// The session is only ever swapped as a whole value, so readers see either
/// the previous session or the new one, never a mix.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        let context = Self::new();
        context.replace(session);
        context
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn replace(&self, session: Session) {
        self.swap(Some(Arc::new(session)));
    }

    /// Returns the session that was active, if any.
    pub fn clear(&self) -> Option<Arc<Session>> {
        self.swap(None)
    }

    fn swap(&self, next: Option<Arc<Session>>) -> Option<Arc<Session>> {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
