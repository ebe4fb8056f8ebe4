use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::db::SessionStore;
use crate::error::AppError;
use crate::models::{LoginRequest, RegisterRequest, Session, User};
use crate::session::SessionContext;

/// Owns the transitions of the shared session: login and register install a
/// new one, logout removes it. Each is a whole-value swap.
pub struct AuthService {
    api: Arc<dyn ApiClient>,
    session: SessionContext,
    store: Option<SessionStore>,
}

impl AuthService {
    pub fn new(api: Arc<dyn ApiClient>, session: SessionContext) -> Self {
        Self {
            api,
            session,
            store: None,
        }
    }

    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn current_user(&self) -> Result<User, AppError> {
        self.session.user().ok_or(AppError::NotAuthenticated)
    }

    /// Loads a persisted session, if one was saved.
    pub async fn restore(&self) -> Result<Option<User>, AppError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        match store.load().await? {
            Some(session) => {
                let user = session.user.clone();
                info!("restored session for {}", user.email);
                self.session.replace(session);
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        req.validate()?;
        let response = self.api.register(&req).await?;
        self.install(response.into_session()).await
    }

    pub async fn login(&self, req: LoginRequest) -> Result<User, AppError> {
        req.validate()?;
        let response = self.api.login(&req).await?;
        self.install(response.into_session()).await
    }

    /// The persisted copy goes first: if it cannot be removed the session
    /// stays active, otherwise the next `restore` would bring it back.
    pub async fn logout(&self) -> Result<(), AppError> {
        if let Some(store) = &self.store {
            store.clear().await?;
        }
        if let Some(previous) = self.session.clear() {
            info!("logged out {}", previous.user.email);
        }
        Ok(())
    }

    async fn install(&self, session: Session) -> Result<User, AppError> {
        let user = session.user.clone();
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&session).await {
                // Still usable for this run, only not remembered.
                warn!("failed to persist session: {}", e);
            }
        }
        self.session.replace(session);
        info!("signed in as {}", user.email);
        Ok(user)
    }
}
