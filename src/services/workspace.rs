use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{ApiClient, HttpApiClient};
use crate::config::ClientConfig;
use crate::db::SessionStore;
use crate::error::AppError;
use crate::models::{
    AiAction, AiResult, Event, LoginRequest, NewNoteRequest, Note, NoteQuery, NoteSummary,
    RegisterRequest, Stats, Task, User,
};
use crate::notify::{Notification, Notifier};
use crate::services::{AuthService, NoteSync, ScheduleSync, TaskSync};
use crate::session::SessionContext;

/// One method per user interaction: run the sync operation, then tell the
/// user how it went. The sync services themselves never notify.
pub struct Workspace {
    pub notes: NoteSync,
    pub tasks: TaskSync,
    pub schedule: ScheduleSync,
    pub auth: AuthService,
    notifier: Box<dyn Notifier>,
}

impl Workspace {
    pub fn new(
        api: Arc<dyn ApiClient>,
        session: SessionContext,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            notes: NoteSync::new(api.clone()),
            tasks: TaskSync::new(api.clone()),
            schedule: ScheduleSync::new(api.clone()),
            auth: AuthService::new(api, session),
            notifier,
        }
    }

    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.auth = self.auth.with_store(store);
        self
    }

    /// Startup: open the session store, restore any saved session and wire
    /// the HTTP client to the shared session context.
    pub async fn connect(config: &ClientConfig, notifier: Box<dyn Notifier>) -> Result<Self, AppError> {
        let session = SessionContext::new();
        let store = SessionStore::connect(&config.session_db_url).await?;
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(config, session.clone())?);
        let workspace = Self::new(api, session, notifier).with_session_store(store);
        if let Some(user) = workspace.auth.restore().await? {
            info!("welcome back, {}", user.name);
        }
        Ok(workspace)
    }

    fn report<T>(&self, result: &Result<T, AppError>, success: impl FnOnce(&T) -> String) {
        match result {
            Ok(value) => self.notifier.notify(Notification::success(success(value))),
            Err(e) => self.report_error(e),
        }
    }

    /// Reads stay quiet unless they fail.
    fn report_failure<T>(&self, result: &Result<T, AppError>) {
        if let Err(e) = result {
            self.report_error(e);
        }
    }

    fn report_error(&self, e: &AppError) {
        if e.is_local() {
            debug!("rejected before sending: {}", e);
        } else {
            warn!("request failed: {}", e);
        }
        self.notifier.notify(Notification::error(e.user_message()));
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        let result = self.auth.register(req).await;
        self.report(&result, |user| format!("Welcome, {}!", user.name));
        result
    }

    pub async fn login(&self, req: LoginRequest) -> Result<User, AppError> {
        let result = self.auth.login(req).await;
        self.report(&result, |user| format!("Welcome back, {}!", user.name));
        result
    }

    /// Drops the session and every cached collection that belonged to it.
    /// If the session cannot be forgotten, everything stays as it was.
    pub async fn logout(&self) -> Result<(), AppError> {
        let result = self.auth.logout().await;
        if result.is_ok() {
            self.notes.clear();
            self.tasks.clear();
            self.schedule.clear();
        }
        self.report(&result, |_| "Logged out".to_string());
        result
    }

    /// Loads notes, tasks and events side by side; the first failure wins.
    pub async fn refresh_all(&self) -> Result<(), AppError> {
        let result = tokio::try_join!(
            self.notes.refresh(),
            self.tasks.fetch(),
            self.schedule.fetch()
        )
        .map(|_| ());
        self.report_failure(&result);
        result
    }

    pub async fn fetch_notes(&self, query: NoteQuery) -> Result<usize, AppError> {
        let result = self.notes.fetch(query).await;
        self.report_failure(&result);
        result
    }

    pub async fn open_note(&self, id: &str) -> Result<Note, AppError> {
        let result = self.notes.get(id).await;
        self.report_failure(&result);
        result
    }

    pub async fn create_note(&self, req: NewNoteRequest) -> Result<Note, AppError> {
        let result = self.notes.create(req).await;
        self.report(&result, |_| "Note created successfully!".to_string());
        result
    }

    pub async fn edit_note(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<Note, AppError> {
        let result = self.notes.edit(id, title, content, tags).await;
        self.report(&result, |_| "Note updated successfully!".to_string());
        result
    }

    pub async fn toggle_favorite(&self, id: &str) -> Result<Note, AppError> {
        let result = self.notes.toggle_favorite(id).await;
        self.report(&result, |note| {
            if note.is_favorite {
                "Added to favorites".to_string()
            } else {
                "Removed from favorites".to_string()
            }
        });
        result
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), AppError> {
        let result = self.notes.delete(id).await;
        self.report(&result, |_| "Note deleted".to_string());
        result
    }

    pub async fn summarize_draft(&self, title: &str, content: &str) -> Result<NoteSummary, AppError> {
        let result = self.notes.summarize(title, content).await;
        self.report_failure(&result);
        result
    }

    pub async fn ai_process(&self, id: &str, action: AiAction) -> Result<AiResult, AppError> {
        let result = self.notes.ai_process(id, action).await;
        self.report(&result, |_| match action {
            AiAction::Summarize => "Summary generated".to_string(),
            AiAction::SuggestTags => "Tag suggestions ready".to_string(),
            AiAction::Insights => "Insights generated".to_string(),
        });
        result
    }

    pub async fn load_tags(&self) -> Result<Vec<String>, AppError> {
        let result = self.notes.load_tags().await;
        self.report_failure(&result);
        result
    }

    pub async fn stats(&self) -> Result<Stats, AppError> {
        let result = self.notes.stats().await;
        self.report_failure(&result);
        result
    }

    pub async fn fetch_tasks(&self) -> Result<usize, AppError> {
        let result = self.tasks.fetch().await;
        self.report_failure(&result);
        result
    }

    pub async fn extract_tasks(&self, conversation_text: &str) -> Result<Vec<Task>, AppError> {
        let result = self.tasks.extract(conversation_text).await;
        self.report(&result, |tasks| format!("Extracted {} tasks!", tasks.len()));
        result
    }

    pub async fn complete_task(&self, id: &str) -> Result<bool, AppError> {
        let result = self.tasks.complete(id).await;
        self.report(&result, |sent| {
            if *sent {
                "Task completed!".to_string()
            } else {
                "Task already completed".to_string()
            }
        });
        result
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let result = self.tasks.delete(id).await;
        self.report(&result, |_| "Task deleted".to_string());
        result
    }

    pub async fn fetch_events(&self) -> Result<usize, AppError> {
        let result = self.schedule.fetch().await;
        self.report_failure(&result);
        result
    }

    pub async fn schedule_event(&self, natural_language: &str) -> Result<Event, AppError> {
        let result = self.schedule.parse(natural_language).await;
        self.report(&result, |event| format!("Event \"{}\" scheduled!", event.title));
        result
    }
}
