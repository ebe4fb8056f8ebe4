#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Notify;
use smart_notes::api::ApiClient;
use smart_notes::api::dto::{AiProcessResponse, AuthResponse, HealthResponse};
use smart_notes::config::ClientConfig;
use smart_notes::error::AppError;
use smart_notes::models::{
    AiProcessRequest, Event, ExtractTasksRequest, LoginRequest, NewNoteRequest, Note, NoteQuery,
    NoteSummary, Priority, RegisterRequest, ScheduleRequest, Stats, SummarizeRequest, Task,
    UpdateNoteRequest, User,
};
use smart_notes::stub::{StubState, router};

/// Serves the stub API on an ephemeral port and returns its base URL.
pub async fn spawn_stub() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, router(StubState::default()))
            .await
            .expect("stub server stopped");
    });
    format!("http://{}/api", addr)
}

pub fn client_config(api_url: &str) -> ClientConfig {
    ClientConfig::new(api_url, "sqlite::memory:").expect("Failed to build client config")
}

pub fn note(id: &str, title: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("content of {}", title),
        summary: None,
        tags: vec!["seed".to_string()],
        is_favorite: false,
        updated_at: None,
    }
}

pub fn task(id: &str, title: &str) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        priority: Priority::Medium,
        deadline: None,
        completed: false,
    }
}

#[derive(Default)]
pub struct FakeState {
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub failing: bool,
    pub failing_calls: Vec<&'static str>,
    pub calls: Vec<&'static str>,
    pub ai_result: Option<serde_json::Value>,
    next_id: usize,
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

/// Scripted server: records every call and can be switched to fail them all.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
    extraction_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes(notes: Vec<Note>) -> Self {
        let api = Self::new();
        api.state().notes = notes;
        api
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        api.state().tasks = tasks;
        api
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state poisoned")
    }

    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Fails only the named call, leaving the others working.
    pub fn fail_call(&self, call: &'static str) {
        self.state().failing_calls.push(call);
    }

    /// Parks `extract_tasks` until the returned handle is notified.
    pub fn hold_extraction(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.extraction_gate.lock().expect("gate poisoned") = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| **c == name).count()
    }

    fn record(&self, call: &'static str) -> Result<MutexGuard<'_, FakeState>, AppError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.failing || state.failing_calls.contains(&call) {
            return Err(AppError::Api {
                status: 500,
                detail: Some("Server exploded".to_string()),
            });
        }
        Ok(state)
    }
}

fn not_found(what: &str) -> AppError {
    AppError::Api {
        status: 404,
        detail: Some(format!("{} not found", what)),
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn health(&self) -> Result<HealthResponse, AppError> {
        self.record("health")?;
        Ok(HealthResponse {
            status: "healthy".to_string(),
            message: None,
        })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.record("register")?;
        Ok(AuthResponse {
            user: User {
                id: "user-1".to_string(),
                email: req.email.clone(),
                name: req.name.clone(),
            },
            token: "token-1".to_string(),
            message: None,
        })
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AppError> {
        self.record("login")?;
        Ok(AuthResponse {
            user: User {
                id: "user-1".to_string(),
                email: req.email.clone(),
                name: "Fake".to_string(),
            },
            token: "token-1".to_string(),
            message: None,
        })
    }

    async fn list_notes(&self, query: &NoteQuery) -> Result<Vec<Note>, AppError> {
        let state = self.record("list_notes")?;
        Ok(state
            .notes
            .iter()
            .filter(|n| !query.favorites_only || n.is_favorite)
            .cloned()
            .collect())
    }

    async fn get_note(&self, id: &str) -> Result<Note, AppError> {
        let state = self.record("get_note")?;
        state.notes.iter().find(|n| n.id == id).cloned().ok_or_else(|| not_found("Note"))
    }

    async fn create_note(&self, req: &NewNoteRequest) -> Result<Note, AppError> {
        let mut state = self.record("create_note")?;
        let note = Note {
            id: state.next_id("note"),
            title: req.title.clone(),
            content: req.content.clone(),
            summary: Some("server summary".to_string()),
            tags: req.tags.clone().unwrap_or_default(),
            is_favorite: false,
            updated_at: None,
        };
        state.notes.insert(0, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &str, req: &UpdateNoteRequest) -> Result<Note, AppError> {
        let mut state = self.record("update_note")?;
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found("Note"))?;
        if let Some(title) = &req.title {
            note.title = title.clone();
        }
        if let Some(content) = &req.content {
            note.content = content.clone();
        }
        if let Some(tags) = &req.tags {
            note.tags = tags.clone();
        }
        if let Some(is_favorite) = req.is_favorite {
            note.is_favorite = is_favorite;
        }
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.record("delete_note")?;
        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        if state.notes.len() == before {
            return Err(not_found("Note"));
        }
        Ok(())
    }

    async fn summarize(&self, req: &SummarizeRequest) -> Result<NoteSummary, AppError> {
        self.record("summarize")?;
        Ok(NoteSummary {
            summary: format!("summary of {}", req.title),
            keywords: vec!["fake".to_string()],
        })
    }

    async fn process_ai(&self, req: &AiProcessRequest) -> Result<AiProcessResponse, AppError> {
        let state = self.record("process_ai")?;
        let result = state
            .ai_result
            .clone()
            .unwrap_or_else(|| serde_json::Value::String("fresh summary".to_string()));
        Ok(AiProcessResponse {
            action: Some(req.action),
            result,
        })
    }

    async fn list_tags(&self) -> Result<Vec<String>, AppError> {
        let state = self.record("list_tags")?;
        let mut tags: Vec<String> = state.notes.iter().flat_map(|n| n.tags.clone()).collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn stats(&self) -> Result<Stats, AppError> {
        let state = self.record("stats")?;
        Ok(Stats {
            total_notes: state.notes.len() as u64,
            favorite_notes: state.notes.iter().filter(|n| n.is_favorite).count() as u64,
            recent_notes: state.notes.len() as u64,
        })
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let state = self.record("list_tasks")?;
        Ok(state.tasks.clone())
    }

    async fn extract_tasks(&self, req: &ExtractTasksRequest) -> Result<Vec<Task>, AppError> {
        let gate = self.extraction_gate.lock().expect("gate poisoned").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut state = self.record("extract_tasks")?;
        let titles: Vec<String> = req
            .conversation_text
            .split('.')
            .map(str::trim)
            .filter(|s| s.to_lowercase().contains("need to"))
            .map(str::to_string)
            .collect();
        let mut created = Vec::new();
        for title in titles {
            let id = state.next_id("task");
            created.push(task(&id, &title));
        }
        state.tasks.extend(created.iter().cloned());
        Ok(created)
    }

    async fn complete_task(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.record("complete_task")?;
        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Task"))?;
        task.completed = true;
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.record("delete_task")?;
        let before = state.tasks.len();
        state.tasks.retain(|t| t.id != id);
        if state.tasks.len() == before {
            return Err(not_found("Task"));
        }
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let state = self.record("list_events")?;
        Ok(state.events.clone())
    }

    async fn parse_schedule(&self, req: &ScheduleRequest) -> Result<Event, AppError> {
        let mut state = self.record("parse_schedule")?;
        let event = Event {
            id: state.next_id("event"),
            title: req.natural_language.clone(),
            description: None,
            date: "2025-03-11".to_string(),
            time: "15:00".to_string(),
        };
        state.events.push(event.clone());
        Ok(event)
    }
}
