//! In-memory implementation of the remote API, for local development and
//! for exercising the client end to end.

pub mod heuristics;

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Local, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::api::dto::{
    AiProcessResponse, AuthResponse, ExtractTasksResponse, HealthResponse, MessageResponse,
};
use crate::error::AppError;
use crate::models::{
    AiAction, AiProcessRequest, Event, ExtractTasksRequest, LoginRequest, NewNoteRequest, Note,
    NoteQuery, NoteSummary, RegisterRequest, ScheduleRequest, Stats, SummarizeRequest, Task,
    UpdateNoteRequest, User,
};

/// Notes longer than this get a summary when created.
pub const SUMMARY_THRESHOLD: usize = 100;

#[derive(Clone, Default)]
pub struct StubState {
    data: Arc<RwLock<StubData>>,
}

#[derive(Default)]
struct StubData {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    workspaces: HashMap<String, UserData>,
}

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct UserData {
    notes: Vec<StoredNote>,
    tasks: Vec<Task>,
    events: Vec<Event>,
}

struct StoredNote {
    note: Note,
    touched: DateTime<Utc>,
}

impl StoredNote {
    fn new(note: Note) -> Self {
        let mut stored = Self {
            note,
            touched: Utc::now(),
        };
        stored.touch();
        stored
    }

    fn touch(&mut self) {
        self.touched = Utc::now();
        self.note.updated_at = Some(self.touched.to_rfc3339());
    }
}

pub fn router(state: StubState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/summarize", post(summarize_note))
        .route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
        .route("/ai/process", post(process_ai))
        .route("/tags", get(list_tags))
        .route("/stats", get(stats))
        .route("/tasks", get(list_tasks))
        .route("/tasks/extract", post(extract_tasks))
        .route("/tasks/{id}/complete", put(complete_task))
        .route("/tasks/{id}", axum::routing::delete(delete_task))
        .route("/schedule", get(list_events))
        .route("/schedule/parse", post(parse_schedule))
        .with_state(state);

    Router::new().nest("/api", api)
}

/// Resolves the bearer token to a user id.
async fn authorize(state: &StubState, headers: &HeaderMap) -> Result<String, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let data = state.data.read().await;
    data.tokens
        .get(token)
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))
}

fn issue_token(data: &mut StubData, user: &User) -> String {
    let token = Uuid::new_v4().simple().to_string();
    data.tokens.insert(token.clone(), user.id.clone());
    token
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: Some("Smart Notes API is running".to_string()),
    })
}

async fn register(
    State(state): State<StubState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();
    let mut data = state.data.write().await;
    if data.accounts.contains_key(&email) {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        name: req.name.trim().to_string(),
    };
    data.accounts.insert(
        email,
        Account {
            user: user.clone(),
            password: req.password,
        },
    );
    let token = issue_token(&mut data, &user);
    info!("registered {}", user.email);

    Ok(Json(AuthResponse {
        user,
        token,
        message: Some("User registered successfully".to_string()),
    }))
}

async fn login(
    State(state): State<StubState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let mut data = state.data.write().await;
    let user = match data.accounts.get(&email) {
        Some(account) if account.password == req.password => account.user.clone(),
        _ => return Err(AppError::BadRequest("Invalid email or password".to_string())),
    };
    let token = issue_token(&mut data, &user);

    Ok(Json(AuthResponse {
        user,
        token,
        message: Some("Login successful".to_string()),
    }))
}

fn matches_query(note: &Note, query: &NoteQuery) -> bool {
    if query.favorites_only && !note.is_favorite {
        return false;
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let needle = search.to_lowercase();
        let hit = note.title.to_lowercase().contains(&needle)
            || note.content.to_lowercase().contains(&needle)
            || note.tags.iter().any(|t| t.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if let Some(tags) = query.tags.as_deref().filter(|s| !s.trim().is_empty()) {
        let wanted: Vec<&str> = tags.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
        if !note.tags.iter().any(|t| wanted.contains(&t.as_str())) {
            return false;
        }
    }
    true
}

async fn list_notes(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<NoteQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let mut notes: Vec<&StoredNote> = data
        .workspaces
        .get(&user_id)
        .map(|w| w.notes.iter().filter(|n| matches_query(&n.note, &query)).collect())
        .unwrap_or_default();
    notes.sort_by(|a, b| b.touched.cmp(&a.touched));
    Ok(Json(notes.into_iter().map(|n| n.note.clone()).collect()))
}

async fn get_note(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    data.workspaces
        .get(&user_id)
        .and_then(|w| w.notes.iter().find(|n| n.note.id == id))
        .map(|n| Json(n.note.clone()))
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))
}

async fn create_note(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(req): Json<NewNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let user_id = authorize(&state, &headers).await?;
    req.validate()?;

    let summary = (req.content.chars().count() > SUMMARY_THRESHOLD)
        .then(|| heuristics::summarize(&req.content));
    let tags = match req.tags {
        Some(tags) if !tags.is_empty() => tags,
        _ => heuristics::keywords(&format!("{} {}", req.title, req.content)),
    };
    let note = Note {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        content: req.content,
        summary,
        tags,
        is_favorite: false,
        updated_at: None,
    };

    let stored = StoredNote::new(note);
    let created = stored.note.clone();
    let mut data = state.data.write().await;
    data.workspaces.entry(user_id).or_default().notes.push(stored);

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_note(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    req.validate()?;

    let mut data = state.data.write().await;
    let stored = data
        .workspaces
        .get_mut(&user_id)
        .and_then(|w| w.notes.iter_mut().find(|n| n.note.id == id))
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    if let Some(title) = req.title {
        stored.note.title = title;
    }
    if let Some(content) = req.content {
        stored.note.content = content;
    }
    if let Some(tags) = req.tags {
        stored.note.tags = tags;
    }
    if let Some(is_favorite) = req.is_favorite {
        stored.note.is_favorite = is_favorite;
    }
    stored.touch();

    Ok(Json(stored.note.clone()))
}

async fn delete_note(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    let notes = &mut data.workspaces.entry(user_id).or_default().notes;
    let before = notes.len();
    notes.retain(|n| n.note.id != id);
    if notes.len() == before {
        return Err(AppError::NotFound("Note not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Note deleted successfully".to_string(),
    }))
}

async fn summarize_note(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<NoteSummary>, AppError> {
    authorize(&state, &headers).await?;
    Ok(Json(NoteSummary {
        summary: heuristics::summarize(&req.content),
        keywords: heuristics::keywords(&format!("{} {}", req.title, req.content)),
    }))
}

async fn process_ai(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(req): Json<AiProcessRequest>,
) -> Result<Json<AiProcessResponse>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    let stored = data
        .workspaces
        .get_mut(&user_id)
        .and_then(|w| w.notes.iter_mut().find(|n| n.note.id == req.note_id))
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    let result = match req.action {
        AiAction::Summarize => {
            let summary = heuristics::summarize(&stored.note.content);
            stored.note.summary = Some(summary.clone());
            summary
        }
        AiAction::SuggestTags => {
            let text = format!("{} {}", stored.note.title, stored.note.content);
            serde_json::to_string(&heuristics::keywords(&text))
                .map_err(|e| AppError::BadRequest(e.to_string()))?
        }
        AiAction::Insights => heuristics::insights(&stored.note.title, &stored.note.content),
    };

    Ok(Json(AiProcessResponse {
        action: Some(req.action),
        result: serde_json::Value::String(result),
    }))
}

async fn list_tags(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let mut tags: Vec<String> = data
        .workspaces
        .get(&user_id)
        .map(|w| w.notes.iter().flat_map(|n| n.note.tags.iter().cloned()).collect())
        .unwrap_or_default();
    tags.sort();
    tags.dedup();
    Ok(Json(tags))
}

async fn stats(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> Result<Json<Stats>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let week_ago = Utc::now() - Duration::days(7);
    let stats = data
        .workspaces
        .get(&user_id)
        .map(|w| Stats {
            total_notes: w.notes.len() as u64,
            favorite_notes: w.notes.iter().filter(|n| n.note.is_favorite).count() as u64,
            recent_notes: w.notes.iter().filter(|n| n.touched >= week_ago).count() as u64,
        })
        .unwrap_or_default();
    Ok(Json(stats))
}

async fn list_tasks(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Task>>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let tasks = data
        .workspaces
        .get(&user_id)
        .map(|w| w.tasks.iter().rev().cloned().collect())
        .unwrap_or_default();
    Ok(Json(tasks))
}

async fn extract_tasks(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(req): Json<ExtractTasksRequest>,
) -> Result<Json<ExtractTasksResponse>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    req.validate()?;

    let today = Local::now().date_naive();
    let tasks: Vec<Task> = heuristics::extract_tasks(&req.conversation_text, today)
        .into_iter()
        .map(|extracted| Task {
            id: Uuid::new_v4().to_string(),
            title: extracted.title,
            description: Some(format!("From conversation: {}", req.conversation_text.trim())),
            priority: extracted.priority,
            deadline: extracted.deadline,
            completed: false,
        })
        .collect();

    let mut data = state.data.write().await;
    data.workspaces
        .entry(user_id)
        .or_default()
        .tasks
        .extend(tasks.iter().cloned());

    Ok(Json(ExtractTasksResponse { tasks }))
}

async fn complete_task(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    let task = data
        .workspaces
        .get_mut(&user_id)
        .and_then(|w| w.tasks.iter_mut().find(|t| t.id == id && !t.completed))
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;
    task.completed = true;
    Ok(Json(MessageResponse {
        message: "Task marked as complete".to_string(),
    }))
}

async fn delete_task(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let mut data = state.data.write().await;
    let tasks = &mut data.workspaces.entry(user_id).or_default().tasks;
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        return Err(AppError::NotFound("Task not found".to_string()));
    }
    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

async fn list_events(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Event>>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    let data = state.data.read().await;
    let events = data
        .workspaces
        .get(&user_id)
        .map(|w| w.events.iter().rev().cloned().collect())
        .unwrap_or_default();
    Ok(Json(events))
}

async fn parse_schedule(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(req): Json<ScheduleRequest>,
) -> Result<Json<Event>, AppError> {
    let user_id = authorize(&state, &headers).await?;
    req.validate()?;

    let parsed = heuristics::parse_schedule(&req.natural_language, Local::now().date_naive());
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title: parsed.title,
        description: Some(parsed.description),
        date: parsed.date,
        time: parsed.time,
    };

    let mut data = state.data.write().await;
    data.workspaces.entry(user_id).or_default().events.push(event.clone());
    Ok(Json(event))
}
