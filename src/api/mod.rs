pub mod dto;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::models::{
    Entity, Event, ExtractTasksRequest, LoginRequest, NewNoteRequest, Note, NoteQuery,
    NoteSummary, AiProcessRequest, RegisterRequest, ScheduleRequest, Stats, SummarizeRequest,
    Task, UpdateNoteRequest,
};
use crate::session::SessionContext;

use dto::{AiProcessResponse, AuthResponse, ErrorBody, ExtractTasksResponse, HealthResponse};

/// Request/response contract of the remote API.
///
/// Every method is a single round trip. Implementations do not touch local
/// collections; that is the job of the sync services.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn health(&self) -> Result<HealthResponse, AppError>;

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AppError>;

    async fn list_notes(&self, query: &NoteQuery) -> Result<Vec<Note>, AppError>;
    async fn get_note(&self, id: &str) -> Result<Note, AppError>;
    async fn create_note(&self, req: &NewNoteRequest) -> Result<Note, AppError>;
    async fn update_note(&self, id: &str, req: &UpdateNoteRequest) -> Result<Note, AppError>;
    async fn delete_note(&self, id: &str) -> Result<(), AppError>;
    async fn summarize(&self, req: &SummarizeRequest) -> Result<NoteSummary, AppError>;
    async fn process_ai(&self, req: &AiProcessRequest) -> Result<AiProcessResponse, AppError>;
    async fn list_tags(&self) -> Result<Vec<String>, AppError>;
    async fn stats(&self) -> Result<Stats, AppError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError>;
    async fn extract_tasks(&self, req: &ExtractTasksRequest) -> Result<Vec<Task>, AppError>;
    async fn complete_task(&self, id: &str) -> Result<(), AppError>;
    async fn delete_task(&self, id: &str) -> Result<(), AppError>;

    async fn list_events(&self) -> Result<Vec<Event>, AppError>;
    async fn parse_schedule(&self, req: &ScheduleRequest) -> Result<Event, AppError>;
}

pub struct HttpApiClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl HttpApiClient {
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid request url {}: {}", raw, e)))
    }

    /// Builds a request, attaching the bearer token if a session is active.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<String, AppError> {
        let response = builder.send().await.map_err(|e| {
            warn!("request failed: {}", e);
            AppError::Transport(e)
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail_text());
            warn!("API error {}: {}", status, body);
            return Err(AppError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let body = self.dispatch(builder).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            AppError::MalformedResponse(e.to_string())
        })
    }

    /// Status-only endpoints; whatever body comes back is ignored.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), AppError> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path)?;
        self.send(self.request(Method::GET, url)).await
    }

    async fn post<B: serde::Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.url(path)?;
        self.send(self.request(Method::POST, url).json(body)).await
    }
}

fn checked_entity<T: Entity>(entity: T) -> Result<T, AppError> {
    if entity.id().trim().is_empty() {
        return Err(AppError::MalformedResponse("entity without an id".to_string()));
    }
    Ok(entity)
}

fn checked_entities<T: Entity>(entities: Vec<T>) -> Result<Vec<T>, AppError> {
    entities.into_iter().map(checked_entity).collect()
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn health(&self) -> Result<HealthResponse, AppError> {
        self.get("health").await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.post("auth/register", req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AppError> {
        self.post("auth/login", req).await
    }

    async fn list_notes(&self, query: &NoteQuery) -> Result<Vec<Note>, AppError> {
        let mut url = self.url("notes")?;
        let pairs = query.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        let notes: Vec<Note> = self.send(self.request(Method::GET, url)).await?;
        checked_entities(notes)
    }

    async fn get_note(&self, id: &str) -> Result<Note, AppError> {
        let note: Note = self.get(&format!("notes/{}", id)).await?;
        checked_entity(note)
    }

    async fn create_note(&self, req: &NewNoteRequest) -> Result<Note, AppError> {
        let note: Note = self.post("notes", req).await?;
        checked_entity(note)
    }

    async fn update_note(&self, id: &str, req: &UpdateNoteRequest) -> Result<Note, AppError> {
        let url = self.url(&format!("notes/{}", id))?;
        let note: Note = self.send(self.request(Method::PUT, url).json(req)).await?;
        checked_entity(note)
    }

    async fn delete_note(&self, id: &str) -> Result<(), AppError> {
        let url = self.url(&format!("notes/{}", id))?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    async fn summarize(&self, req: &SummarizeRequest) -> Result<NoteSummary, AppError> {
        self.post("notes/summarize", req).await
    }

    async fn process_ai(&self, req: &AiProcessRequest) -> Result<AiProcessResponse, AppError> {
        self.post("ai/process", req).await
    }

    async fn list_tags(&self) -> Result<Vec<String>, AppError> {
        self.get("tags").await
    }

    async fn stats(&self) -> Result<Stats, AppError> {
        self.get("stats").await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let tasks: Vec<Task> = self.get("tasks").await?;
        checked_entities(tasks)
    }

    async fn extract_tasks(&self, req: &ExtractTasksRequest) -> Result<Vec<Task>, AppError> {
        let response: ExtractTasksResponse = self.post("tasks/extract", req).await?;
        checked_entities(response.tasks)
    }

    async fn complete_task(&self, id: &str) -> Result<(), AppError> {
        let url = self.url(&format!("tasks/{}/complete", id))?;
        self.send_empty(self.request(Method::PUT, url)).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let url = self.url(&format!("tasks/{}", id))?;
        self.send_empty(self.request(Method::DELETE, url)).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, AppError> {
        let events: Vec<Event> = self.get("schedule").await?;
        checked_entities(events)
    }

    async fn parse_schedule(&self, req: &ScheduleRequest) -> Result<Event, AppError> {
        let event: Event = self.post("schedule/parse", req).await?;
        checked_entity(event)
    }
}
