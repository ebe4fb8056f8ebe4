use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::models::{
    AiAction, AiProcessRequest, AiResult, NewNoteRequest, Note, NoteQuery, NoteSummary, Stats,
    SummarizeRequest, UpdateNoteRequest,
};
use crate::services::collection::Collection;
use crate::services::shared::Shared;

/// Keeps the local notes list in step with the server.
///
/// Every mutation is applied locally only after the server confirms it.
/// Updates are followed by a refetch with the last filter used, so the list
/// always reflects the server's own view of the edited note.
pub struct NoteSync {
    api: Arc<dyn ApiClient>,
    notes: Shared<Collection<Note>>,
    query: Shared<NoteQuery>,
    tags: Shared<Vec<String>>,
}

impl NoteSync {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            notes: Shared::new(Collection::new()),
            query: Shared::new(NoteQuery::default()),
            tags: Shared::new(Vec::new()),
        }
    }

    /// Snapshot of the current list.
    pub fn notes(&self) -> Collection<Note> {
        self.notes.read().clone()
    }

    pub fn note(&self, id: &str) -> Option<Note> {
        self.notes.read().get(id).cloned()
    }

    pub fn query(&self) -> NoteQuery {
        self.query.read().clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.read().clone()
    }

    /// Replaces the whole list with the server's answer for `query`.
    pub async fn fetch(&self, query: NoteQuery) -> Result<usize, AppError> {
        let notes = self.api.list_notes(&query).await?;
        debug!("fetched {} notes", notes.len());
        let mut local = self.notes.write();
        local.replace_all(notes);
        *self.query.write() = query;
        Ok(local.len())
    }

    pub async fn refresh(&self) -> Result<usize, AppError> {
        let query = self.query();
        self.fetch(query).await
    }

    pub async fn create(&self, req: NewNoteRequest) -> Result<Note, AppError> {
        req.validate()?;
        let note = self.api.create_note(&req).await?;
        info!("created note {}", note.id);
        self.notes.write().prepend(note.clone());
        Ok(note)
    }

    pub async fn update(&self, id: &str, req: UpdateNoteRequest) -> Result<Note, AppError> {
        req.validate()?;
        if req.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        let updated = self.api.update_note(id, &req).await?;

        if let Err(e) = self.refresh().await {
            // The write went through; settle for the copy the server returned.
            warn!("refetch after updating note {} failed: {}", id, e);
            self.notes.write().replace(updated.clone());
        }
        Ok(self.note(id).unwrap_or(updated))
    }

    pub async fn edit(
        &self,
        id: &str,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<Note, AppError> {
        self.update(id, UpdateNoteRequest::edit(title, content, tags)).await
    }

    pub async fn toggle_favorite(&self, id: &str) -> Result<Note, AppError> {
        let current = self
            .note(id)
            .map(|note| note.is_favorite)
            .ok_or_else(|| AppError::Validation("Note not found".to_string()))?;
        self.update(id, UpdateNoteRequest::favorite(!current)).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.api.delete_note(id).await?;
        self.notes.write().remove(id);
        info!("deleted note {}", id);
        Ok(())
    }

    /// Reads one note and refreshes its cached copy if it is listed.
    pub async fn get(&self, id: &str) -> Result<Note, AppError> {
        let note = self.api.get_note(id).await?;
        self.notes.write().replace(note.clone());
        Ok(note)
    }

    /// Summary and keywords for a draft. Nothing is stored.
    pub async fn summarize(&self, title: &str, content: &str) -> Result<NoteSummary, AppError> {
        NewNoteRequest::new(title, content).validate()?;
        let req = SummarizeRequest {
            title: title.to_string(),
            content: content.to_string(),
        };
        self.api.summarize(&req).await
    }

    pub async fn ai_process(&self, id: &str, action: AiAction) -> Result<AiResult, AppError> {
        let req = AiProcessRequest {
            action,
            note_id: id.to_string(),
        };
        let result = self.api.process_ai(&req).await?.decode(action)?;

        // The server stores a fresh summary on the note; mirror that one field.
        if let (AiAction::Summarize, AiResult::Text(summary)) = (action, &result) {
            self.notes
                .write()
                .update(id, |note| note.summary = Some(summary.clone()));
        }
        Ok(result)
    }

    pub async fn load_tags(&self) -> Result<Vec<String>, AppError> {
        let tags = self.api.list_tags().await?;
        *self.tags.write() = tags.clone();
        Ok(tags)
    }

    pub async fn stats(&self) -> Result<Stats, AppError> {
        self.api.stats().await
    }

    pub fn clear(&self) {
        self.notes.write().clear();
        self.tags.write().clear();
        *self.query.write() = NoteQuery::default();
    }
}
