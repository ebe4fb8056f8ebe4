use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::require_text;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "keywords")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNoteRequest {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NewNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.title, "Title")?;
        require_text(&self.content, "Content")
    }
}

/// Partial note update. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl UpdateNoteRequest {
    pub fn edit(title: impl Into<String>, content: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            tags: Some(tags),
            is_favorite: None,
        }
    }

    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    /// A present title or content must not be blank.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            require_text(title, "Title")?;
        }
        if let Some(content) = &self.content {
            require_text(content, "Content")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Filter for the note listing; empty parts are not sent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub favorites_only: bool,
}

impl NoteQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn favorites() -> Self {
        Self {
            favorites_only: true,
            ..Self::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(tags) = self.tags.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("tags", tags.to_string()));
        }
        if self.favorites_only {
            pairs.push(("favorites_only", "true".to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiAction {
    Summarize,
    SuggestTags,
    Insights,
}

impl AiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiAction::Summarize => "summarize",
            AiAction::SuggestTags => "suggest_tags",
            AiAction::Insights => "insights",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProcessRequest {
    pub action: AiAction,
    pub note_id: String,
}

/// Decoded `result` of an AI action.
#[derive(Debug, Clone, PartialEq)]
pub enum AiResult {
    Text(String),
    Tags(Vec<String>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_notes: u64,
    pub favorite_notes: u64,
    pub recent_notes: u64,
}
