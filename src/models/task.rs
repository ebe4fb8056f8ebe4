use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::require_text;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[default]
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTasksRequest {
    pub conversation_text: String,
}

impl ExtractTasksRequest {
    pub fn new(conversation_text: impl Into<String>) -> Self {
        Self {
            conversation_text: conversation_text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.conversation_text, "Conversation text")
    }
}
