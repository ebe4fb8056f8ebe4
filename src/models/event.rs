use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::require_text;

/// A scheduled event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub natural_language: String,
}

impl ScheduleRequest {
    pub fn new(natural_language: impl Into<String>) -> Self {
        Self {
            natural_language: natural_language.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        require_text(&self.natural_language, "Scheduling text")
    }
}
