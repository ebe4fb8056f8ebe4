use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{AiAction, AiResult, Session, Task, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn into_session(self) -> Session {
        Session {
            token: self.token,
            user: self.user,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTasksResponse {
    pub tasks: Vec<Task>,
}

/// `result` is plain text for most actions and a JSON-encoded list of
/// strings for `suggest_tags`. Some servers send the list unencoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiProcessResponse {
    #[serde(default)]
    pub action: Option<AiAction>,
    pub result: serde_json::Value,
}

impl AiProcessResponse {
    pub fn decode(self, requested: AiAction) -> Result<AiResult, AppError> {
        if let Some(action) = self.action {
            if action != requested {
                return Err(AppError::MalformedResponse(format!(
                    "asked for {} but server answered {}",
                    requested.as_str(),
                    action.as_str()
                )));
            }
        }

        match (requested, self.result) {
            (AiAction::SuggestTags, serde_json::Value::String(encoded)) => {
                serde_json::from_str::<Vec<String>>(&encoded)
                    .map(AiResult::Tags)
                    .map_err(|e| AppError::MalformedResponse(format!("suggested tags: {}", e)))
            }
            (AiAction::SuggestTags, value @ serde_json::Value::Array(_)) => {
                serde_json::from_value::<Vec<String>>(value)
                    .map(AiResult::Tags)
                    .map_err(|e| AppError::MalformedResponse(format!("suggested tags: {}", e)))
            }
            (_, serde_json::Value::String(text)) => Ok(AiResult::Text(text)),
            (action, other) => Err(AppError::MalformedResponse(format!(
                "unexpected {} result: {}",
                action.as_str(),
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Error envelope. `detail` is a string for handled errors and a list for
/// request-validation failures, which carry nothing worth showing verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(text)) if !text.trim().is_empty() => Some(text.clone()),
            _ => None,
        }
    }
}
