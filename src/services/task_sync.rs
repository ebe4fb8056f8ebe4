use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::models::{ExtractTasksRequest, Task};
use crate::services::collection::Collection;
use crate::services::shared::Shared;

/// Tasks only move forward: incomplete, then completed, or removed.
pub struct TaskSync {
    api: Arc<dyn ApiClient>,
    tasks: Shared<Collection<Task>>,
}

impl TaskSync {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            tasks: Shared::new(Collection::new()),
        }
    }

    /// Snapshot of the current list.
    pub fn tasks(&self) -> Collection<Task> {
        self.tasks.read().clone()
    }

    pub async fn fetch(&self) -> Result<usize, AppError> {
        let tasks = self.api.list_tasks().await?;
        debug!("fetched {} tasks", tasks.len());
        let mut local = self.tasks.write();
        local.replace_all(tasks);
        Ok(local.len())
    }

    /// Server-side extraction; the whole batch lands at the front.
    pub async fn extract(&self, conversation_text: &str) -> Result<Vec<Task>, AppError> {
        let req = ExtractTasksRequest::new(conversation_text);
        req.validate()?;
        let extracted = self.api.extract_tasks(&req).await?;
        info!("extracted {} tasks", extracted.len());
        self.tasks.write().prepend_all(extracted.clone());
        Ok(extracted)
    }

    /// Returns false when the task is already known to be completed; no
    /// request is sent in that case.
    pub async fn complete(&self, id: &str) -> Result<bool, AppError> {
        let already_done = self.tasks.read().get(id).is_some_and(|task| task.completed);
        if already_done {
            return Ok(false);
        }
        self.api.complete_task(id).await?;
        self.tasks.write().update(id, |task| task.completed = true);
        Ok(true)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.api.delete_task(id).await?;
        self.tasks.write().remove(id);
        Ok(())
    }

    pub fn clear(&self) {
        self.tasks.write().clear();
    }
}
