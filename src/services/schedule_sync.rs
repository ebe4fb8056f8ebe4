use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::models::{Event, ScheduleRequest};
use crate::services::collection::Collection;
use crate::services::shared::Shared;

pub struct ScheduleSync {
    api: Arc<dyn ApiClient>,
    events: Shared<Collection<Event>>,
}

impl ScheduleSync {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            events: Shared::new(Collection::new()),
        }
    }

    pub fn events(&self) -> Collection<Event> {
        self.events.read().clone()
    }

    pub async fn fetch(&self) -> Result<usize, AppError> {
        let events = self.api.list_events().await?;
        debug!("fetched {} events", events.len());
        let mut local = self.events.write();
        local.replace_all(events);
        Ok(local.len())
    }

    /// Turns free text like "study session tomorrow at 3 PM" into an event.
    pub async fn parse(&self, natural_language: &str) -> Result<Event, AppError> {
        let req = ScheduleRequest::new(natural_language);
        req.validate()?;
        let event = self.api.parse_schedule(&req).await?;
        info!("scheduled {} on {} at {}", event.title, event.date, event.time);
        self.events.write().prepend(event.clone());
        Ok(event)
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}
