pub mod event;
pub mod note;
pub mod task;
pub mod user;

pub use event::{Event, ScheduleRequest};
pub use note::{
    AiAction, AiProcessRequest, AiResult, NewNoteRequest, Note, NoteQuery, NoteSummary,
    Stats, SummarizeRequest, UpdateNoteRequest,
};
pub use task::{ExtractTasksRequest, Priority, Task};
pub use user::{LoginRequest, RegisterRequest, Session, User};

/// A record held in a local collection, keyed by its server-assigned id.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

impl Entity for Note {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Rejects blank user input before anything is sent.
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), crate::error::AppError> {
    if value.trim().is_empty() {
        return Err(crate::error::AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
