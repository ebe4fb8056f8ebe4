pub mod auth_service;
pub mod collection;
pub mod note_sync;
pub mod schedule_sync;
mod shared;
pub mod task_sync;
pub mod workspace;

pub use auth_service::AuthService;
pub use collection::Collection;
pub use note_sync::NoteSync;
pub use schedule_sync::ScheduleSync;
pub use task_sync::TaskSync;
pub use workspace::Workspace;
