pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod session;
pub mod stub;

pub use error::AppError;
pub use services::Workspace;
pub use session::SessionContext;
