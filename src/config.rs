use std::env;
use std::net::SocketAddr;

use reqwest::Url;

use crate::error::AppError;

pub const DEFAULT_API_URL: &str = "http://localhost:8001/api";
pub const DEFAULT_SESSION_DB: &str = "sqlite://smart_notes.db";
pub const DEFAULT_STUB_ADDR: &str = "127.0.0.1:8001";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_db_url: String,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>, session_db_url: impl Into<String>) -> Result<Self, AppError> {
        let api_url = normalize_api_url(&api_url.into())?;
        Ok(Self {
            api_url,
            session_db_url: session_db_url.into(),
        })
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let api_url = env::var("SMART_NOTES_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let session_db_url =
            env::var("SMART_NOTES_SESSION_DB").unwrap_or_else(|_| DEFAULT_SESSION_DB.to_string());
        Self::new(api_url, session_db_url)
    }
}

#[derive(Clone, Debug)]
pub struct StubConfig {
    pub addr: SocketAddr,
}

impl StubConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let raw = env::var("STUB_ADDR").unwrap_or_else(|_| DEFAULT_STUB_ADDR.to_string());
        let addr = raw
            .parse()
            .map_err(|_| AppError::Config(format!("STUB_ADDR is not a socket address: {}", raw)))?;
        Ok(Self { addr })
    }
}

/// Checks the base URL is absolute http(s) and strips any trailing slash.
pub fn normalize_api_url(raw: &str) -> Result<String, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Config(format!("invalid API url {}: {}", raw, e)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::Config(format!("API url must be http(s): {}", raw)));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
