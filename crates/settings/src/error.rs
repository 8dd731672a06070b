//! Error types for settings operations.

/// Errors produced while reading, writing or editing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings document is not a JSON object")]
    NotAnObject,

    #[error("invalid instance URL: {0:?}")]
    InvalidUrl(String),
}
