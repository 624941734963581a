use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    /// The service rejected the request due to access-control configuration.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            LlmError::PermissionDenied(_) => true,
            LlmError::Api { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
