use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with an `error` field in the body.
    #[error("{0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Network unreachable, timeout, or a body that was not the JSON we expected.
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
