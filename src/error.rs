use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Metadata or quote payload did not have the expected shape.
    #[error("Malformed market data: {0}")]
    Metadata(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("JWT signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Sheets API error: {0}")]
    Sheets(String),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
