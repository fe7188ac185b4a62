use thiserror::Error;

/// Errors raised by entity clients and payload formats
#[derive(Error, Debug)]
pub enum ODataError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}
