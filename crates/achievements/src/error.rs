//! Acquisition error types.

/// The expected document structure was missing or broken.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("achievements section not found")]
    MissingSection,

    #[error("achievements table not found")]
    MissingTable,

    #[error("malformed achievement row {index}")]
    MalformedRow { index: usize },
}

/// Errors from fetching, parsing or persisting achievements.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
