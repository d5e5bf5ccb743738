//! Provisioning error types.

use std::path::PathBuf;

/// Errors produced during one provisioning run.
///
/// Any step's failure is fatal to the run; partial directory state is
/// left in place for inspection.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive download failed with HTTP status {status}")]
    Download { status: u16 },

    #[error("archive extraction failed: {0}")]
    Extract(String),

    #[error("{} is not a steam_api.dll or steam_api64.dll", .0.display())]
    InvalidBinary(PathBuf),

    #[error("platform payload directory not found in extracted archive")]
    PayloadNotFound,

    #[error("interface generator tools not found in extracted archive")]
    ToolsNotFound,

    #[error("interface generation failed: {0}")]
    InterfaceGeneration(String),
}
