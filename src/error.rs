// Error taxonomy shared by every command. The binary wraps these in
// `anyhow` at the top level; library code returns `Result<T>`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Bad or missing CLI input or credentials. Raised before any request.
    #[error("{0}")]
    Usage(String),

    #[error("Could not find {what} in the response from {url}")]
    Extraction { what: &'static str, url: String },

    #[error("Response from {url} is missing the `{key}` field")]
    KeyMissing { key: &'static str, url: String },

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("{} not found, run `codewars train` first", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse {}: {source}; run `codewars train` again to re-fetch the kata", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Language `{0}` is not supported yet")]
    UnsupportedLanguage(String),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
