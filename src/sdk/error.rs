use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("consent must be confirmed before a portrait is uploaded")]
    ConsentRequired,
}

impl SdkError {
    /// HTTP status of a non-2xx response, if that is what failed.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
