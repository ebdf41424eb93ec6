//! Content API errors

use thiserror::Error;

/// Failures talking to the content repository
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid content API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cursor {0} does not point at the content repository")]
    ForeignCursor(String),

    #[error("content API did not advertise a master ref")]
    NoMasterRef,
}
