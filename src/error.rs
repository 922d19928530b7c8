//! Error types for the fallible edges of the core
//!
//! Per-frame code never fails; only settings files, the dialogue content
//! document and the image loader seam report errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Failed to load image {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("Content fetch failed: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
