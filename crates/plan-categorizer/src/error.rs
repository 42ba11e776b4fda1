//! Error types for plan-categorizer operations.
//!
//! The categorization core never fails; these errors come from loading
//! configuration and snapshots and from writing reports.

use std::io;
use thiserror::Error;

/// The error type for plan-categorizer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot or report file error.
    #[error("JSONL error: {0}")]
    Jsonl(#[from] plan_jsonl::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The requested service was not classified in this run.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),
}

/// A specialized Result type for plan-categorizer operations.
pub type Result<T> = std::result::Result<T, Error>;
