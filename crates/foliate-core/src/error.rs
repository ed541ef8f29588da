//! Crate-wide error type and `Result` alias.

use thiserror::Error;

/// Errors the pipeline and its adapters can raise. Each variant is fatal
/// only for the page (or stream) that produced it — callers driving many
/// pages must catch per-page and continue with the rest.
#[derive(Debug, Error)]
pub enum FoliateError {
    #[error("external tool `{tool}` failed (status {status:?}): {stderr}")]
    ExternalToolFailed { tool: &'static str, status: Option<i32>, stderr: String },

    #[error("reading direction requested for an empty document space")]
    EmptySpace,

    #[error("a single UNKNOWN-orientation word cannot determine a reading direction")]
    UndetectableOrientation,

    #[error("chosen cut line passes through a word's bounding box")]
    CutThroughWord,

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, FoliateError>;
