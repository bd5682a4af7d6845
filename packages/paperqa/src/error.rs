//! Typed errors for the paper pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each pipeline concern gets
//! its own taxonomy so callers can map failures to distinct boundary
//! responses: a missing cache entry is NotFound, a dead provider is
//! ServiceUnavailable, a response that would not parse is never treated
//! as data.

use thiserror::Error;

/// Errors from outbound model calls (chat or embedding providers).
#[derive(Debug, Error)]
pub enum AiError {
    /// Network-level failure or rate limit; retryable.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Provider returned a non-success status that is not retryable.
    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Retries were attempted and exhausted.
    #[error("provider unavailable after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },

    /// The model's raw output did not parse into the expected shape.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// Required credentials were absent at construction time.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

impl AiError {
    /// Whether the call site may retry this error with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, AiError::Transient(_))
    }
}

/// Errors from artifact storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored artifact did not deserialize.
    #[error("artifact decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the document-intelligence boundary.
#[derive(Debug, Error)]
pub enum DocIntelError {
    #[error("document intelligence request failed: {0}")]
    Request(String),

    #[error("document intelligence error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("document not found: {0}")]
    DocumentNotFound(String),
}

/// Errors that can abort extraction of a whole document.
///
/// Per-item failures (one page's table detection, one figure description)
/// are logged and skipped at the loop site instead of surfacing here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("document intelligence error: {0}")]
    DocIntel(#[from] DocIntelError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Meta extraction output did not parse even after a re-prompt.
    #[error("malformed extraction output: {0}")]
    MalformedOutput(String),
}

/// Errors from the query (ask/summarize/evaluate) path.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query referenced a document whose cache was never populated.
    #[error("no cached artifacts for document: {document}")]
    MissingArtifact { document: String },

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The answer response did not parse even after a re-prompt.
    #[error("malformed answer output: {0}")]
    MalformedAnswer(String),

    /// The caller cancelled the query.
    #[error("query cancelled")]
    Cancelled,
}

/// Result type alias for model calls.
pub type AiResult<T> = std::result::Result<T, AiError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for document-intelligence calls.
pub type DocIntelResult<T> = std::result::Result<T, DocIntelError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
