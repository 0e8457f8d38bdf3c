//! Error types for the markpatch crate.

use std::path::PathBuf;

/// Why an edit was abandoned.
///
/// Every variant collapses to the same observable outcome (the source is
/// returned untouched); the variant only tells the caller what went wrong.
/// Line numbers in messages are 1-based, the fields are 0-based indices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// The pattern contains no `>>>` marker at all.
    #[error("marker `>>>` not found in match pattern")]
    MarkerNotFound,

    /// Matching consumed tokens without ever reaching the marker.
    #[error("matching stopped at token {token_index} without reaching the `>>>` marker")]
    MarkerNotReached { token_index: usize },

    /// A literal (or the target of a wildcard) is absent from the remaining lines.
    #[error("token {token_index} ({value:?}) not found from line {} onward", .line_index + 1)]
    TokenMismatch {
        token_index: usize,
        value: String,
        line_index: usize,
    },

    /// Replace mode: the `>>>text<<<` span is absent after the marker position.
    #[error("replace target {value:?} not found from line {} onward", .line_index + 1)]
    ReplaceTargetMissing { value: String, line_index: usize },

    /// Insert mode: the anchor literal is absent after the marker position.
    #[error("insert anchor {value:?} not found from line {} onward", .line_index + 1)]
    AnchorMissing { value: String, line_index: usize },
}

/// Crate-level errors for patch documents and files.
#[derive(Debug, thiserror::Error)]
pub enum MarkpatchError {
    /// A required section is absent from a patch document.
    #[error("patch document has no `{section}` section with a fenced code block")]
    MissingSection { section: &'static str },

    /// The edit engine refused the patch.
    #[error("patch not applied: {0}")]
    Patch(#[from] PatchError),

    /// File not found at the specified path.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for markpatch operations.
pub type MarkpatchResult<T> = Result<T, MarkpatchError>;

/// JSON-RPC failures answered with an `error` object instead of a result.
///
/// Tool failures are not in here: those travel as `isError` tool results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcError {
    /// JSON-RPC 2.0 error code.
    pub const fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Internal(_) => -32603,
        }
    }
}
