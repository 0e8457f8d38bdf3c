//! Marker-driven patch engine.
//!
//! A match pattern locates an edit position in line-oriented text, then the
//! patch is either substituted for a delimited span or inserted.
//!
//! # Pattern language
//!
//! - literal text must appear in the source, in order (exact substring)
//! - `...` skips ahead to wherever the next literal appears
//! - `>>>` marks where the edit happens
//! - `>>>old<<<` replaces `old` with the patch
//!
//! # Pipeline
//!
//! ```text
//! pattern ──tokenize──▶ tokens ──matcher::run──▶ MatchCursor
//!                                                   │
//!                         edit::classify(tokens after marker)
//!                          ├─ Replace { target }       → replace_span
//!                          ├─ Insert { anchor: Some }  → insert_before_anchor
//!                          └─ Insert { anchor: None }  → insert_line
//! ```
//!
//! Every step is all-or-nothing: on any failure the source comes back
//! unchanged together with a [`PatchError`] saying why.

pub mod diff;
pub mod edit;
pub mod matcher;
pub mod token;

use tracing::{debug, warn};

pub use edit::EditPlan;
pub use matcher::MatchCursor;
pub use token::{tokenize, ParsedPattern, Token};

use crate::error::PatchError;

/// Result of [`apply`]: the text to use plus whether an edit was committed.
///
/// Keeps the input so the change can be rendered as a diff afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    source: String,
    patched: Result<String, PatchError>,
}

impl PatchOutcome {
    /// Patched text, or the untouched source when the edit was abandoned.
    pub fn text(&self) -> &str {
        self.patched.as_deref().unwrap_or(self.source.as_str())
    }

    /// `true` when the edit was committed.
    pub fn changed(&self) -> bool {
        self.patched.is_ok()
    }

    /// Why the edit was abandoned, if it was.
    pub fn error(&self) -> Option<&PatchError> {
        self.patched.as_ref().err()
    }

    /// Unified diff from the input to [`Self::text`], headed `a/{label}` and
    /// `b/{label}`. Has no hunks when the edit was abandoned.
    pub fn diff(&self, label: &str) -> String {
        diff::unified_diff(label, &self.source, self.text())
    }

    /// `(result, changed)` pair.
    pub fn into_parts(self) -> (String, bool) {
        match self.patched {
            Ok(text) => (text, true),
            Err(_) => (self.source, false),
        }
    }

    pub fn into_result(self) -> Result<String, PatchError> {
        self.patched
    }
}

/// Apply `patch` to `source` at the position `pattern` locates.
///
/// Never fails outright: on a mismatch the outcome carries the original
/// source byte-for-byte and the reason.
pub fn apply(source: &str, pattern: &str, patch: &str) -> PatchOutcome {
    let patched = try_apply(source, pattern, patch);
    if let Err(e) = &patched {
        warn!(error = %e, "patch not applied, source left unchanged");
    }
    PatchOutcome {
        source: source.to_owned(),
        patched,
    }
}

/// Apply `patch` to `source`, reporting failures as errors.
pub fn try_apply(source: &str, pattern: &str, patch: &str) -> Result<String, PatchError> {
    let parsed = tokenize(pattern);
    debug!(tokens = parsed.tokens().len(), "tokenized match pattern");
    for (idx, token) in parsed.tokens().iter().enumerate() {
        debug!(idx, %token, "token");
    }

    if parsed.insert_pos().is_none() {
        return Err(PatchError::MarkerNotFound);
    }

    let lines: Vec<&str> = source.split('\n').collect();
    let cursor = matcher::run(parsed.tokens(), &lines)?;
    let rest = &parsed.tokens()[cursor.token_index..];

    let edited = match edit::classify(rest) {
        EditPlan::Replace { target } => edit::replace_span(&lines, &cursor, target, patch)?,
        EditPlan::Insert {
            anchor: Some(anchor),
        } => edit::insert_before_anchor(&lines, &cursor, anchor, patch)?,
        EditPlan::Insert { anchor: None } => edit::insert_line(&lines, &cursor, patch),
    };

    Ok(edited.join("\n"))
}
