//! `apply_document` tool: process a Markdown patch document.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::{ToolOutput, ToolSpec};
use crate::document::PatchDocument;
use crate::error::MarkpatchError;
use crate::report::render_report;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParams {
    /// Path to the Markdown document (relative to workspace or absolute).
    pub file_path: String,
}

pub const NAME: &str = "apply_document";

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Process a Markdown patch document with `Source file`, `match:` and `patch` \
            sections (each a fenced code block under a heading). Returns a report with the \
            original, the pattern, the patch and the modified source.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "filePath": {
                    "type": "string",
                    "description": "Path to the Markdown patch document"
                }
            },
            "required": ["filePath"]
        }),
    }
}

pub fn execute(workspace: &Path, arguments: serde_json::Value) -> Result<ToolOutput> {
    let params: DocumentParams =
        serde_json::from_value(arguments).context("invalid apply_document parameters")?;

    let file_path = match super::resolve_in_workspace(workspace, &params.file_path) {
        Ok(p) => p,
        Err(e) => return Ok(ToolOutput::error(format!("Error: {e}"))),
    };

    let document = match PatchDocument::load(&file_path) {
        Ok(doc) => doc,
        Err(e @ (MarkpatchError::FileNotFound { .. } | MarkpatchError::MissingSection { .. })) => {
            return Ok(ToolOutput::error(format!("Error: {e}")));
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = document.apply();
    let report = render_report(&document, &outcome);
    Ok(if outcome.changed() {
        ToolOutput::text(report)
    } else {
        ToolOutput::error(report)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Source file\n```\nreturn a+b\n```\n# match:\n```\nreturn a+>>>b\n```\n# patch\n```\nX\n```\n";

    #[test]
    fn test_document_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("change.md"), DOC).expect("write");

        let result = execute(dir.path(), serde_json::json!({ "filePath": "change.md" }))
            .expect("execute");
        assert!(!result.is_error);
        assert!(result.body().ends_with("=== Modified ===\nreturn a+X b"));
    }

    #[test]
    fn test_missing_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("bad.md"), "# Source file\n```\nx\n```\n").expect("write");

        let result =
            execute(dir.path(), serde_json::json!({ "filePath": "bad.md" })).expect("execute");
        assert!(result.is_error);
        assert!(result.body().contains("match:"));
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result =
            execute(dir.path(), serde_json::json!({ "filePath": "nope.md" })).expect("execute");
        assert!(result.is_error);
        assert!(result.body().contains("not found"));
    }
}
