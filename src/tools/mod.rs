//! Patch tools served over MCP.
//!
//! Every call produces a [`ToolOutput`]. A patch that does not apply, a bad
//! path or malformed arguments are error *outputs* (`isError: true`) carrying
//! the diagnostic, never protocol errors.

pub mod apply;
pub mod document;
pub mod patch_file;

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error};

/// Name, description and JSON Schema of one tool, as listed by `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Body of a `tools/call` result: a single text item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    content: [TextContent; 1],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: [TextContent {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    pub fn body(&self) -> &str {
        &self.content[0].text
    }
}

/// All tools, in listing order.
pub fn catalog() -> Vec<ToolSpec> {
    vec![apply::spec(), document::spec(), patch_file::spec()]
}

/// Schema properties shared by the tools that take a pattern and a patch.
fn pattern_properties() -> Value {
    json!({
        "pattern": {
            "type": "string",
            "description": "Match pattern: literal text with `...` (skip ahead), `>>>` (edit here) and `>>>old<<<` (replace old)"
        },
        "patch": {
            "type": "string",
            "description": "Text to insert or substitute"
        }
    })
}

/// Resolve `file_path` against `workspace` and make sure it stays inside.
///
/// Absolute paths are accepted when they point into the workspace. A path
/// that does not exist yet is resolved through its deepest existing ancestor;
/// its missing tail may not climb with `..`.
pub fn resolve_in_workspace(workspace: &Path, file_path: &str) -> Result<PathBuf> {
    if file_path.contains('\0') {
        bail!("path contains null byte");
    }

    let root = workspace
        .canonicalize()
        .with_context(|| format!("invalid workspace {}", workspace.display()))?;
    let joined = root.join(file_path);

    let Some(existing) = joined.ancestors().find(|p| p.symlink_metadata().is_ok()) else {
        bail!("path has no existing ancestor: {file_path}");
    };
    let tail = joined.strip_prefix(existing)?;
    let climbs = tail.components().any(|c| c == Component::ParentDir);
    let resolved = existing.canonicalize()?.join(tail);

    if climbs || !resolved.starts_with(&root) {
        bail!("path escapes workspace boundary: {file_path}");
    }
    Ok(resolved)
}

/// Dispatches `tools/call` requests to the patch tools.
pub struct ToolRouter {
    /// Root that file-based tools are confined to.
    workspace: PathBuf,
}

impl ToolRouter {
    pub const fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }

    /// Run the tool `name` with JSON `arguments`.
    pub fn call_tool(&self, name: &str, arguments: Value) -> ToolOutput {
        debug!(tool = name, "dispatching tool call");

        let result = match name {
            apply::NAME => apply::execute(arguments),
            document::NAME => document::execute(&self.workspace, arguments),
            patch_file::NAME => patch_file::execute(&self.workspace, arguments),
            _ => return ToolOutput::error(format!("Unknown tool: {name}")),
        };
        result.unwrap_or_else(|e| {
            error!(tool = name, error = %e, "tool call failed");
            ToolOutput::error(format!("Error: {e:#}"))
        })
    }
}
