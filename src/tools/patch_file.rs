//! `patch_file` tool: apply a patch to a workspace file in place.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{ToolOutput, ToolSpec};
use crate::patch;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchFileParams {
    /// Path to the file to edit (relative to workspace or absolute).
    pub file_path: String,
    pub pattern: String,
    pub patch: String,
    /// Report the diff without writing.
    #[serde(default)]
    pub dry_run: bool,
}

pub const NAME: &str = "patch_file";

pub fn spec() -> ToolSpec {
    let mut properties = super::pattern_properties();
    properties["filePath"] = json!({ "type": "string", "description": "Path to the file to edit" });
    properties["dryRun"] = json!({
        "type": "boolean",
        "description": "Return the diff without writing (default: false)",
        "default": false
    });

    ToolSpec {
        name: NAME,
        description: "Apply a marker-driven patch to a file and return a unified diff. \
            The file is rewritten atomically and only when the pattern matches.",
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": ["filePath", "pattern", "patch"]
        }),
    }
}

pub fn execute(workspace: &Path, arguments: serde_json::Value) -> Result<ToolOutput> {
    let params: PatchFileParams =
        serde_json::from_value(arguments).context("invalid patch_file parameters")?;

    let file_path = match super::resolve_in_workspace(workspace, &params.file_path) {
        Ok(p) => p,
        Err(e) => return Ok(ToolOutput::error(format!("Error: {e}"))),
    };

    if !file_path.exists() {
        return Ok(ToolOutput::error(format!(
            "Error: file not found: {}",
            file_path.display()
        )));
    }

    let original = std::fs::read_to_string(&file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;

    let outcome = patch::apply(&original, &params.pattern, &params.patch);
    if let Some(e) = outcome.error() {
        return Ok(ToolOutput::error(format!(
            "Error: patch not applied to {}: {e}",
            file_path.display()
        )));
    }

    let diff = outcome.diff(&file_path.display().to_string());

    if !params.dry_run {
        crate::util::atomic::atomic_write(&file_path, outcome.text())?;
        info!(path = %file_path.display(), "patched file");
    }

    Ok(ToolOutput::text(diff))
}
