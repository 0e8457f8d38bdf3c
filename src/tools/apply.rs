//! `apply_patch` tool: run the patch engine on inline text.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use super::{ToolOutput, ToolSpec};
use crate::patch;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyParams {
    /// Text to edit.
    pub source: String,
    /// Match pattern locating the edit (`...`, `>>>`, `<<<`).
    pub pattern: String,
    /// Text to insert or substitute.
    pub patch: String,
}

pub const NAME: &str = "apply_patch";

pub fn spec() -> ToolSpec {
    let mut properties = super::pattern_properties();
    properties["source"] = json!({ "type": "string", "description": "Text to edit" });

    ToolSpec {
        name: NAME,
        description: "Apply a marker-driven patch to inline text. Returns the modified text, \
            or an error naming the token that failed to match.",
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": ["source", "pattern", "patch"]
        }),
    }
}

pub fn execute(arguments: serde_json::Value) -> Result<ToolOutput> {
    let params: ApplyParams =
        serde_json::from_value(arguments).context("invalid apply_patch parameters")?;

    let outcome = patch::apply(&params.source, &params.pattern, &params.patch);
    Ok(match outcome.into_result() {
        Ok(text) => ToolOutput::text(text),
        Err(e) => ToolOutput::error(format!("Error: patch not applied: {e}")),
    })
}
