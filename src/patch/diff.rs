//! Diff generation using the `similar` crate.
//!
//! Renders the change an applied patch made, for the CLI and the MCP tools.

use similar::{Algorithm, TextDiff};

/// Generate a unified diff between the source and the patched text.
///
/// Uses the Patience algorithm, which keeps unrelated lines out of hunks
/// when a single line was inserted or rewritten.
pub fn unified_diff(label: &str, before: &str, after: &str) -> String {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Patience)
        .diff_lines(before, after);

    diff.unified_diff()
        .context_radius(3)
        .header(&format!("a/{label}"), &format!("b/{label}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_has_no_hunks() {
        let result = unified_diff("main.rs", "hello\n", "hello\n");
        assert!(!result.contains("@@"));
    }

    #[test]
    fn test_inserted_line() {
        let before = "if (cond) {\n    doWork();\n}\n";
        let after = "if (cond) {\n    log();\n    doWork();\n}\n";
        let result = unified_diff("main.c", before, after);
        assert!(result.contains("+++ b/main.c"));
        assert!(result.contains("+    log();"));
        assert!(!result.contains("-    doWork();"));
    }
}
