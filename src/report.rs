//! Plain-text report of a processed patch document.

use crate::document::PatchDocument;
use crate::patch::PatchOutcome;

/// Render the original inputs followed by the modified source.
///
/// A `Diagnostic` section is appended when the edit was not applied.
pub fn render_report(document: &PatchDocument, outcome: &PatchOutcome) -> String {
    let mut out = String::new();
    push_section(&mut out, "Original", &document.source);
    push_section(&mut out, "Match", &document.pattern);
    push_section(&mut out, "Patch", &document.patch);
    push_section(&mut out, "Modified", outcome.text());

    if let Some(error) = outcome.error() {
        push_section(&mut out, "Diagnostic", &error.to_string());
    }
    out
}

fn push_section(out: &mut String, title: &str, body: &str) {
    if !out.is_empty() {
        out.push_str("\n\n");
    }
    out.push_str(&format!("=== {title} ===\n{body}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(pattern: &str) -> PatchDocument {
        PatchDocument {
            source: "let x = 1;".to_owned(),
            pattern: pattern.to_owned(),
            patch: "2".to_owned(),
        }
    }

    #[test]
    fn test_report_layout() {
        let doc = document("let x = >>>1<<<");
        let report = render_report(&doc, &doc.apply());
        assert_eq!(
            report,
            "=== Original ===\nlet x = 1;\n\n\
             === Match ===\nlet x = >>>1<<<\n\n\
             === Patch ===\n2\n\n\
             === Modified ===\nlet x = 2;"
        );
    }

    #[test]
    fn test_report_with_diagnostic() {
        let doc = document("let y = >>>1<<<");
        let report = render_report(&doc, &doc.apply());
        assert!(report.contains("=== Modified ===\nlet x = 1;"));
        assert!(report.contains("=== Diagnostic ===\ntoken 0 (\"let y =\")"));
    }
}
