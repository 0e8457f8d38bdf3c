//! Markdown patch documents.
//!
//! A patch document carries the three inputs of an edit as fenced code
//! blocks, each under its own heading:
//!
//! ````markdown
//! # Source file
//! ```c
//! if (cond) {
//!     doWork();
//! }
//! ```
//!
//! # match:
//! ```
//! if (cond) {>>>
//! ```
//!
//! # patch
//! ```
//! log();
//! ```
//! ````

use std::path::Path;

use tracing::debug;

use crate::error::{MarkpatchError, MarkpatchResult};

pub const SOURCE_SECTION: &str = "Source file";
pub const MATCH_SECTION: &str = "match:";
pub const PATCH_SECTION: &str = "patch";

const FENCE: &str = "```";

/// The three inputs of one edit, as extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDocument {
    pub source: String,
    pub pattern: String,
    pub patch: String,
}

impl PatchDocument {
    /// Extract source, match pattern and patch from Markdown `content`.
    pub fn parse(content: &str) -> MarkpatchResult<Self> {
        let section = |name: &'static str| {
            extract_section(content, name).ok_or(MarkpatchError::MissingSection { section: name })
        };

        Ok(Self {
            source: section(SOURCE_SECTION)?,
            pattern: section(MATCH_SECTION)?,
            patch: section(PATCH_SECTION)?,
        })
    }

    /// Read and parse a patch document from disk.
    pub fn load(path: &Path) -> MarkpatchResult<Self> {
        if !path.exists() {
            return Err(MarkpatchError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| MarkpatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "loaded patch document");
        Self::parse(&content)
    }

    /// Run the edit engine on this document's inputs.
    pub fn apply(&self) -> crate::patch::PatchOutcome {
        crate::patch::apply(&self.source, &self.pattern, &self.patch)
    }
}

/// Contents of the first fenced code block after the heading `name`.
///
/// Headings compare case-insensitively after stripping `#` marks and
/// surrounding whitespace; only the first matching heading counts. An
/// unterminated block runs to the end of the document. Returns `None` when
/// there is no such heading, no block after it, or the block is blank.
pub fn extract_section(content: &str, name: &str) -> Option<String> {
    let target = name.trim().to_lowercase();
    let mut lines = content.split('\n');

    lines.by_ref().find(|line| is_heading(line, &target))?;
    lines.by_ref().find(|line| line.trim().starts_with(FENCE))?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.trim().starts_with(FENCE))
        .collect();
    let text = body.join("\n");
    let text = text.trim();

    (!text.is_empty()).then(|| text.to_owned())
}

fn is_heading(line: &str, target: &str) -> bool {
    let line = line.trim();
    line.starts_with('#') && line.trim_start_matches('#').trim().to_lowercase() == target
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
Some intro text.

# Source file
```c
if (cond) {
    doWork();
}
```

## Match:
Match the opening brace.
```
if (cond) {>>>
```

### patch
```
log();
```
";

    #[test]
    fn test_extracts_sections() {
        assert_eq!(
            extract_section(DOC, "Source file").as_deref(),
            Some("if (cond) {\n    doWork();\n}")
        );
        assert_eq!(extract_section(DOC, "match:").as_deref(), Some("if (cond) {>>>"));
        assert_eq!(extract_section(DOC, "  PATCH ").as_deref(), Some("log();"));
    }

    #[test]
    fn test_missing_heading() {
        assert_eq!(extract_section(DOC, "nope"), None);
    }

    #[test]
    fn test_heading_without_block() {
        assert_eq!(extract_section("# patch\njust prose\n", "patch"), None);
    }

    #[test]
    fn test_blank_block_is_absent() {
        assert_eq!(extract_section("# patch\n```\n   \n\n```\n", "patch"), None);
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let doc = "# patch\n```\nline one\nline two\n";
        assert_eq!(extract_section(doc, "patch").as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_only_first_heading_counts() {
        let doc = "# patch\n```\nfirst\n```\n# patch\n```\nsecond\n```\n";
        assert_eq!(extract_section(doc, "patch").as_deref(), Some("first"));
    }

    #[test]
    fn test_heading_text_must_match_exactly() {
        let doc = "# patch notes\n```\nno\n```\n# patch\n```\nyes\n```\n";
        assert_eq!(extract_section(doc, "patch").as_deref(), Some("yes"));
    }

    #[test]
    fn test_parse_document() {
        let doc = PatchDocument::parse(DOC).expect("parse");
        assert_eq!(doc.pattern, "if (cond) {>>>");
        assert_eq!(doc.patch, "log();");

        let outcome = doc.apply();
        assert!(outcome.changed());
        assert_eq!(outcome.text(), "if (cond) {\n    log();\n    doWork();\n}");
    }

    #[test]
    fn test_parse_missing_section() {
        let err = PatchDocument::parse("# Source file\n```\nx\n```\n").expect_err("missing");
        assert!(matches!(
            err,
            MarkpatchError::MissingSection { section: MATCH_SECTION }
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = PatchDocument::load(&dir.path().join("absent.md")).expect_err("missing");
        assert!(matches!(err, MarkpatchError::FileNotFound { .. }));
    }
}
