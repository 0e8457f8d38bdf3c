//! Edit phase: decide between replace and insert, then mutate a copy of the
//! source lines.
//!
//! The caller's lines are never touched. Each function builds a fresh
//! `Vec<Cow<str>>` in which only the edited line is owned.

use std::borrow::Cow;

use tracing::debug;

use super::matcher::{find_forward, MatchCursor};
use super::token::Token;
use crate::error::PatchError;

/// What to do at the marker, decided from the tokens that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPlan<'p> {
    /// `>>>target<<<`: substitute the first `target` after the match.
    Replace { target: &'p str },
    /// Splice before `anchor`, or add a new line when there is no anchor.
    Insert { anchor: Option<&'p str> },
}

/// Classify the tokens remaining after the marker.
pub fn classify(rest: &[Token]) -> EditPlan<'_> {
    match rest {
        [Token::Text(target), Token::MarkerEnd, ..] => EditPlan::Replace {
            target: target.as_str(),
        },
        _ => EditPlan::Insert {
            anchor: rest.iter().find_map(Token::text),
        },
    }
}

/// Replace the first occurrence of `target` at or after the match position.
pub fn replace_span<'a>(
    lines: &[&'a str],
    cursor: &MatchCursor,
    target: &str,
    patch: &str,
) -> Result<Vec<Cow<'a, str>>, PatchError> {
    let (from_line, from_column) = cursor.edit_origin();
    let (line_idx, pos) = find_forward(lines, from_line, from_column, target).ok_or_else(|| {
        PatchError::ReplaceTargetMissing {
            value: target.to_owned(),
            line_index: from_line,
        }
    })?;
    debug!(line = line_idx + 1, pos, target, "replacing span");

    let line = lines[line_idx];
    let mut new_line = String::with_capacity(line.len() - target.len() + patch.len());
    new_line.push_str(&line[..pos]);
    new_line.push_str(patch);
    new_line.push_str(&line[pos + target.len()..]);

    let mut out = borrowed(lines);
    out[line_idx] = Cow::Owned(new_line);
    Ok(out)
}

/// Splice `patch` directly before the first `anchor` at or after the match line.
///
/// The anchor is searched from column 0 even on the match line.
pub fn insert_before_anchor<'a>(
    lines: &[&'a str],
    cursor: &MatchCursor,
    anchor: &str,
    patch: &str,
) -> Result<Vec<Cow<'a, str>>, PatchError> {
    let (from_line, _) = cursor.edit_origin();
    let (line_idx, column) =
        find_forward(lines, from_line, 0, anchor).ok_or_else(|| PatchError::AnchorMissing {
            value: anchor.to_owned(),
            line_index: from_line,
        })?;
    debug!(line = line_idx + 1, column, anchor, "inserting before anchor");

    let mut out = borrowed(lines);
    out[line_idx] = Cow::Owned(splice(lines[line_idx], column, patch));
    Ok(out)
}

/// Add `patch` as a new line after the match line, indented to fit.
///
/// With no prior match the new line goes on top of the source.
pub fn insert_line<'a>(lines: &[&'a str], cursor: &MatchCursor, patch: &str) -> Vec<Cow<'a, str>> {
    let mut out = borrowed(lines);

    let Some(line_idx) = cursor.insert_line else {
        let indent = lines.first().map_or("", |line| leading_whitespace(line));
        out.insert(0, Cow::Owned(format!("{indent}{}", patch.trim())));
        return out;
    };

    if line_idx >= lines.len() {
        out.push(Cow::Owned(patch.to_owned()));
        return out;
    }

    let indent = line_indent(lines, line_idx);
    debug!(line = line_idx + 1, indent, "inserting new line");
    out.insert(line_idx + 1, Cow::Owned(format!("{indent}{}", patch.trim())));
    out
}

/// Insert `patch` into `line` at byte `column`, padding with single spaces
/// where it would otherwise fuse with a neighbouring alphanumeric.
pub fn splice(line: &str, column: usize, patch: &str) -> String {
    let (head, tail) = line.split_at(column);
    let prev = head.chars().next_back();
    let next = tail.chars().next();

    let space_before = is_alnum(prev) && is_alnum(patch.chars().next());
    let space_after = is_alnum(patch.chars().next_back()) && is_alnum(next);

    let mut out = String::with_capacity(line.len() + patch.len() + 2);
    out.push_str(head);
    if space_before {
        out.push(' ');
    }
    out.push_str(patch);
    if space_after {
        out.push(' ');
    }
    out.push_str(tail);
    out
}

/// Indentation for a line inserted after `lines[line_idx]`.
///
/// A line opening a block (`{`) hands over the indentation of the line after it.
pub fn line_indent<'a>(lines: &[&'a str], line_idx: usize) -> &'a str {
    let current = lines[line_idx];
    let current_indent = leading_whitespace(current);

    if current.trim_end().ends_with('{') {
        lines
            .get(line_idx + 1)
            .copied()
            .map_or(current_indent, leading_whitespace)
    } else {
        current_indent
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn is_alnum(c: Option<char>) -> bool {
    c.is_some_and(char::is_alphanumeric)
}

fn borrowed<'a>(lines: &[&'a str]) -> Vec<Cow<'a, str>> {
    lines.iter().copied().map(Cow::Borrowed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_owned())
    }

    fn cursor_at(line: usize, column: usize) -> MatchCursor {
        MatchCursor {
            insert_line: Some(line),
            insert_column: column,
            marker_reached: true,
            ..MatchCursor::default()
        }
    }

    fn joined(lines: &[Cow<'_, str>]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_classify_replace() {
        let rest = [text("OLD"), Token::MarkerEnd, text("tail")];
        assert_eq!(classify(&rest), EditPlan::Replace { target: "OLD" });
    }

    #[test]
    fn test_classify_insert_with_anchor() {
        let rest = [Token::Wildcard, text("anchor"), Token::MarkerEnd];
        assert_eq!(classify(&rest), EditPlan::Insert { anchor: Some("anchor") });

        let rest = [text("b")];
        assert_eq!(classify(&rest), EditPlan::Insert { anchor: Some("b") });
    }

    #[test]
    fn test_classify_insert_without_anchor() {
        assert_eq!(classify(&[]), EditPlan::Insert { anchor: None });
        assert_eq!(
            classify(&[Token::Wildcard, Token::MarkerEnd]),
            EditPlan::Insert { anchor: None }
        );
    }

    #[test]
    fn test_replace_searches_after_match_column() {
        let lines = ["x = x;"];
        let out = replace_span(&lines, &cursor_at(0, 3), "x", "y").expect("replace");
        assert_eq!(joined(&out), "x = y;");
    }

    #[test]
    fn test_replace_falls_through_to_later_lines() {
        let lines = ["a = 1", "b = 1"];
        let out = replace_span(&lines, &cursor_at(0, 5), "1", "2").expect("replace");
        assert_eq!(joined(&out), "a = 1\nb = 2");
    }

    #[test]
    fn test_replace_missing() {
        let lines = ["OLD here", "nothing"];
        let err = replace_span(&lines, &cursor_at(0, 3), "OLD", "NEW").expect_err("missing");
        assert_eq!(
            err,
            PatchError::ReplaceTargetMissing {
                value: "OLD".to_owned(),
                line_index: 0,
            }
        );
    }

    #[test]
    fn test_insert_before_anchor_from_line_start() {
        // The anchor search ignores the match column.
        let lines = ["call(b, b)"];
        let out = insert_before_anchor(&lines, &cursor_at(0, 8), "b", "&").expect("insert");
        assert_eq!(joined(&out), "call(&b, b)");
    }

    #[test]
    fn test_insert_anchor_missing() {
        let lines = ["one", "two"];
        let err = insert_before_anchor(&lines, &cursor_at(1, 0), "one", "x").expect_err("missing");
        assert_eq!(
            err,
            PatchError::AnchorMissing {
                value: "one".to_owned(),
                line_index: 1,
            }
        );
    }

    #[test]
    fn test_splice_spacing() {
        assert_eq!(splice("return a+b", 9, "X"), "return a+X b");
        assert_eq!(splice("foobar", 3, "X"), "foo X bar");
        assert_eq!(splice("foo(bar)", 4, "X"), "foo(X bar)");
        assert_eq!(splice("foo(bar)", 4, "&"), "foo(&bar)");
        assert_eq!(splice("ab", 0, "X"), "X ab");
        assert_eq!(splice("ab", 2, "X"), "ab X");
        assert_eq!(splice("ab", 1, ""), "ab");
    }

    #[test]
    fn test_insert_line_after_brace_uses_next_indent() {
        let lines = ["if (cond) {", "    doWork();", "}"];
        let out = insert_line(&lines, &cursor_at(0, 11), "  log();  ");
        assert_eq!(joined(&out), "if (cond) {\n    log();\n    doWork();\n}");
    }

    #[test]
    fn test_insert_line_keeps_current_indent() {
        let lines = ["\tfirst();", "second();"];
        let out = insert_line(&lines, &cursor_at(0, 7), "middle();");
        assert_eq!(joined(&out), "\tfirst();\n\tmiddle();\nsecond();");
    }

    #[test]
    fn test_insert_line_brace_on_last_line() {
        let lines = ["  fn f() {"];
        let out = insert_line(&lines, &cursor_at(0, 10), "body();");
        assert_eq!(joined(&out), "  fn f() {\n  body();");
    }

    #[test]
    fn test_insert_line_without_match_goes_on_top() {
        let lines = ["  a", "b"];
        let out = insert_line(&lines, &MatchCursor::default(), "top");
        assert_eq!(joined(&out), "  top\n  a\nb");
    }

    #[test]
    fn test_insert_line_past_end_appends() {
        let lines = ["a"];
        let out = insert_line(&lines, &cursor_at(3, 0), " tail ");
        assert_eq!(joined(&out), "a\n tail ");
    }
}
