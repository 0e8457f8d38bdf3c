//! Line-oriented token matcher.
//!
//! Matching is a single forward pass driven by [`MatchCursor`]. Each call to
//! [`MatchCursor::step`] consumes one token kind and either continues, stops
//! at the marker, or fails. The pass never backtracks.

use tracing::{debug, trace};

use super::token::Token;
use crate::error::PatchError;

/// Whether the matching loop should keep going after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The `>>>` marker (or a marker directly behind a wildcard) was reached.
    MarkerReached,
}

/// Position state threaded through the matching pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCursor {
    /// Next token to satisfy.
    pub token_index: usize,
    /// Line the next literal search starts on.
    pub line_index: usize,
    /// Column on `line_index` the next `Text` search resumes from.
    pub column_offset: usize,
    /// Line of the most recent successful match; `None` before any match.
    pub insert_line: Option<usize>,
    /// Column just past the most recent successful match.
    pub insert_column: usize,
    pub marker_reached: bool,
}

impl MatchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line and column the edit phase searches from.
    ///
    /// Before any literal has matched this is the top of the source.
    pub fn edit_origin(&self) -> (usize, usize) {
        self.insert_line
            .map_or((0, 0), |line| (line, self.insert_column))
    }

    /// Apply the transition for the token under the cursor.
    pub fn step(&mut self, tokens: &[Token], lines: &[&str]) -> Result<Step, PatchError> {
        let Some(token) = tokens.get(self.token_index) else {
            return Ok(Step::Continue);
        };
        match token {
            Token::Text(value) => self.match_text(value, lines),
            Token::Wildcard => self.skip_wildcard(tokens, lines),
            Token::MarkerStart => {
                self.token_index += 1;
                self.marker_reached = true;
                Ok(Step::MarkerReached)
            }
            Token::MarkerEnd => {
                self.token_index += 1;
                Ok(Step::Continue)
            }
        }
    }

    fn match_text(&mut self, value: &str, lines: &[&str]) -> Result<Step, PatchError> {
        let column = self.column_offset;
        self.seek(value, column, lines)?;
        self.token_index += 1;
        Ok(Step::Continue)
    }

    /// A wildcard directly followed by a marker stops matching on the spot,
    /// leaving the cursor on the marker so classification sees it.
    /// Otherwise it consumes the next literal wherever it first appears.
    fn skip_wildcard(&mut self, tokens: &[Token], lines: &[&str]) -> Result<Step, PatchError> {
        self.token_index += 1;
        match tokens.get(self.token_index) {
            Some(Token::MarkerStart | Token::MarkerEnd) => {
                debug!(token = self.token_index, "wildcard runs into marker, stopping search");
                self.marker_reached = true;
                Ok(Step::MarkerReached)
            }
            Some(Token::Text(value)) => {
                // Wildcard targets are searched from column 0 of every line,
                // including the line the previous match ended on.
                self.seek(value, 0, lines)?;
                self.token_index += 1;
                Ok(Step::Continue)
            }
            // Repeated wildcards collapse; a trailing wildcard ends the pass.
            Some(Token::Wildcard) | None => Ok(Step::Continue),
        }
    }

    /// Find `value` from the cursor line onward, starting at `first_column`
    /// on the cursor line and at column 0 on later lines.
    fn seek(&mut self, value: &str, first_column: usize, lines: &[&str]) -> Result<(), PatchError> {
        let start_line = self.line_index;
        let mut column = first_column;

        while let Some(line) = lines.get(self.line_index) {
            if let Some(pos) = find_at(line, value, column) {
                debug!(line = self.line_index + 1, pos, value, "matched token");
                self.insert_line = Some(self.line_index);
                self.insert_column = pos + value.len();
                self.column_offset = 0;
                return Ok(());
            }
            trace!(line = self.line_index + 1, value, "token not on line");
            self.line_index += 1;
            column = 0;
        }
        self.column_offset = 0;

        Err(PatchError::TokenMismatch {
            token_index: self.token_index,
            value: value.to_owned(),
            line_index: start_line,
        })
    }
}

/// Run the matching pass until the marker is reached.
pub fn run(tokens: &[Token], lines: &[&str]) -> Result<MatchCursor, PatchError> {
    let mut cursor = MatchCursor::new();

    while cursor.token_index < tokens.len() && cursor.line_index < lines.len() {
        if cursor.step(tokens, lines)? == Step::MarkerReached {
            break;
        }
    }

    if !cursor.marker_reached {
        return Err(PatchError::MarkerNotReached {
            token_index: cursor.token_index,
        });
    }
    Ok(cursor)
}

/// Byte position of `needle` in `line` at or after `column`.
pub(crate) fn find_at(line: &str, needle: &str, column: usize) -> Option<usize> {
    line.get(column..)?.find(needle).map(|pos| pos + column)
}

/// First `(line, column)` holding `needle`, searching `lines[from_line]` from
/// `first_column` and every later line from column 0.
pub(crate) fn find_forward<S: AsRef<str>>(
    lines: &[S],
    from_line: usize,
    first_column: usize,
    needle: &str,
) -> Option<(usize, usize)> {
    lines
        .iter()
        .enumerate()
        .skip(from_line)
        .find_map(|(idx, line)| {
            let column = if idx == from_line { first_column } else { 0 };
            find_at(line.as_ref(), needle, column).map(|pos| (idx, pos))
        })
}
