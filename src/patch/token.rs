//! Pattern tokenizer.
//!
//! A match pattern is literal text interleaved with three 3-character
//! triggers, checked in this order at every position:
//!
//! | Trigger | Token                 |
//! |---------|-----------------------|
//! | `...`   | [`Token::Wildcard`]    |
//! | `>>>`   | [`Token::MarkerStart`] |
//! | `<<<`   | [`Token::MarkerEnd`]   |
//!
//! Text between triggers is trimmed and dropped when empty.

use std::fmt;

const WILDCARD: &str = "...";
const MARKER_START: &str = ">>>";
const MARKER_END: &str = "<<<";

/// One element of a parsed match pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal substring that must appear in the source.
    Text(String),
    /// Unbounded skip until the next token is satisfied.
    Wildcard,
    /// `>>>`: the edit begins here.
    MarkerStart,
    /// `<<<`: closes a `>>>text<<<` replace span.
    MarkerEnd,
}

impl Token {
    /// The literal value of a [`Token::Text`], `None` for control tokens.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => write!(f, "TEXT {value:?}"),
            Self::Wildcard => f.write_str("WILDCARD"),
            Self::MarkerStart => f.write_str("MARKER"),
            Self::MarkerEnd => f.write_str("END_REPLACE"),
        }
    }
}

/// Ordered token sequence produced by [`tokenize`].
///
/// A literal never spans lines in the source, so text containing a line
/// break can only fail to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPattern {
    tokens: Vec<Token>,
}

impl ParsedPattern {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Index of the first `>>>` marker.
    pub fn insert_pos(&self) -> Option<usize> {
        self.tokens.iter().position(|t| *t == Token::MarkerStart)
    }
}

/// Split a raw match pattern into tokens in a single left-to-right pass.
///
/// Never fails: an empty or trigger-free pattern yields zero or one
/// [`Token::Text`].
pub fn tokenize(pattern: &str) -> ParsedPattern {
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < pattern.len() {
        let rest = &pattern[i..];
        let trigger = if rest.starts_with(WILDCARD) {
            Some(Token::Wildcard)
        } else if rest.starts_with(MARKER_START) {
            Some(Token::MarkerStart)
        } else if rest.starts_with(MARKER_END) {
            Some(Token::MarkerEnd)
        } else {
            None
        };

        match trigger {
            Some(token) => {
                flush_text(&mut tokens, &pattern[text_start..i]);
                tokens.push(token);
                // Every trigger is three ASCII bytes.
                i += 3;
                text_start = i;
            }
            None => {
                i += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    flush_text(&mut tokens, &pattern[text_start..]);

    ParsedPattern { tokens }
}

fn flush_text(tokens: &mut Vec<Token>, buffer: &str) {
    let text = buffer.trim();
    if !text.is_empty() {
        tokens.push(Token::Text(text.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_owned())
    }

    #[test]
    fn test_trigger_adjacency() {
        let parsed = tokenize("a...>>>b<<<c");
        assert_eq!(
            parsed.tokens(),
            &[
                text("a"),
                Token::Wildcard,
                Token::MarkerStart,
                text("b"),
                Token::MarkerEnd,
                text("c"),
            ]
        );
    }

    #[test]
    fn test_whitespace_only_text_dropped() {
        let parsed = tokenize("  ...   >>>  ");
        assert_eq!(parsed.tokens(), &[Token::Wildcard, Token::MarkerStart]);
    }

    #[test]
    fn test_text_is_trimmed() {
        let parsed = tokenize("  let x =  >>> OLD <<<");
        assert_eq!(
            parsed.tokens(),
            &[text("let x ="), Token::MarkerStart, text("OLD"), Token::MarkerEnd]
        );
    }

    #[test]
    fn test_empty_and_plain_patterns() {
        assert!(tokenize("").tokens().is_empty());
        assert!(tokenize("   \n ").tokens().is_empty());
        assert_eq!(tokenize("hello").tokens(), &[text("hello")]);
    }

    #[test]
    fn test_wildcard_takes_priority_over_longer_runs() {
        // Four dots: wildcard first, the leftover dot is text.
        assert_eq!(tokenize("....").tokens(), &[Token::Wildcard, text(".")]);
        assert_eq!(tokenize(">>>>").tokens(), &[Token::MarkerStart, text(">")]);
    }

    #[test]
    fn test_partial_trigger_is_text() {
        assert_eq!(tokenize("a..b>>c").tokens(), &[text("a..b>>c")]);
    }

    #[test]
    fn test_multiline_text_token() {
        let parsed = tokenize("fn main() {\n    let a = 1;\n>>>");
        assert_eq!(
            parsed.tokens(),
            &[text("fn main() {\n    let a = 1;"), Token::MarkerStart]
        );
    }

    #[test]
    fn test_non_ascii_text() {
        let parsed = tokenize("привет...>>>мир");
        assert_eq!(
            parsed.tokens(),
            &[text("привет"), Token::Wildcard, Token::MarkerStart, text("мир")]
        );
    }

    #[test]
    fn test_insert_pos() {
        assert_eq!(tokenize("a ... >>> b").insert_pos(), Some(2));
        assert_eq!(tokenize("a <<< b").insert_pos(), None);
        assert_eq!(tokenize(">>>x>>>").insert_pos(), Some(0));
    }
}
