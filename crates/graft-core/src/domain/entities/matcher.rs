//! Anchor matching: locate spans in text and turn them into edits.
//!
//! A [`ReplacementMatcher`] is a tagged pair of *what* to look for
//! ([`ElementMatcher`]) and *where* to put the replacement relative to it
//! ([`Position`]). Evaluation is a single dispatch in [`ReplacementMatcher::replace`].
//!
//! # Occurrence Contract
//!
//! | Matcher | Occurrences |
//! |---------|-------------|
//! | `Text`  | every non-overlapping occurrence, leftmost first |
//! | `Regex` | first match only |
//!
//! Callers that need every regex occurrence must use a text matcher or apply
//! the replacement repeatedly.
//!
//! # Line Modes
//!
//! `line-before` and `line-after` insert whole lines using the anchor line's
//! terminator (`\n` or `\r\n`). Unless the replacement already ends with a
//! line break, each of its non-empty lines is indented like the anchor line.

use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::domain::error::DomainError;

/// Byte range of a located anchor.
pub type Span = Range<usize>;

/// What to look for.
#[derive(Debug, Clone)]
pub enum ElementMatcher {
    Text(String),
    Regex(Pattern),
}

/// Compiled regular expression compared by its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl PartialEq for ElementMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ElementMatcher {}

/// Literal anchor.
pub fn text(anchor: impl Into<String>) -> ElementMatcher {
    ElementMatcher::Text(anchor.into())
}

/// Regular-expression anchor. Fails on an invalid pattern.
pub fn regex(pattern: &str) -> Result<ElementMatcher, DomainError> {
    ElementMatcher::regex(pattern)
}

impl ElementMatcher {
    pub fn text(anchor: impl Into<String>) -> Self {
        Self::Text(anchor.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, DomainError> {
        if pattern.is_empty() {
            return Err(DomainError::BlankField {
                field: "regex pattern",
            });
        }
        Regex::new(pattern)
            .map(|re| Self::Regex(Pattern(re)))
            .map_err(|e| DomainError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Reject an empty literal anchor, which would match everywhere.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Text(anchor) if anchor.is_empty() => Err(DomainError::BlankField {
                field: "text anchor",
            }),
            _ => Ok(()),
        }
    }

    /// All spans this matcher selects in `content`.
    pub fn locate(&self, content: &str) -> Vec<Span> {
        match self {
            Self::Text(anchor) if anchor.is_empty() => Vec::new(),
            Self::Text(anchor) => content
                .match_indices(anchor.as_str())
                .map(|(start, found)| start..start + found.len())
                .collect(),
            Self::Regex(pattern) => pattern
                .0
                .find(content)
                .map(|m| vec![m.start()..m.end()])
                .unwrap_or_default(),
        }
    }

    pub fn at(self) -> ReplacementMatcher {
        ReplacementMatcher::new(self, Position::At)
    }

    pub fn just_before(self) -> ReplacementMatcher {
        ReplacementMatcher::new(self, Position::JustBefore)
    }

    pub fn just_after(self) -> ReplacementMatcher {
        ReplacementMatcher::new(self, Position::JustAfter)
    }

    pub fn line_before(self) -> ReplacementMatcher {
        ReplacementMatcher::new(self, Position::LineBefore)
    }

    pub fn line_after(self) -> ReplacementMatcher {
        ReplacementMatcher::new(self, Position::LineAfter)
    }
}

impl fmt::Display for ElementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(anchor) => write!(f, "text {:?}", anchor),
            Self::Regex(pattern) => write!(f, "regex /{}/", pattern.as_str()),
        }
    }
}

/// Where the replacement goes relative to a located span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Replace the span itself.
    At,
    /// Insert immediately before the span.
    JustBefore,
    /// Insert immediately after the span.
    JustAfter,
    /// Insert a full line above the line containing the span.
    LineBefore,
    /// Insert a full line below the line containing the span.
    LineAfter,
}

impl Position {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::At => "at",
            Self::JustBefore => "just before",
            Self::JustAfter => "just after",
            Self::LineBefore => "line before",
            Self::LineAfter => "line after",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anchor plus a positional mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementMatcher {
    element: ElementMatcher,
    position: Position,
}

/// One pending splice: replace `range` of the original content with `text`.
#[derive(Debug)]
struct Edit {
    range: Span,
    text: String,
}

impl ReplacementMatcher {
    pub fn new(element: ElementMatcher, position: Position) -> Self {
        Self { element, position }
    }

    pub fn element(&self) -> &ElementMatcher {
        &self.element
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Human-readable description used in missing-anchor errors.
    pub fn describe(&self) -> String {
        format!("{} ({})", self.element, self.position)
    }

    /// Spans the underlying anchor selects. Empty when nothing matches.
    pub fn locate(&self, content: &str) -> Vec<Span> {
        self.element.locate(content)
    }

    /// Apply `replacement` at every located span.
    ///
    /// Returns `None` when the anchor is absent; whether that is an error is
    /// decided by the replacement set, not here.
    pub fn replace(&self, content: &str, replacement: &str) -> Option<String> {
        let spans = self.locate(content);
        if spans.is_empty() {
            return None;
        }

        let mut edits: Vec<Edit> = spans
            .into_iter()
            .map(|span| self.edit_for(content, span, replacement))
            .collect();

        // Several anchors on one line share a single line insertion.
        edits.dedup_by(|next, prev| next.range == prev.range && next.range.is_empty());

        let mut result = content.to_string();
        for edit in edits.into_iter().rev() {
            result.replace_range(edit.range, &edit.text);
        }
        Some(result)
    }

    fn edit_for(&self, content: &str, span: Span, replacement: &str) -> Edit {
        match self.position {
            Position::At => Edit {
                range: span,
                text: replacement.to_string(),
            },
            Position::JustBefore => Edit {
                range: span.start..span.start,
                text: replacement.to_string(),
            },
            Position::JustAfter => Edit {
                range: span.end..span.end,
                text: replacement.to_string(),
            },
            Position::LineBefore => {
                let start = line_start(content, span.start);
                let end = content[start..].find('\n').map_or(content.len(), |i| start + i);
                let (_, newline) = line_terminator(content, end);
                let line = inserted_line(content, start, replacement, newline);
                Edit {
                    range: start..start,
                    text: format!("{line}{newline}"),
                }
            }
            Position::LineAfter => {
                let start = line_start(content, span.start);
                let (end, newline) = line_terminator(content, line_end(content, span.end));
                let line = inserted_line(content, start, replacement, newline);
                Edit {
                    range: end..end,
                    text: format!("{newline}{line}"),
                }
            }
        }
    }
}

impl From<ElementMatcher> for ReplacementMatcher {
    fn from(element: ElementMatcher) -> Self {
        element.at()
    }
}

impl fmt::Display for ReplacementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

fn line_start(content: &str, offset: usize) -> usize {
    content[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset of the `\n` ending the line that contains `offset`, or the end of
/// the content on the last line.
fn line_end(content: &str, offset: usize) -> usize {
    // A span ending right after a newline belongs to the previous line.
    let from = if offset > 0 && content.as_bytes()[offset - 1] == b'\n' {
        offset - 1
    } else {
        offset
    };
    content[from..].find('\n').map_or(content.len(), |i| from + i)
}

/// Split a line end found by [`line_end`] into the offset before its
/// terminator and the terminator itself (`\n` or `\r\n`).
///
/// The last line has no terminator of its own and takes the file's first one.
fn line_terminator(content: &str, end: usize) -> (usize, &'static str) {
    if end == content.len() {
        let newline = match content.find('\n') {
            Some(i) if i > 0 && content.as_bytes()[i - 1] == b'\r' => "\r\n",
            _ => "\n",
        };
        return (end, newline);
    }
    if end > 0 && content.as_bytes()[end - 1] == b'\r' {
        (end - 1, "\r\n")
    } else {
        (end, "\n")
    }
}

/// Text of the inserted line, without its terminating newline.
///
/// Replacement text already ending with a line break is taken verbatim.
/// Otherwise every non-empty line of it inherits the anchor line's leading
/// whitespace and its lines are joined with `newline`.
fn inserted_line(content: &str, line_start: usize, replacement: &str, newline: &str) -> String {
    if let Some(stripped) = replacement.strip_suffix('\n') {
        return stripped.strip_suffix('\r').unwrap_or(stripped).to_string();
    }
    let indent: String = content[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect();
    replacement
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join(newline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_locates_all_occurrences() {
        let spans = text("ab").locate("ab-ab-ab");
        assert_eq!(spans, vec![0..2, 3..5, 6..8]);
    }

    #[test]
    fn text_occurrences_do_not_overlap() {
        assert_eq!(text("aa").locate("aaaa"), vec![0..2, 2..4]);
    }

    #[test]
    fn regex_locates_first_only() {
        let matcher = regex(r"\d+").unwrap();
        assert_eq!(matcher.locate("a1 b22 c333"), vec![1..2]);
    }

    #[test]
    fn no_match_is_empty_not_error() {
        assert!(text("zzz").locate("abc").is_empty());
        assert!(regex("z+").unwrap().locate("abc").is_empty());
        assert_eq!(text("zzz").at().replace("abc", "x"), None);
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(matches!(
            regex("(unclosed"),
            Err(DomainError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn empty_text_anchor_fails_validation() {
        assert!(text("").validate().is_err());
        assert!(text("").locate("abc").is_empty());
    }

    #[test]
    fn at_replaces_every_literal_occurrence() {
        let out = text("foo").at().replace("foo bar foo", "baz").unwrap();
        assert_eq!(out, "baz bar baz");
    }

    #[test]
    fn at_replaces_first_regex_occurrence() {
        let out = regex("fo+").unwrap().at().replace("foo bar fooo", "X").unwrap();
        assert_eq!(out, "X bar fooo");
    }

    #[test]
    fn just_before_and_after_keep_anchor() {
        assert_eq!(
            text("B").just_before().replace("ABC", "x").unwrap(),
            "AxBC"
        );
        assert_eq!(
            text("B").just_after().replace("ABC", "x").unwrap(),
            "ABxC"
        );
    }

    #[test]
    fn line_after_inserts_below_anchor_line() {
        let out = text("B").line_after().replace("A\nB\nC", "X").unwrap();
        assert_eq!(out, "A\nB\nX\nC");
    }

    #[test]
    fn line_before_inserts_above_anchor_line() {
        let out = text("B").line_before().replace("A\nB\nC", "X").unwrap();
        assert_eq!(out, "A\nX\nB\nC");
    }

    #[test]
    fn line_after_on_last_line() {
        let out = text("C").line_after().replace("A\nC", "X").unwrap();
        assert_eq!(out, "A\nC\nX");
    }

    #[test]
    fn line_modes_inherit_indentation() {
        let content = "root:\n    anchor: 1\nend";
        let out = text("anchor").line_after().replace(content, "added: 2").unwrap();
        assert_eq!(out, "root:\n    anchor: 1\n    added: 2\nend");

        let out = text("anchor").line_before().replace(content, "added: 0").unwrap();
        assert_eq!(out, "root:\n    added: 0\n    anchor: 1\nend");
    }

    #[test]
    fn line_terminated_replacement_is_taken_verbatim() {
        let content = "a:\n  anchor\nb";
        let out = text("anchor").line_after().replace(content, "plain\n").unwrap();
        assert_eq!(out, "a:\n  anchor\nplain\nb");

        let out = text("anchor").line_before().replace(content, "plain\n").unwrap();
        assert_eq!(out, "a:\nplain\n  anchor\nb");
    }

    #[test]
    fn line_after_keeps_crlf() {
        let out = text("B").line_after().replace("A\r\nB\r\nC", "X").unwrap();
        assert_eq!(out, "A\r\nB\r\nX\r\nC");
    }

    #[test]
    fn line_before_keeps_crlf() {
        let out = text("B").line_before().replace("A\r\nB\r\nC", "X").unwrap();
        assert_eq!(out, "A\r\nX\r\nB\r\nC");
    }

    #[test]
    fn crlf_last_line_uses_file_terminator() {
        let out = text("C").line_after().replace("A\r\nC", "X").unwrap();
        assert_eq!(out, "A\r\nC\r\nX");

        let out = text("C").line_before().replace("A\r\nC", "X").unwrap();
        assert_eq!(out, "A\r\nX\r\nC");
    }

    #[test]
    fn multi_line_replacement_is_indented_per_line() {
        let content = "<deps>\n    <dep>a</dep>\n</deps>";
        let out = text("<dep>a")
            .line_after()
            .replace(content, "<dep>b</dep>\n\n<dep>c</dep>")
            .unwrap();
        assert_eq!(
            out,
            "<deps>\n    <dep>a</dep>\n    <dep>b</dep>\n\n    <dep>c</dep>\n</deps>"
        );
    }

    #[test]
    fn multi_line_replacement_follows_crlf() {
        let out = text("B").line_after().replace("  B\r\nC", "x\ny").unwrap();
        assert_eq!(out, "  B\r\n  x\r\n  y\r\nC");
    }

    #[test]
    fn two_anchors_on_one_line_insert_once() {
        let out = text("x").line_after().replace("x x\ny", "new").unwrap();
        assert_eq!(out, "x x\nnew\ny");
    }

    #[test]
    fn regex_line_after() {
        let matcher = regex(r"<dependencies>").unwrap().line_after();
        let out = matcher
            .replace("<p>\n  <dependencies>\n  </dependencies>", "<dep/>")
            .unwrap();
        assert_eq!(out, "<p>\n  <dependencies>\n  <dep/>\n  </dependencies>");
    }

    #[test]
    fn describe_names_anchor_and_mode() {
        assert_eq!(text("B").line_after().describe(), "text \"B\" (line after)");
        assert_eq!(
            regex("a+").unwrap().at().describe(),
            "regex /a+/ (at)"
        );
    }

    #[test]
    fn element_defaults_to_at() {
        let matcher: ReplacementMatcher = text("x").into();
        assert_eq!(matcher.position(), Position::At);
    }

    #[test]
    fn regex_equality_by_pattern() {
        assert_eq!(regex("a+").unwrap(), regex("a+").unwrap());
        assert_ne!(regex("a+").unwrap(), text("a+"));
    }
}
