//! Flat rule segmentation of compiled CSS.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The compiler's output is expected to be fully expanded: no nesting, no
//! at-rule blocks. Under that assumption every rule is
//!
//! ```text
//! <selector list> { <declarations> }
//! ```
//!
//! with no braces inside the declaration block, and a single regex finds them
//! all. The selector part must not contain `{`, `}`, `/` or `;`, which keeps
//! comments and statements such as `@charset "UTF-8";` out of it.
//! Rules inside `@media` and friends are matched as if they were top-level.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static RULE_FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^{}/;\s][^{}/;]*\{[^{}]*\}").unwrap());

/// One flat `selector { declarations }` rule inside a CSS string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleFragment<'a> {
    text: &'a str,
    start: usize,
}

impl<'a> RuleFragment<'a> {
    /// Full fragment text, selector list through closing brace.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte range of the fragment in the CSS it was segmented from.
    pub fn span(&self) -> Range<usize> {
        self.start..self.start + self.text.len()
    }

    /// Selector list, including any whitespace before the `{`.
    pub fn selectors(&self) -> &'a str {
        match self.text.find('{') {
            Some(brace) => &self.text[..brace],
            None => self.text,
        }
    }

    /// Declaration block from `{` through `}`.
    pub fn declarations(&self) -> &'a str {
        match self.text.find('{') {
            Some(brace) => &self.text[brace..],
            None => "",
        }
    }
}

/// Split CSS into its flat rule fragments, in document order.
///
/// Returns an empty vector when nothing matches (empty stylesheet, only
/// comments or statements).
///
/// # Example
///
/// ```
/// use scoped_sass::segment;
///
/// let css = ".a {\n  color: red;\n}\n\n.b, .c {\n  margin: 0;\n}\n";
/// let fragments = segment(css);
///
/// assert_eq!(fragments.len(), 2);
/// assert_eq!(fragments[1].selectors(), ".b, .c ");
/// assert_eq!(&css[fragments[0].span()], ".a {\n  color: red;\n}");
/// ```
pub fn segment(css: &str) -> Vec<RuleFragment<'_>> {
    RULE_FRAGMENT
        .find_iter(css)
        .map(|m| RuleFragment {
            text: m.as_str(),
            start: m.start(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stylesheet() {
        assert!(segment("").is_empty());
        assert!(segment("  \n").is_empty());
        assert!(segment("/* only a comment */\n").is_empty());
    }

    #[test]
    fn test_expanded_output() {
        let css = ".btn {\n  color: red;\n}\n\nhtml, body {\n  margin: 0;\n}\n";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text(), ".btn {\n  color: red;\n}");
        assert_eq!(fragments[1].selectors(), "html, body ");
        assert_eq!(fragments[1].declarations(), "{\n  margin: 0;\n}");
    }

    #[test]
    fn test_compressed_output() {
        let css = ".a{color:red}.b,.c{color:blue}";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text(), ".a{color:red}");
        assert_eq!(fragments[1].text(), ".b,.c{color:blue}");
    }

    #[test]
    fn test_spans_reconstruct_covered_text() {
        let css = "/* header */\n.a {\n  x: 1;\n}\n.b {\n  y: 2;\n}\n";

        let fragments = segment(css);

        let mut covered = String::new();
        for fragment in &fragments {
            assert_eq!(&css[fragment.span()], fragment.text());
            covered.push_str(fragment.text());
        }
        assert_eq!(covered, ".a {\n  x: 1;\n}.b {\n  y: 2;\n}");

        // Text between fragments is untouched whitespace or comments.
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for fragment in &fragments {
            rebuilt.push_str(&css[cursor..fragment.span().start]);
            rebuilt.push_str(fragment.text());
            cursor = fragment.span().end;
        }
        rebuilt.push_str(&css[cursor..]);
        assert_eq!(rebuilt, css);
    }

    #[test]
    fn test_comment_before_rule_is_not_part_of_selector() {
        let css = "/* c */\n.btn {\n  color: red;\n}";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].selectors(), ".btn ");
    }

    #[test]
    fn test_statement_before_rule_is_not_part_of_selector() {
        let css = "@charset \"UTF-8\";\n.icon::before {\n  content: \"→\";\n}";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].selectors(), ".icon::before ");
    }

    #[test]
    fn test_slash_allowed_in_declarations() {
        let css = ".t {\n  font: 12px/1.5 serif;\n  background: url(img/a.png);\n}";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text(), css);
    }

    #[test]
    fn test_identical_rules_get_distinct_spans() {
        let css = ".a {\n  x: 1;\n}\n.a {\n  x: 1;\n}";

        let fragments = segment(css);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text(), fragments[1].text());
        assert!(fragments[0].span().end <= fragments[1].span().start);
    }
}
