//! Selector scoping.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Prepends a scope class to each selector of a rule fragment:
//!
//! ```text
//! .btn, html.dark .btn, a:hover { color: red; }
//! // scope "theme-a"
//! .theme-a .btn, html.dark .btn, .theme-a a:hover { color: red; }
//! ```
//!
//! Selectors starting with `html` are left alone since the scope class lives
//! below the root element. Only the selector list is rewritten; whitespace
//! and the declaration block are copied through unchanged.

/// Scope every selector of `fragment` with `.{scope_name} `.
///
/// An empty `scope_name` returns the fragment unchanged.
///
/// # Example
///
/// ```
/// use scoped_sass::scope_fragment;
///
/// assert_eq!(
///     scope_fragment(".btn,\nhtml .a { color: red; }", "theme-mauve"),
///     ".theme-mauve .btn,\nhtml .a { color: red; }"
/// );
/// assert_eq!(scope_fragment(".btn { x: 1; }", ""), ".btn { x: 1; }");
/// ```
pub fn scope_fragment(fragment: &str, scope_name: &str) -> String {
    if scope_name.is_empty() {
        return fragment.to_string();
    }
    let Some(brace) = fragment.find('{') else {
        return fragment.to_string();
    };
    let (selectors, block) = fragment.split_at(brace);

    let mut out = String::with_capacity(fragment.len() + (scope_name.len() + 2) * 4);
    for (i, selector) in selectors.split(',').enumerate() {
        if i > 0 {
            out.push(',');
        }
        scope_selector(&mut out, selector, scope_name);
    }
    out.push_str(block);
    out
}

/// Write one comma-separated segment, inserting the scope class after its
/// leading whitespace.
fn scope_selector(out: &mut String, selector: &str, scope_name: &str) {
    let trimmed = selector.trim_start();
    let leading = &selector[..selector.len() - trimmed.len()];

    out.push_str(leading);
    if !trimmed.is_empty() && !is_root_selector(trimmed) {
        out.push('.');
        out.push_str(scope_name);
        out.push(' ');
    }
    out.push_str(trimmed);
}

/// Case-insensitive `html` prefix check.
fn is_root_selector(selector: &str) -> bool {
    selector
        .get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope_is_identity() {
        let fragment = ".a, .b {\n  color: red;\n}";
        assert_eq!(scope_fragment(fragment, ""), fragment);
    }

    #[test]
    fn test_single_selector() {
        assert_eq!(
            scope_fragment(".btn {\n  color: red;\n}", "theme-default"),
            ".theme-default .btn {\n  color: red;\n}"
        );
    }

    #[test]
    fn test_selector_list_preserves_whitespace() {
        assert_eq!(
            scope_fragment(".a,\n.b ,  .c{x:1}", "s"),
            ".s .a,\n.s .b ,  .s .c{x:1}"
        );
    }

    #[test]
    fn test_html_selectors_are_exempt() {
        assert_eq!(
            scope_fragment("html, HTML.dark .x, .y, body {}", "s"),
            "html, HTML.dark .x, .s .y, .s body {}"
        );
    }

    #[test]
    fn test_declarations_untouched() {
        let fragment = ".a {\n  content: \"x, y\";\n  font-family: a, b;\n}";
        let scoped = scope_fragment(fragment, "s");
        assert_eq!(scoped, ".s .a {\n  content: \"x, y\";\n  font-family: a, b;\n}");
    }

    #[test]
    fn test_short_selector_not_mistaken_for_html() {
        assert_eq!(scope_fragment("a {}", "s"), ".s a {}");
        assert_eq!(scope_fragment("htm {}", "s"), ".s htm {}");
    }

    #[test]
    fn test_multibyte_selector() {
        assert_eq!(scope_fragment(".é {}", "s"), ".s .é {}");
        assert_eq!(scope_fragment("é {}", "s"), ".s é {}");
    }

    #[test]
    fn test_fragment_without_block() {
        assert_eq!(scope_fragment(".orphan", "s"), ".orphan");
    }
}
