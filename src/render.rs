//! Reference rendering and HTML normalization.
//!
//! Examples are rendered with pulldown-cmark so the tool can check a spec
//! against a known-good CommonMark implementation, or use that rendering as
//! the expected output of generated tests. Both sides of any comparison go
//! through [`normalize_html`] first.

use pulldown_cmark::{Options, Parser, html};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

use crate::parser::SpecExample;

/// Block-level elements that get a line of their own when they sit next to
/// each other.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

static INDENTED_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\n[ \t]+<").unwrap());
static PRE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre\b[^>]*>.*?</pre\s*>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]+>").unwrap());
static TAG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?([A-Za-z][A-Za-z0-9]*)").unwrap());

/// Result of checking one example against the reference renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub example: u32,
    pub section: String,
    /// Normalized HTML from the spec.
    pub expected: String,
    /// Normalized HTML from the reference renderer.
    pub actual: String,
    pub matches: bool,
}

/// Render CommonMark to HTML with the reference renderer.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::empty());
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

/// Normalize HTML for comparison.
///
/// Pretty-printer indentation between tags is removed, adjacent block-level
/// tags sharing a line are split onto separate lines, and non-empty output
/// ends with a single newline. Text content is left alone, and so is
/// everything between `<pre>` and `</pre>`, tags included.
pub fn normalize_html(html: &str) -> String {
    let dedented = dedent_outside_pre(html);
    let dedented: &str = &dedented;
    let pre_spans = pre_spans(dedented);
    let tags: Vec<_> = TAG_RE.find_iter(dedented).collect();

    let mut output = String::with_capacity(dedented.len());
    let mut last = 0;
    for (i, tag) in tags.iter().enumerate() {
        output.push_str(&dedented[last..tag.end()]);
        last = tag.end();

        if let Some(next) = tags.get(i + 1) {
            if next.start() == tag.end()
                && !in_spans(&pre_spans, tag.end())
                && breaks_after(tag.as_str())
                && is_block_tag(next.as_str())
            {
                output.push('\n');
            }
        }
    }
    output.push_str(&dedented[last..]);

    let trimmed = output.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

fn pre_spans(html: &str) -> Vec<Range<usize>> {
    PRE_BLOCK_RE.find_iter(html).map(|m| m.range()).collect()
}

fn in_spans(spans: &[Range<usize>], offset: usize) -> bool {
    spans.iter().any(|span| span.contains(&offset))
}

/// Remove indentation before tags, except inside `<pre>` blocks.
fn dedent_outside_pre(html: &str) -> Cow<'_, str> {
    let spans = pre_spans(html);
    INDENTED_TAG_RE.replace_all(html, |caps: &regex::Captures<'_>| {
        let found = caps.get_match();
        // Offset of the first indentation character, just past `>\n`.
        if in_spans(&spans, found.start() + 2) {
            found.as_str().to_string()
        } else {
            ">\n<".to_string()
        }
    })
}

/// Render an example's markdown and compare it with its expected HTML.
pub fn compare(example: &SpecExample) -> Comparison {
    let expected = normalize_html(&example.html);
    let actual = normalize_html(&render_markdown(&example.markdown));
    let matches = expected == actual;

    if !matches {
        tracing::debug!(
            example = example.example,
            section = %example.section,
            "reference renderer disagrees"
        );
    }

    Comparison {
        example: example.example,
        section: example.section.clone(),
        expected,
        actual,
        matches,
    }
}

fn tag_name(tag: &str) -> Option<String> {
    TAG_NAME_RE
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn is_block_tag(tag: &str) -> bool {
    tag_name(tag).is_some_and(|name| BLOCK_ELEMENTS.contains(&name.as_str()))
}

/// Whether a newline may follow this tag. An opening `<pre>` never gets one,
/// since that would change the preformatted content.
fn breaks_after(tag: &str) -> bool {
    let opens_pre = !tag.starts_with("</") && tag_name(tag).as_deref() == Some("pre");
    is_block_tag(tag) && !opens_pre
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(markdown: &str, html: &str) -> SpecExample {
        SpecExample {
            markdown: markdown.to_string(),
            html: html.to_string(),
            example: 7,
            section: "Emphasis".to_string(),
            ..SpecExample::default()
        }
    }

    #[test]
    fn test_render_simple_paragraph() {
        assert_eq!(render_markdown("*foo*\n"), "<p><em>foo</em></p>\n");
    }

    #[test]
    fn test_normalize_strips_pretty_print_indentation() {
        let html = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";
        assert_eq!(normalize_html(html), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_normalize_splits_adjacent_block_tags() {
        assert_eq!(normalize_html("<p>a</p><p>b</p>"), "<p>a</p>\n<p>b</p>\n");
        assert_eq!(
            normalize_html("<blockquote><p>a</p></blockquote>"),
            "<blockquote>\n<p>a</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_normalize_keeps_inline_tags_together() {
        let html = "<p><img src=\"a.png\" alt=\"a\" /><em>b</em></p>\n";
        assert_eq!(normalize_html(html), html);
    }

    #[test]
    fn test_normalize_leaves_pre_content_alone() {
        let html = "<pre><code>  x\n    <b>\n</code></pre>\n";
        assert_eq!(normalize_html(html), html);
    }

    #[test]
    fn test_normalize_keeps_raw_pre_indentation() {
        let markdown = "<pre>\n<b>x</b>\n    <i>y</i>\n</pre>\n";
        let rendered = render_markdown(markdown);
        assert_eq!(rendered, markdown);
        assert_eq!(normalize_html(&rendered), rendered);
    }

    #[test]
    fn test_normalize_dedents_around_pre_block() {
        let html = "<div>\n  <pre>\n  <i>y</i><p>z</p>\n</pre>\n  <p>after</p>\n</div>";
        assert_eq!(
            normalize_html(html),
            "<div>\n<pre>\n  <i>y</i><p>z</p>\n</pre>\n<p>after</p>\n</div>\n"
        );
    }

    #[test]
    fn test_normalize_trailing_newlines() {
        assert_eq!(normalize_html("<hr />"), "<hr />\n");
        assert_eq!(normalize_html("<hr />\n\n\n"), "<hr />\n");
        assert_eq!(normalize_html(""), "");
        assert_eq!(normalize_html("\n"), "");
    }

    #[test]
    fn test_compare_matching_example() {
        let result = compare(&example("*foo bar*\n", "<p><em>foo bar</em></p>\n"));
        assert!(result.matches);
        assert_eq!(result.example, 7);
        assert_eq!(result.section, "Emphasis");
    }

    #[test]
    fn test_compare_mismatching_example() {
        let result = compare(&example("foo\n", "<p>bar</p>\n"));
        assert!(!result.matches);
        assert_eq!(result.actual, "<p>foo</p>\n");
        assert_eq!(result.expected, "<p>bar</p>\n");
    }

    #[test]
    fn test_compare_ignores_layout_differences() {
        let result = compare(&example("# a\n\nb\n", "<h1>a</h1><p>b</p>"));
        assert!(result.matches);
    }
}
