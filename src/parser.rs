//! CommonMark spec parser.
//!
//! This module splits a specification document into the examples embedded in
//! it. Each example is fenced by an opening marker line and a closing marker
//! line, with a single `.` line dividing the markdown input from the expected
//! HTML output. Headings seen between examples name the section the following
//! examples belong to.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Line that opens an example block.
pub const EXAMPLE_OPEN: &str = "```````````````````````````````` example";

/// Line that closes an example block.
pub const EXAMPLE_CLOSE: &str = "````````````````````````````````";

/// Line separating the markdown input from the expected HTML.
pub const EXAMPLE_SEPARATOR: &str = ".";

/// Glyph the spec uses to make tab characters visible (U+2192, `→`).
pub const TAB_PLACEHOLDER: char = '\u{2192}';

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+ (.*)$").unwrap());

/// One example extracted from a spec document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecExample {
    /// Markdown input, with tab placeholders restored.
    pub markdown: String,
    /// Expected HTML output, with tab placeholders restored.
    pub html: String,
    /// Sequence number among closed examples (1-indexed).
    pub example: u32,
    /// Line of the opening marker (1-indexed).
    pub start_line: usize,
    /// Line of the closing marker (1-indexed).
    pub end_line: usize,
    /// Text of the nearest heading before the opening marker.
    pub section: String,
    /// Text between the previous example and this one.
    pub preamble: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ParseState {
    #[default]
    OutsideExample,
    Markdown,
    Html,
}

/// Line-at-a-time parser over a single spec document.
///
/// Use [`parse`] for whole documents. The incremental interface exists so
/// callers that already iterate lines can feed them directly; a parser value
/// carries no state beyond the document it was fed.
#[derive(Debug, Default)]
pub struct SpecParser<'a> {
    state: ParseState,
    section: &'a str,
    preamble: Vec<&'a str>,
    markdown: Vec<&'a str>,
    html: Vec<&'a str>,
    current: SpecExample,
    count: u32,
    examples: Vec<SpecExample>,
}

impl<'a> SpecParser<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line. `index` is the zero-based position of the line in
    /// the document.
    pub fn push_line(&mut self, index: usize, line: &'a str) {
        let line_number = index + 1;

        match self.state {
            ParseState::OutsideExample => {
                if line == EXAMPLE_OPEN {
                    let mut preamble = self.preamble.join("\n");
                    preamble.push('\n');
                    self.preamble.clear();

                    self.current = SpecExample {
                        preamble,
                        start_line: line_number,
                        section: self.section.to_string(),
                        ..SpecExample::default()
                    };
                    self.state = ParseState::Markdown;
                } else {
                    if let Some(heading) = heading_text(line) {
                        self.section = heading;
                    }
                    self.preamble.push(line);
                }
            }
            ParseState::Markdown => {
                if line == EXAMPLE_SEPARATOR {
                    self.current.markdown = restore_tabs(&join_lines(&self.markdown));
                    self.markdown.clear();
                    self.html.clear();
                    self.state = ParseState::Html;
                } else {
                    self.markdown.push(line);
                }
            }
            ParseState::Html => {
                if line == EXAMPLE_CLOSE {
                    self.current.html = restore_tabs(&join_lines(&self.html));
                    self.html.clear();

                    self.count += 1;
                    self.current.example = self.count;
                    self.current.end_line = line_number;

                    let example = std::mem::take(&mut self.current);
                    tracing::trace!(
                        example = example.example,
                        section = %example.section,
                        start_line = example.start_line,
                        end_line = example.end_line,
                        "closed example"
                    );
                    self.examples.push(example);
                    self.state = ParseState::OutsideExample;
                } else {
                    self.html.push(line);
                }
            }
        }
    }

    /// Finish parsing and return the closed examples. An example that was
    /// opened but never closed is dropped.
    pub fn finish(self) -> Vec<SpecExample> {
        if self.state != ParseState::OutsideExample {
            tracing::debug!(
                start_line = self.current.start_line,
                "discarding unterminated example at end of input"
            );
        }
        self.examples
    }
}

/// Parse a whole spec document into its examples, in document order.
pub fn parse(text: &str) -> Vec<SpecExample> {
    let mut parser = SpecParser::new();
    for (index, line) in text.split('\n').enumerate() {
        parser.push_line(index, line);
    }
    let examples = parser.finish();
    tracing::debug!(examples = examples.len(), "parsed spec document");
    examples
}

/// Replace every tab placeholder glyph with a literal tab.
pub fn restore_tabs(text: &str) -> String {
    text.replace(TAB_PLACEHOLDER, "\t")
}

/// Heading text of an ATX-style heading line, if the line is one.
fn heading_text(line: &str) -> Option<&str> {
    HEADING_RE
        .captures(line.trim_start())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn join_lines(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
