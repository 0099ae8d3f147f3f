//! Source position tracking, shared by the parser, the analyzer, and every
//! diagnostic type in [`crate::error`].

use nom_locate::LocatedSpan;
use std::fmt::{self, Write};

/// The span type handed out by the parser combinators in [`crate::parse`].
/// Carries no extra data beyond position, since [`Span`] is what downstream
/// code actually holds onto.
pub type RawSpan<'a> = LocatedSpan<&'a str>;

/// A lightweight, `Copy`able region of source code. AST nodes, symbols, and
/// diagnostics all carry one of these instead of borrowing the source text,
/// so the rest of the compiler doesn't need a source-code lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: usize,
    pub end_line: u32,
    pub end_col: usize,
    pub start_offset: usize,
    pub len: usize,
}

impl Span {
    /// Build a [`Span`] from the consumed slice of a `nom` parse.
    pub fn from_raw_span(raw: &RawSpan<'_>) -> Self {
        let start_line = raw.location_line();
        let start_col = raw.get_utf8_column();
        let text = *raw.fragment();
        let (end_line, end_col) = advance(start_line, start_col, text);
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
            start_offset: raw.location_offset(),
            len: text.len(),
        }
    }

    /// A zero-length span used for synthetic nodes injected by the
    /// preprocessor, which have no literal source text of their own.
    pub fn synthetic() -> Self {
        Self {
            start_line: 0,
            start_col: 0,
            end_line: 0,
            end_col: 0,
            start_offset: 0,
            len: 0,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.start_line == 0
    }

    /// Slice the original source text that this span covers. Returns an
    /// empty string for synthetic spans, or if the span has fallen out of
    /// bounds of `src` (which should not happen for a well-formed pipeline).
    pub fn get_source_slice<'a>(&self, src: &'a str) -> &'a str {
        src.get(self.start_offset..self.start_offset + self.len)
            .unwrap_or("")
    }
}

fn advance(start_line: u32, start_col: usize, text: &str) -> (u32, usize) {
    let mut line = start_line;
    let mut col = start_col;
    for c in text.chars() {
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} to {}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// Render a `^^^^` highlight under the offending source slice. Shared by all
/// [`crate::error::SourceError`] implementors when formatted with `{:#}`.
pub fn fmt_src_highlights(
    f: &mut fmt::Formatter<'_>,
    span: &Span,
    source: &str,
) -> fmt::Result {
    if span.is_synthetic() {
        return Ok(());
    }
    let line = source.lines().nth((span.start_line - 1) as usize).unwrap_or("");
    writeln!(f)?;
    writeln!(f, "{}", line)?;
    let mut marker = String::new();
    for _ in 1..span.start_col {
        marker.push(' ');
    }
    let width = if span.end_line == span.start_line {
        (span.end_col.saturating_sub(span.start_col)).max(1)
    } else {
        1
    };
    for _ in 0..width {
        marker.write_char('^').ok();
    }
    write!(f, "{}", marker)
}
