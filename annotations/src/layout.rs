//! Text layout engine: extracted book text to addressable fixed-width lines.
//!
//! Layout uses a fixed per-character advance rather than real text shaping.
//! The output is recomputed from source text on every load and never
//! persisted; `line_y` is the stable address used for highlight lookups.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use serde::{Deserialize, Serialize};

/// One block of extracted text, as supplied by the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

impl TextBlock {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One rendered row of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedLine {
    pub text: String,
    /// Always 0: lines are left aligned.
    pub line_x: f64,
    /// Character count times the advance.
    pub line_width: f64,
    /// Global row index, contiguous from 0 across all blocks.
    pub line_y: usize,
}

/// Lay out `blocks` into fixed-width lines.
///
/// Blocks are processed in order. A character joins the current line while
/// the line still fits `line_width_budget` and the character is not `'\n'`;
/// otherwise the line is closed and a new one opened (empty after a newline,
/// holding the overflowing character otherwise). Empty lines are dropped
/// before indices are assigned, so `line_y` has no gaps.
#[must_use]
pub fn layout(blocks: &[TextBlock], line_width_budget: f64, char_advance: f64) -> Vec<ProcessedLine> {
    let mut lines = Vec::new();
    for block in blocks {
        break_block(&block.text, line_width_budget, char_advance, &mut lines);
    }
    lines
}

/// Take at most `max_lines` lines from the front. Windowing is a rendering
/// policy applied on top of [`layout`].
#[must_use]
pub fn window(lines: &[ProcessedLine], max_lines: Option<usize>) -> &[ProcessedLine] {
    match max_lines {
        Some(n) => &lines[..n.min(lines.len())],
        None => lines,
    }
}

fn break_block(text: &str, budget: f64, advance: f64, out: &mut Vec<ProcessedLine>) {
    let mut current = String::new();
    let mut count: usize = 0;

    for ch in text.chars() {
        if ch != '\n' && fits(count + 1, budget, advance) {
            current.push(ch);
            count += 1;
            continue;
        }
        emit(&mut current, count, advance, out);
        if ch == '\n' {
            count = 0;
        } else {
            current.push(ch);
            count = 1;
        }
    }
    emit(&mut current, count, advance, out);
}

#[allow(clippy::cast_precision_loss)]
fn fits(count: usize, budget: f64, advance: f64) -> bool {
    count as f64 * advance <= budget
}

#[allow(clippy::cast_precision_loss)]
fn emit(current: &mut String, count: usize, advance: f64, out: &mut Vec<ProcessedLine>) {
    if current.is_empty() {
        return;
    }
    out.push(ProcessedLine {
        text: std::mem::take(current),
        line_x: 0.0,
        line_width: count as f64 * advance,
        line_y: out.len(),
    });
}
