#![allow(clippy::float_cmp)]

use super::*;

fn blocks(texts: &[&str]) -> Vec<TextBlock> {
    texts.iter().map(|t| TextBlock::new(*t)).collect()
}

fn texts(lines: &[ProcessedLine]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

// =============================================================
// Scenarios
// =============================================================

#[test]
fn newline_forces_break() {
    let lines = layout(&blocks(&["Hello world\nThis is a test."]), 1200.0, 24.0);
    assert_eq!(texts(&lines), vec!["Hello world", "This is a test."]);
    assert_eq!(lines[0].line_y, 0);
    assert_eq!(lines[0].line_width, 11.0 * 24.0);
    assert_eq!(lines[1].line_y, 1);
    assert_eq!(lines[1].line_width, 15.0 * 24.0);
    assert!(lines.iter().all(|l| l.line_x == 0.0));
}

#[test]
fn overflow_carries_character_to_next_line() {
    // budget fits exactly 4 characters
    let lines = layout(&blocks(&["abcdefghij"]), 4.0 * 24.0, 24.0);
    assert_eq!(texts(&lines), vec!["abcd", "efgh", "ij"]);
    assert_eq!(lines[2].line_width, 48.0);
}

#[test]
fn character_exactly_at_budget_fits() {
    let lines = layout(&blocks(&["abc"]), 72.0, 24.0);
    assert_eq!(texts(&lines), vec!["abc"]);
}

#[test]
fn spaces_are_ordinary_characters() {
    let lines = layout(&blocks(&["ab cd"]), 48.0, 24.0);
    assert_eq!(texts(&lines), vec!["ab", " c", "d"]);
}

#[test]
fn line_index_runs_across_blocks() {
    let lines = layout(&blocks(&["one\ntwo", "three"]), 1200.0, 24.0);
    let ys: Vec<usize> = lines.iter().map(|l| l.line_y).collect();
    assert_eq!(texts(&lines), vec!["one", "two", "three"]);
    assert_eq!(ys, vec![0, 1, 2]);
}

// =============================================================
// Edge cases
// =============================================================

#[test]
fn empty_input_produces_nothing() {
    assert!(layout(&[], 1200.0, 24.0).is_empty());
    assert!(layout(&blocks(&[""]), 1200.0, 24.0).is_empty());
}

#[test]
fn newline_only_block_produces_nothing() {
    assert!(layout(&blocks(&["\n\n\n"]), 1200.0, 24.0).is_empty());
}

#[test]
fn blank_lines_are_dropped_without_gaps() {
    let lines = layout(&blocks(&["a\n\n\nb", "\n", "c\n"]), 1200.0, 24.0);
    assert_eq!(texts(&lines), vec!["a", "b", "c"]);
    let ys: Vec<usize> = lines.iter().map(|l| l.line_y).collect();
    assert_eq!(ys, vec![0, 1, 2]);
}

#[test]
fn budget_below_advance_puts_each_char_on_its_own_line() {
    let lines = layout(&blocks(&["xyz"]), 10.0, 24.0);
    assert_eq!(texts(&lines), vec!["x", "y", "z"]);
    assert!(lines.iter().all(|l| l.line_width == 24.0));
}

#[test]
fn multibyte_characters_count_once() {
    let lines = layout(&blocks(&["éàü"]), 48.0, 24.0);
    assert_eq!(texts(&lines), vec!["éà", "ü"]);
}

#[test]
fn fractional_advance_does_not_drift() {
    // 0.1 * 10 accumulated by addition would exceed 1.0
    let lines = layout(&blocks(&["0123456789X"]), 1.0, 0.1);
    assert_eq!(texts(&lines), vec!["0123456789", "X"]);
}

// =============================================================
// Properties
// =============================================================

#[test]
fn layout_is_deterministic() {
    let input = blocks(&["The quick brown fox\njumps over", "the lazy dog."]);
    let a = layout(&input, 120.0, 12.0);
    let b = layout(&input, 120.0, 12.0);
    assert_eq!(a, b);
}

#[test]
fn line_indices_are_contiguous_from_zero() {
    let input = blocks(&["lorem ipsum dolor sit amet\n\nconsectetur", "", "adipiscing elit\n"]);
    let lines = layout(&input, 96.0, 8.0);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.line_y, i);
        assert!(!line.text.is_empty());
    }
}

// =============================================================
// Windowing
// =============================================================

#[test]
fn window_caps_line_count() {
    let lines = layout(&blocks(&["a\nb\nc\nd"]), 1200.0, 24.0);
    assert_eq!(texts(window(&lines, Some(2))), vec!["a", "b"]);
    assert_eq!(window(&lines, Some(10)).len(), 4);
    assert_eq!(window(&lines, None).len(), 4);
    assert!(window(&lines, Some(0)).is_empty());
}

#[test]
fn processed_line_wire_names() {
    let lines = layout(&blocks(&["hi"]), 1200.0, 24.0);
    let json = serde_json::to_value(&lines[0]).unwrap();
    assert_eq!(json, serde_json::json!({"text": "hi", "lineX": 0.0, "lineWidth": 48.0, "lineY": 0}));
}
