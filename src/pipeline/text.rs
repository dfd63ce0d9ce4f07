//! Page text extraction: text layer → flat sequence of [`TextSpan`]s.
//!
//! Two halves live here:
//!
//! * [`extract_spans`] flattens the block → line → span nesting a backend
//!   reports. Each source line becomes exactly one span; the first span's font
//!   size stands for the whole line. No merging happens across lines.
//! * [`LayoutBuilder`] rebuilds that nesting from a raw character stream, for
//!   backends (pdfium) that only expose characters.

use crate::pipeline::source::{RawSpan, TextBlock, TextLine};

/// One line of page text with a representative font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
}

/// Flatten blocks of lines into one span per line.
///
/// Lines whose concatenated text is blank after trimming are dropped. The
/// text itself is kept untrimmed; renderers trim on output.
pub fn extract_spans(blocks: &[TextBlock]) -> Vec<TextSpan> {
    blocks
        .iter()
        .flat_map(|block| block.lines.iter())
        .filter_map(merge_line)
        .collect()
}

fn merge_line(line: &TextLine) -> Option<TextSpan> {
    let first = line.spans.first()?;
    let text: String = line.spans.iter().map(|s| s.text.as_str()).collect();
    if text.trim().is_empty() {
        return None;
    }
    Some(TextSpan {
        text,
        font_size: first.font_size,
    })
}

// ── Layout reconstruction ────────────────────────────────────────────────────

/// Font sizes closer than this are treated as the same span.
const SPAN_SIZE_TOLERANCE: f32 = 0.1;
/// A baseline shift beyond this fraction of the font size starts a new line.
const LINE_SHIFT_FACTOR: f32 = 0.5;
/// A vertical gap beyond this multiple of the font size starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.5;

/// Incrementally groups characters into blocks, lines and spans.
///
/// Feed characters in text-layer order with [`LayoutBuilder::push_char`] and
/// explicit breaks with [`LayoutBuilder::break_line`]; call
/// [`LayoutBuilder::finish`] to collect the result.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    blocks: Vec<TextBlock>,
    lines: Vec<TextLine>,
    spans: Vec<RawSpan>,
    current: String,
    current_size: f32,
    /// Baseline and font size of the line being built.
    line_anchor: Option<(f32, f32)>,
    /// Baseline and font size of the previous finished line.
    last_line: Option<(f32, f32)>,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one character.
    ///
    /// `baseline` is the character's baseline y in points (any consistent
    /// vertical axis). `None` means the backend could not place it, in which
    /// case it stays on the current line.
    pub fn push_char(&mut self, ch: char, font_size: f32, baseline: Option<f32>) {
        if let (Some(y), Some((anchor_y, anchor_size))) = (baseline, self.line_anchor) {
            let size = anchor_size.max(font_size).max(1.0);
            if (y - anchor_y).abs() > size * LINE_SHIFT_FACTOR {
                self.break_line();
            }
        }

        if self.line_anchor.is_none() {
            if let Some(y) = baseline {
                self.start_line(y, font_size);
            }
        }

        if !self.current.is_empty() && (font_size - self.current_size).abs() > SPAN_SIZE_TOLERANCE
        {
            self.flush_span();
        }
        if self.current.is_empty() {
            self.current_size = font_size;
        }
        self.current.push(ch);
    }

    /// End the current line (no-op on an empty line).
    pub fn break_line(&mut self) {
        self.flush_span();
        if self.spans.is_empty() {
            self.line_anchor = None;
            return;
        }
        let line = TextLine::new(std::mem::take(&mut self.spans));
        self.lines.push(line);
        self.last_line = self.line_anchor.take().or(self.last_line);
    }

    /// Finish the page and return its blocks.
    pub fn finish(mut self) -> Vec<TextBlock> {
        self.break_line();
        self.flush_block();
        self.blocks
    }

    fn start_line(&mut self, baseline: f32, font_size: f32) {
        if let Some((last_y, last_size)) = self.last_line {
            let size = last_size.max(font_size).max(1.0);
            if (baseline - last_y).abs() > size * BLOCK_GAP_FACTOR {
                self.flush_block();
            }
        }
        self.line_anchor = Some((baseline, font_size));
    }

    fn flush_span(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        self.spans.push(RawSpan::new(text, self.current_size));
    }

    fn flush_block(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let block = TextBlock::new(std::mem::take(&mut self.lines));
        self.blocks.push(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(spans: &[(&str, f32)]) -> TextLine {
        TextLine::new(spans.iter().map(|(t, s)| RawSpan::new(*t, *s)).collect())
    }

    #[test]
    fn each_line_becomes_one_span() {
        let blocks = vec![
            TextBlock::new(vec![line(&[("Title", 24.0)]), line(&[("body", 11.0)])]),
            TextBlock::new(vec![line(&[("more", 11.0)])]),
        ];
        let spans = extract_spans(&blocks);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "Title");
        assert_eq!(spans[2].text, "more");
    }

    #[test]
    fn first_span_size_represents_line() {
        let blocks = vec![TextBlock::new(vec![line(&[
            ("Big", 11.0),
            (" and small", 24.0),
        ])])];
        let spans = extract_spans(&blocks);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Big and small");
        assert_eq!(spans[0].font_size, 11.0);
    }

    #[test]
    fn blank_lines_dropped() {
        let blocks = vec![TextBlock::new(vec![
            line(&[("   ", 12.0), ("\t", 12.0)]),
            line(&[]),
            line(&[(" kept ", 12.0)]),
        ])];
        let spans = extract_spans(&blocks);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, " kept ");
    }

    #[test]
    fn no_blocks_no_spans() {
        assert!(extract_spans(&[]).is_empty());
    }

    fn push_str(b: &mut LayoutBuilder, s: &str, size: f32, baseline: f32) {
        for ch in s.chars() {
            b.push_char(ch, size, Some(baseline));
        }
    }

    #[test]
    fn builder_splits_spans_on_size_change() {
        let mut b = LayoutBuilder::new();
        push_str(&mut b, "Hello ", 12.0, 700.0);
        push_str(&mut b, "World", 18.0, 700.0);
        let blocks = b.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 1);
        let spans = &blocks[0].lines[0].spans;
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Hello ");
        assert_eq!(spans[1].font_size, 18.0);
    }

    #[test]
    fn builder_breaks_lines_explicitly_and_on_baseline_shift() {
        let mut b = LayoutBuilder::new();
        push_str(&mut b, "one", 12.0, 700.0);
        b.break_line();
        push_str(&mut b, "two", 12.0, 686.0);
        push_str(&mut b, "three", 12.0, 672.0);
        let blocks = b.finish();
        let lines: Vec<&TextLine> = blocks.iter().flat_map(|b| b.lines.iter()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].spans[0].text, "three");
    }

    #[test]
    fn builder_starts_block_on_large_gap() {
        let mut b = LayoutBuilder::new();
        push_str(&mut b, "para one", 12.0, 700.0);
        b.break_line();
        push_str(&mut b, "para two", 12.0, 600.0);
        let blocks = b.finish();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn builder_ignores_redundant_breaks() {
        let mut b = LayoutBuilder::new();
        b.break_line();
        push_str(&mut b, "x", 12.0, 700.0);
        b.break_line();
        b.break_line();
        let blocks = b.finish();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines.len(), 1);
    }

    #[test]
    fn builder_keeps_unplaced_chars_on_current_line() {
        let mut b = LayoutBuilder::new();
        push_str(&mut b, "ab", 12.0, 700.0);
        b.push_char('c', 12.0, None);
        let blocks = b.finish();
        assert_eq!(blocks[0].lines.len(), 1);
        assert_eq!(blocks[0].lines[0].spans[0].text, "abc");
    }

    #[test]
    fn builder_output_flattens_through_extractor() {
        let mut b = LayoutBuilder::new();
        push_str(&mut b, "Heading", 24.0, 750.0);
        b.break_line();
        push_str(&mut b, "   ", 11.0, 720.0);
        b.break_line();
        push_str(&mut b, "Body", 11.0, 706.0);
        let spans = extract_spans(&b.finish());
        let texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Heading", "Body"]);
    }
}
