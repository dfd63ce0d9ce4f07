//! Document assembly: metadata and per-page fragments → one Markdown document.
//!
//! The assembler is a small state machine driven by the converter:
//!
//! ```text
//! Init ──begin──▶ MetadataLoaded ──push_page──▶ Pages(n) ──push_page──▶ … ──finish──▶ Done
//! ```
//!
//! Calls out of order are internal errors. The assembler never touches the
//! document; it only receives what the extractors produced, so it can be
//! driven directly in tests.

use crate::error::Pdf2MdError;
use crate::output::{ConversionStats, DocumentMetadata};
use crate::pipeline::heading::{HeadingLevel, HeadingPolicy};
use crate::pipeline::table::Grid;
use crate::pipeline::text::TextSpan;
use crate::pipeline::{frontmatter, markdown, postprocess};
use std::fmt;

/// One line of the assembled document, before cleanup.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedLine {
    Frontmatter(String),
    PageHeading(usize),
    Heading(HeadingLevel, String),
    Paragraph(String),
    TableRow(String),
    ImageMarker(usize),
    PageSeparator,
    Blank,
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedLine::Frontmatter(line) | RenderedLine::TableRow(line) => f.write_str(line),
            RenderedLine::PageHeading(n) => write!(f, "## Page {n}"),
            RenderedLine::Heading(level, text) => f.write_str(&markdown::text_line(text, *level)),
            RenderedLine::Paragraph(text) => f.write_str(text.trim()),
            RenderedLine::ImageMarker(n) => write!(f, "*[{n} image(s) on this page]*"),
            RenderedLine::PageSeparator => f.write_str("---"),
            RenderedLine::Blank => Ok(()),
        }
    }
}

/// Everything extracted from one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub spans: Vec<TextSpan>,
    pub tables: Vec<Grid>,
    pub image_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Init,
    MetadataLoaded,
    Pages(usize),
    Done,
}

/// Accumulates rendered lines page by page.
pub struct DocumentAssembler<'p> {
    policy: &'p dyn HeadingPolicy,
    stage: Stage,
    total_pages: usize,
    lines: Vec<RenderedLine>,
    stats: ConversionStats,
}

impl<'p> DocumentAssembler<'p> {
    pub fn new(policy: &'p dyn HeadingPolicy) -> Self {
        Self {
            policy,
            stage: Stage::Init,
            total_pages: 0,
            lines: Vec::new(),
            stats: ConversionStats::default(),
        }
    }

    /// Emit the frontmatter and fix the page count.
    pub fn begin(&mut self, metadata: &DocumentMetadata) -> Result<(), Pdf2MdError> {
        if self.stage != Stage::Init {
            return Err(self.out_of_order("begin"));
        }
        self.total_pages = metadata.pages;
        self.stats.total_pages = metadata.pages;
        self.lines.extend(
            frontmatter::render(metadata)
                .into_iter()
                .map(RenderedLine::Frontmatter),
        );
        self.lines.push(RenderedLine::Blank);
        self.stage = Stage::MetadataLoaded;
        Ok(())
    }

    /// Append the next page. Returns the number of lines it contributed.
    pub fn push_page(&mut self, page: PageContent) -> Result<usize, Pdf2MdError> {
        let done = match self.stage {
            Stage::MetadataLoaded => 0,
            Stage::Pages(n) if n < self.total_pages => n,
            _ => return Err(self.out_of_order("push_page")),
        };
        let number = done + 1;
        let before = self.lines.len();

        self.lines.push(RenderedLine::PageHeading(number));
        self.lines.push(RenderedLine::Blank);

        for span in &page.spans {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }
            let level = self.policy.level(span.font_size);
            let line = if level.is_body() {
                RenderedLine::Paragraph(text.to_string())
            } else {
                RenderedLine::Heading(level, text.to_string())
            };
            self.lines.push(line);
            self.lines.push(RenderedLine::Blank);
        }

        self.stats.tables += page.tables.len();
        for grid in page.tables.iter().filter(|g| !g.is_empty()) {
            let rows = markdown::format_table(grid);
            self.lines.extend(rows.into_iter().map(RenderedLine::TableRow));
            self.lines.push(RenderedLine::Blank);
        }

        if page.image_count > 0 {
            self.stats.images += page.image_count;
            self.lines.push(RenderedLine::ImageMarker(page.image_count));
            self.lines.push(RenderedLine::Blank);
        }

        if number < self.total_pages {
            self.lines.push(RenderedLine::PageSeparator);
            self.lines.push(RenderedLine::Blank);
        }

        self.stage = Stage::Pages(number);
        Ok(self.lines.len() - before)
    }

    /// Normalise whitespace and produce the final document.
    ///
    /// Fails unless every announced page was pushed.
    pub fn finish(mut self) -> Result<(String, ConversionStats), Pdf2MdError> {
        let complete = match self.stage {
            Stage::MetadataLoaded => self.total_pages == 0,
            Stage::Pages(n) => n == self.total_pages,
            _ => false,
        };
        if !complete {
            return Err(self.out_of_order("finish"));
        }
        self.stage = Stage::Done;

        let rendered: Vec<String> = self.lines.iter().map(ToString::to_string).collect();
        let markdown = postprocess::finalize(rendered);
        self.stats.lines = markdown.lines().count();
        self.stats.characters = markdown.chars().count();
        Ok((markdown, self.stats))
    }

    fn out_of_order(&self, call: &str) -> Pdf2MdError {
        Pdf2MdError::Internal(format!(
            "assembler: {call} not allowed in stage {:?} ({} pages announced)",
            self.stage, self.total_pages
        ))
    }
}
