//! Backend seam: what the pipeline needs from a PDF engine.
//!
//! The structure-inference stages never talk to pdfium directly. They read
//! pages through [`DocumentSource`] (text layer, image counts) and
//! [`GeometrySource`] (ruling lines and glyph boxes for table detection),
//! both obtained from a [`DocumentBackend`]. The production backend lives in
//! [`crate::pipeline::pdfium`]; tests drive the same pipeline with an
//! in-memory implementation.
//!
//! Handles are returned boxed and borrow the backend. Dropping the box closes
//! the underlying document, so every exit path of a conversion releases it.

use crate::error::Pdf2MdError;
use std::path::Path;

/// Opens documents for the two independent passes of a conversion.
pub trait DocumentBackend {
    /// Open a document for the text-layer pass.
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentSource + 'a>, Pdf2MdError>;

    /// Open the same document again for the geometry (table) pass.
    fn open_geometry<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn GeometrySource + 'a>, Pdf2MdError>;
}

/// Read access to an open document's text layer.
///
/// Page indices are 0-based throughout this trait.
pub trait DocumentSource {
    /// Document information dictionary entries and page count.
    fn info(&self) -> Result<SourceInfo, Pdf2MdError>;

    fn page_count(&self) -> usize;

    /// Structured text of one page: blocks of lines of same-size spans, in
    /// the order the text layer emits them.
    fn text_blocks(&self, index: usize) -> Result<Vec<TextBlock>, Pdf2MdError>;

    /// Unstructured text of one page, as the text layer reports it.
    fn plain_text(&self, index: usize) -> Result<String, Pdf2MdError>;

    /// Number of images placed on one page.
    fn image_count(&self, index: usize) -> Result<usize, Pdf2MdError>;
}

/// Read access to an open document's page geometry.
pub trait GeometrySource {
    fn page_count(&self) -> usize;

    fn page_geometry(&self, index: usize) -> Result<PageGeometry, Pdf2MdError>;
}

/// Raw document information as stored in the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub page_count: usize,
}

/// A run of text sharing one font size.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    pub text: String,
    pub font_size: f32,
}

impl RawSpan {
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// One source line: its spans in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub spans: Vec<RawSpan>,
}

impl TextLine {
    pub fn new(spans: Vec<RawSpan>) -> Self {
        Self { spans }
    }
}

/// A group of consecutive lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    pub fn new(lines: Vec<TextLine>) -> Self {
        Self { lines }
    }
}

/// Orientation of a ruling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A horizontal or vertical ruling segment.
///
/// Coordinates are in points with the origin at the top-left of the page and
/// `top <= bottom`. For a horizontal edge `top == bottom`; for a vertical
/// edge `x0 == x1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub orientation: Orientation,
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl Edge {
    pub fn horizontal(x0: f32, y: f32, x1: f32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            x0: x0.min(x1),
            top: y,
            x1: x0.max(x1),
            bottom: y,
        }
    }

    pub fn vertical(x: f32, top: f32, bottom: f32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            x0: x,
            top: top.min(bottom),
            x1: x,
            bottom: top.max(bottom),
        }
    }

    pub fn length(&self) -> f32 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }
}

/// One character with its box, top-left origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub text: char,
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl Glyph {
    pub fn new(text: char, x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            text,
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.top + self.bottom) / 2.0)
    }
}

/// Everything the table detector needs from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub edges: Vec<Edge>,
    pub glyphs: Vec<Glyph>,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Add the edges contributed by a drawn rectangle.
    ///
    /// A rectangle thinner than `thin` in one dimension is a ruling line and
    /// contributes one edge along its centre; any other rectangle contributes
    /// its four sides.
    pub fn push_rect(&mut self, x0: f32, top: f32, x1: f32, bottom: f32, thin: f32) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (top.min(bottom), top.max(bottom));
        let width = x1 - x0;
        let height = bottom - top;

        if height <= thin && width <= thin {
            return;
        }
        if height <= thin {
            self.edges
                .push(Edge::horizontal(x0, (top + bottom) / 2.0, x1));
        } else if width <= thin {
            self.edges.push(Edge::vertical((x0 + x1) / 2.0, top, bottom));
        } else {
            self.edges.push(Edge::horizontal(x0, top, x1));
            self.edges.push(Edge::horizontal(x0, bottom, x1));
            self.edges.push(Edge::vertical(x0, top, bottom));
            self.edges.push(Edge::vertical(x1, top, bottom));
        }
    }
}
