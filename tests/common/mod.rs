//! In-memory document backend shared by the integration tests.
//!
//! Documents are registered by file name. The file itself must still exist on
//! disk (with `%PDF` magic) because input validation runs before the backend
//! is consulted; [`write_pdf_stub`] takes care of that.

#![allow(dead_code)]

use pdf2md_text::pipeline::source::{
    Edge, Glyph, PageGeometry, RawSpan, SourceInfo, TextBlock, TextLine,
};
use pdf2md_text::{DocumentBackend, DocumentSource, GeometrySource, Pdf2MdError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Route library logs through the test harness; set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write a file that passes input validation.
pub fn write_pdf_stub(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7\n%stub\n").expect("write stub pdf");
    path
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub lines: Vec<(String, f32)>,
    /// Overrides the plain text otherwise derived from `lines`.
    pub plain_text: Option<String>,
    pub images: usize,
    pub geometry: Option<PageGeometry>,
    pub fail_text: bool,
    pub fail_images: bool,
    pub fail_geometry: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: &str, size: f32) -> Self {
        self.lines.push((text.to_string(), size));
        self
    }

    pub fn plain(mut self, text: &str) -> Self {
        self.plain_text = Some(text.to_string());
        self
    }

    pub fn images(mut self, n: usize) -> Self {
        self.images = n;
        self
    }

    pub fn geometry(mut self, g: PageGeometry) -> Self {
        self.geometry = Some(g);
        self
    }

    fn text(&self) -> String {
        self.plain_text.clone().unwrap_or_else(|| {
            self.lines
                .iter()
                .map(|(t, _)| t.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeDocument {
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Vec<FakePage>,
    pub fail_geometry_open: bool,
}

impl FakeDocument {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn by(mut self, author: &str) -> Self {
        self.author = Some(author.to_string());
        self
    }
}

/// Backend serving registered documents; unknown file names are corrupt.
#[derive(Debug, Default)]
pub struct FakeBackend {
    docs: HashMap<String, FakeDocument>,
    /// Handles currently open, text and geometry alike.
    pub open_handles: AtomicUsize,
    pub text_opens: AtomicUsize,
    pub geometry_opens: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, doc: FakeDocument) -> Self {
        self.docs.insert(file_name.to_string(), doc);
        self
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn lookup(&self, path: &Path) -> Result<&FakeDocument, Pdf2MdError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.docs.get(&name).ok_or_else(|| Pdf2MdError::CorruptPdf {
            path: path.to_path_buf(),
            detail: "unparseable xref table".into(),
        })
    }

    fn guard(&self) -> HandleGuard<'_> {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        HandleGuard {
            counter: &self.open_handles,
        }
    }
}

impl DocumentBackend for FakeBackend {
    fn open<'a>(
        &'a self,
        path: &Path,
        _password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentSource + 'a>, Pdf2MdError> {
        self.text_opens.fetch_add(1, Ordering::SeqCst);
        let doc = self.lookup(path)?;
        Ok(Box::new(FakeHandle {
            doc,
            _guard: self.guard(),
        }))
    }

    fn open_geometry<'a>(
        &'a self,
        path: &Path,
        _password: Option<&'a str>,
    ) -> Result<Box<dyn GeometrySource + 'a>, Pdf2MdError> {
        self.geometry_opens.fetch_add(1, Ordering::SeqCst);
        let doc = self.lookup(path)?;
        if doc.fail_geometry_open {
            return Err(Pdf2MdError::Internal("geometry engine unavailable".into()));
        }
        Ok(Box::new(FakeHandle {
            doc,
            _guard: self.guard(),
        }))
    }
}

struct HandleGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for HandleGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

struct FakeHandle<'a> {
    doc: &'a FakeDocument,
    _guard: HandleGuard<'a>,
}

impl FakeHandle<'_> {
    fn page(&self, index: usize) -> Result<&FakePage, Pdf2MdError> {
        self.doc
            .pages
            .get(index)
            .ok_or(Pdf2MdError::PageOutOfRange {
                page: index + 1,
                total: self.doc.pages.len(),
            })
    }
}

impl DocumentSource for FakeHandle<'_> {
    fn info(&self) -> Result<SourceInfo, Pdf2MdError> {
        Ok(SourceInfo {
            title: self.doc.title.clone(),
            author: self.doc.author.clone(),
            page_count: self.doc.pages.len(),
        })
    }

    fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    fn text_blocks(&self, index: usize) -> Result<Vec<TextBlock>, Pdf2MdError> {
        let page = self.page(index)?;
        if page.fail_text {
            return Err(Pdf2MdError::TextExtractionFailed {
                page: index + 1,
                detail: "content stream truncated".into(),
            });
        }
        let lines = page
            .lines
            .iter()
            .map(|(text, size)| TextLine::new(vec![RawSpan::new(text.clone(), *size)]))
            .collect();
        Ok(vec![TextBlock::new(lines)])
    }

    fn plain_text(&self, index: usize) -> Result<String, Pdf2MdError> {
        let page = self.page(index)?;
        if page.fail_text {
            return Err(Pdf2MdError::TextExtractionFailed {
                page: index + 1,
                detail: "content stream truncated".into(),
            });
        }
        Ok(page.text())
    }

    fn image_count(&self, index: usize) -> Result<usize, Pdf2MdError> {
        let page = self.page(index)?;
        if page.fail_images {
            return Err(Pdf2MdError::Internal("image objects unreadable".into()));
        }
        Ok(page.images)
    }
}

impl GeometrySource for FakeHandle<'_> {
    fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry, Pdf2MdError> {
        let page = self.page(index)?;
        if page.fail_geometry {
            return Err(Pdf2MdError::Internal("path objects unreadable".into()));
        }
        Ok(page
            .geometry
            .clone()
            .unwrap_or_else(|| PageGeometry::new(612.0, 792.0)))
    }
}

// ── Geometry fixtures ────────────────────────────────────────────────────────

fn word(text: &str, x0: f32, top: f32) -> Vec<Glyph> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let x = x0 + i as f32 * 6.0;
            Glyph::new(c, x, top, x + 6.0, top + 10.0)
        })
        .collect()
}

/// A ruled 2x2 table reading `A | B` over `1 | 2`.
pub fn two_by_two_table() -> PageGeometry {
    let mut g = PageGeometry::new(612.0, 792.0);
    g.edges = vec![
        Edge::horizontal(10.0, 10.0, 110.0),
        Edge::horizontal(10.0, 30.0, 110.0),
        Edge::horizontal(10.0, 50.0, 110.0),
        Edge::vertical(10.0, 10.0, 50.0),
        Edge::vertical(60.0, 10.0, 50.0),
        Edge::vertical(110.0, 10.0, 50.0),
    ];
    for (text, x, y) in [("A", 30.0, 15.0), ("B", 80.0, 15.0), ("1", 30.0, 35.0), ("2", 80.0, 35.0)] {
        g.glyphs.extend(word(text, x, y));
    }
    g
}

/// Replace the `created:` line, which carries the wall-clock time.
pub fn without_timestamp(markdown: &str) -> String {
    markdown
        .lines()
        .map(|l| {
            if l.starts_with("created: ") {
                "created: <ts>"
            } else {
                l
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text long enough to pass the scan check on its own.
pub fn long_text() -> String {
    "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(4)
}
