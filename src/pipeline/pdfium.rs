//! pdfium-backed [`DocumentBackend`].
//!
//! ## Library binding
//!
//! pdfium is loaded at runtime. [`bind_pdfium`] tries, in order:
//!
//! 1. `PDFIUM_LIB_PATH` (a library file, or a directory containing one)
//! 2. the directory of the running executable
//! 3. the current working directory
//! 4. the system library search path
//!
//! ## Coordinates
//!
//! pdfium reports positions bottom-up in points. Geometry handed to the table
//! detector is flipped to top-down using the page height; the text pass only
//! compares baselines with each other and keeps pdfium's axis.

use crate::error::Pdf2MdError;
use crate::pipeline::postprocess::is_invisible;
use crate::pipeline::source::{
    DocumentBackend, DocumentSource, GeometrySource, Glyph, PageGeometry, SourceInfo, TextBlock,
};
use crate::pipeline::text::LayoutBuilder;
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rectangles thinner than this (points) are treated as ruling lines.
const THIN_RECT: f32 = 1.0;

/// Bind to a pdfium library; see the module docs for the search order.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2MdError> {
    if let Ok(configured) = std::env::var("PDFIUM_LIB_PATH") {
        let path = PathBuf::from(configured);
        let library = if path.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&path)
        } else {
            path
        };
        debug!("Binding pdfium from PDFIUM_LIB_PATH: {}", library.display());
        return Pdfium::bind_to_library(&library)
            .map(Pdfium::new)
            .map_err(|e| {
                Pdf2MdError::PdfiumBindingFailed(format!("{}: {:?}", library.display(), e))
            });
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    for dir in [exe_dir, cwd].into_iter().flatten() {
        let library = Pdfium::pdfium_platform_library_name_at_path(&dir);
        if !library.is_file() {
            continue;
        }
        match Pdfium::bind_to_library(&library) {
            Ok(bindings) => {
                debug!("Bound pdfium at {}", library.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => debug!("Could not bind {}: {:?}", library.display(), e),
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| Pdf2MdError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// Production backend. Owns the library binding; documents borrow it.
///
/// The library is bound on the first `open`, so constructing a backend never
/// fails and a run that opens nothing never needs pdfium installed.
#[derive(Default)]
pub struct PdfiumBackend {
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn pdfium(&self) -> Result<&Pdfium, Pdf2MdError> {
        self.pdfium.get_or_try_init(bind_pdfium)
    }

    fn load<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<PdfDocument<'a>, Pdf2MdError> {
        self.pdfium()?
            .load_pdf_from_file(path, password)
            .map_err(|e| map_load_error(path, password, e))
    }
}

impl DocumentBackend for PdfiumBackend {
    fn open<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn DocumentSource + 'a>, Pdf2MdError> {
        let document = self.load(path, password)?;
        info!(
            "PDF loaded: {} ({} pages)",
            path.display(),
            document.pages().len()
        );
        Ok(Box::new(PdfiumDocument { document }))
    }

    fn open_geometry<'a>(
        &'a self,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Box<dyn GeometrySource + 'a>, Pdf2MdError> {
        let document = self.load(path, password)?;
        Ok(Box::new(PdfiumGeometry { document }))
    }
}

fn map_load_error(path: &Path, password: Option<&str>, e: PdfiumError) -> Pdf2MdError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        if password.is_some() {
            Pdf2MdError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            Pdf2MdError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        Pdf2MdError::CorruptPdf {
            path: path.to_path_buf(),
            detail,
        }
    }
}

fn page_at<'a>(document: &PdfDocument<'a>, index: usize) -> Result<PdfPage<'a>, Pdf2MdError> {
    let total = document.pages().len() as usize;
    let out_of_range = || Pdf2MdError::PageOutOfRange {
        page: index + 1,
        total,
    };
    if index >= total {
        return Err(out_of_range());
    }
    let index = u16::try_from(index).map_err(|_| out_of_range())?;
    document
        .pages()
        .get(index)
        .map_err(|e| Pdf2MdError::TextExtractionFailed {
            page: usize::from(index) + 1,
            detail: format!("{:?}", e),
        })
}

fn text_error(index: usize, e: PdfiumError) -> Pdf2MdError {
    Pdf2MdError::TextExtractionFailed {
        page: index + 1,
        detail: format!("{:?}", e),
    }
}

/// Text-layer pass over one open document.
struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl DocumentSource for PdfiumDocument<'_> {
    fn info(&self) -> Result<SourceInfo, Pdf2MdError> {
        let metadata = self.document.metadata();
        let tag = |kind: PdfDocumentMetadataTagType| {
            metadata
                .get(kind)
                .map(|t| t.value().trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Ok(SourceInfo {
            title: tag(PdfDocumentMetadataTagType::Title),
            author: tag(PdfDocumentMetadataTagType::Author),
            page_count: self.page_count(),
        })
    }

    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn text_blocks(&self, index: usize) -> Result<Vec<TextBlock>, Pdf2MdError> {
        let page = page_at(&self.document, index)?;
        let text = page.text().map_err(|e| text_error(index, e))?;

        let mut builder = LayoutBuilder::new();
        let mut last_size = 0.0_f32;
        for ch in text.chars().iter() {
            let Some(c) = ch.unicode_char() else {
                continue;
            };
            if c == '\r' || c == '\n' {
                builder.break_line();
                continue;
            }
            if is_invisible(c) || (c.is_control() && c != '\t') {
                continue;
            }
            // Generated characters (inserted spaces) carry no font size.
            let size = ch.scaled_font_size().value;
            let size = if size > 0.0 { size } else { last_size };
            last_size = size;
            let baseline = ch.origin().ok().map(|(_, y)| y.value);
            builder.push_char(c, size, baseline);
        }
        Ok(builder.finish())
    }

    fn plain_text(&self, index: usize) -> Result<String, Pdf2MdError> {
        let page = page_at(&self.document, index)?;
        let text = page.text().map_err(|e| text_error(index, e))?;
        Ok(text.all())
    }

    fn image_count(&self, index: usize) -> Result<usize, Pdf2MdError> {
        let page = page_at(&self.document, index)?;
        let count = page
            .objects()
            .iter()
            .filter(|object| object.object_type() == PdfPageObjectType::Image)
            .count();
        Ok(count)
    }
}

/// Geometry pass over a second handle on the same file.
struct PdfiumGeometry<'a> {
    document: PdfDocument<'a>,
}

impl GeometrySource for PdfiumGeometry<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_geometry(&self, index: usize) -> Result<PageGeometry, Pdf2MdError> {
        let page = page_at(&self.document, index)?;
        let height = page.height().value;
        let mut geometry = PageGeometry::new(page.width().value, height);

        for object in page.objects().iter() {
            if object.object_type() != PdfPageObjectType::Path {
                continue;
            }
            let Ok(bounds) = object.bounds() else {
                continue;
            };
            geometry.push_rect(
                bounds.left().value,
                height - bounds.top().value,
                bounds.right().value,
                height - bounds.bottom().value,
                THIN_RECT,
            );
        }

        let text = page.text().map_err(|e| text_error(index, e))?;
        for ch in text.chars().iter() {
            let Some(c) = ch.unicode_char() else {
                continue;
            };
            if c.is_control() || is_invisible(c) {
                continue;
            }
            let Ok(rect) = ch.loose_bounds() else {
                continue;
            };
            geometry.glyphs.push(Glyph::new(
                c,
                rect.left().value,
                height - rect.top().value,
                rect.right().value,
                height - rect.bottom().value,
            ));
        }

        Ok(geometry)
    }
}
