//! Single-document conversion entry points.
//!
//! [`Converter`] runs the pipeline over any [`DocumentBackend`]; the free
//! functions ([`convert`], [`convert_to_file`], [`inspect`]) bind pdfium and
//! delegate to it.
//!
//! A conversion holds two document handles at most: the text-layer handle,
//! opened up front, and the geometry handle, opened by the table pass the
//! first time a page asks for tables. Both are owned by the conversion and
//! dropped on every exit path, so a failed page never leaks an open file.

use crate::config::ConversionConfig;
use crate::error::Pdf2MdError;
use crate::output::{ConversionOutput, ConversionReport, DocumentMetadata};
use crate::pipeline::assemble::{DocumentAssembler, PageContent};
use crate::pipeline::pdfium::PdfiumBackend;
use crate::pipeline::source::{DocumentBackend, DocumentSource};
use crate::pipeline::table::TableExtractor;
use crate::pipeline::{input, postprocess, scan, text};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Format of the `created` frontmatter field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Author written when the document does not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Runs conversions against one backend.
pub struct Converter<B> {
    backend: B,
}

impl Converter<PdfiumBackend> {
    /// A converter over pdfium, bound lazily on first open.
    pub fn with_pdfium() -> Self {
        Self::new(PdfiumBackend::new())
    }
}

impl<B: DocumentBackend> Converter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Convert one PDF to Markdown in memory.
    ///
    /// # Errors
    /// Validation errors (missing file, wrong extension, not a PDF) are
    /// returned as-is. Anything that fails once the document is open is
    /// wrapped in [`Pdf2MdError::ConversionFailed`]; no partial output is
    /// returned.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        config: &ConversionConfig,
    ) -> Result<ConversionOutput, Pdf2MdError> {
        let total_start = Instant::now();
        let path = path.as_ref();
        info!("Starting conversion: {}", path.display());

        input::validate_input(path)?;
        let wrap = |e| Pdf2MdError::during_conversion(path, e);

        // ── Step 1: Open and read metadata ──────────────────────────────────
        let source = self
            .backend
            .open(path, config.password.as_deref())
            .map_err(wrap)?;
        let metadata = load_metadata(source.as_ref(), path).map_err(wrap)?;
        let total_pages = metadata.pages;
        info!("PDF has {} pages", total_pages);

        // ── Step 2: Scan check (advisory) ───────────────────────────────────
        let likely_scanned = scan::is_likely_scanned(
            source.as_ref(),
            config.scan_sample_pages,
            config.scan_min_chars,
        );
        if likely_scanned {
            warn!(
                "'{}' appears to be a scanned PDF; OCR would be needed for better results",
                path.display()
            );
        }

        // ── Step 3: Per-page assembly ───────────────────────────────────────
        let mut tables = config.detect_tables.then(|| {
            TableExtractor::new(
                &self.backend,
                path,
                config.password.as_deref(),
                config.table_settings.clone(),
            )
        });
        let mut assembler = DocumentAssembler::new(config.heading_policy.as_ref());
        assembler.begin(&metadata).map_err(wrap)?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_start(total_pages);
        }

        for index in 0..total_pages {
            let page_num = index + 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_start(page_num, total_pages);
            }

            let blocks = source.text_blocks(index).map_err(wrap)?;
            let spans = text::extract_spans(&blocks);
            let grids = tables
                .as_mut()
                .and_then(|t| t.extract(index))
                .unwrap_or_default();
            let image_count = if config.mark_images {
                count_images(source.as_ref(), index)
            } else {
                0
            };
            debug!(
                "Page {}: {} span(s), {} table(s), {} image(s)",
                page_num,
                spans.len(),
                grids.len(),
                image_count
            );

            let lines = assembler
                .push_page(PageContent {
                    spans,
                    tables: grids,
                    image_count,
                })
                .map_err(wrap)?;

            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(page_num, total_pages, lines);
            }
        }

        // ── Step 4: Finalise ────────────────────────────────────────────────
        let (markdown, mut stats) = assembler.finish().map_err(wrap)?;
        stats.likely_scanned = likely_scanned;
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

        info!(
            "Conversion complete: {} pages, {} tables, {} images, {}ms",
            stats.total_pages, stats.tables, stats.images, stats.total_duration_ms
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_complete(total_pages);
        }

        Ok(ConversionOutput {
            markdown,
            metadata,
            stats,
        })
    }

    /// Convert a PDF and write `<output_root>/<name>/<name>.md`.
    ///
    /// Uses atomic write (temp file + rename) so a failure never leaves a
    /// partial document behind.
    pub fn convert_to_file(
        &self,
        path: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        config: &ConversionConfig,
    ) -> Result<ConversionReport, Pdf2MdError> {
        let path = path.as_ref();
        let output = self.convert(path, config)?;
        let output_path = input::output_path_for(output_root.as_ref(), path);
        write_atomic(&output_path, &output.markdown)?;
        info!("Wrote {}", output_path.display());

        Ok(ConversionReport {
            output_path,
            metadata: output.metadata,
            stats: output.stats,
        })
    }

    /// Read document metadata without converting content.
    pub fn inspect(
        &self,
        path: impl AsRef<Path>,
        password: Option<&str>,
    ) -> Result<DocumentMetadata, Pdf2MdError> {
        let path = path.as_ref();
        input::validate_input(path)?;
        let wrap = |e| Pdf2MdError::during_conversion(path, e);
        let source = self.backend.open(path, password).map_err(wrap)?;
        load_metadata(source.as_ref(), path).map_err(wrap)
    }
}

/// Convert a PDF file to Markdown using pdfium.
///
/// This is the primary entry point for the library.
///
/// # Example
/// ```rust,no_run
/// use pdf2md_text::{convert, ConversionConfig};
///
/// let output = convert("document.pdf", &ConversionConfig::default())?;
/// println!("{}", output.markdown);
/// eprintln!("{} tables, {} images", output.stats.tables, output.stats.images);
/// # Ok::<(), pdf2md_text::Pdf2MdError>(())
/// ```
pub fn convert(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    Converter::with_pdfium().convert(path, config)
}

/// Convert a PDF and write it under `output_root` using pdfium.
pub fn convert_to_file(
    path: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2MdError> {
    Converter::with_pdfium().convert_to_file(path, output_root, config)
}

/// Extract PDF metadata without converting content.
pub fn inspect(
    path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2MdError> {
    Converter::with_pdfium().inspect(path, password)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn load_metadata(source: &dyn DocumentSource, path: &Path) -> Result<DocumentMetadata, Pdf2MdError> {
    let info = source.info()?;
    let title = info
        .title
        .and_then(clean_field)
        .unwrap_or_else(|| input::base_name(path));
    let author = info
        .author
        .and_then(clean_field)
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    Ok(DocumentMetadata {
        title,
        author,
        pages: source.page_count(),
        created: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        source_file: input::file_name(path),
    })
}

/// Info dictionary strings often carry BOMs and zero-width padding.
fn clean_field(value: String) -> Option<String> {
    let cleaned = postprocess::remove_invisible_chars(&value);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Image count for one page; lookup failures count as zero.
fn count_images(source: &dyn DocumentSource, index: usize) -> usize {
    match source.image_count(index) {
        Ok(n) => n,
        Err(e) => {
            debug!("Image count unavailable for page {}: {}", index + 1, e);
            0
        }
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), Pdf2MdError> {
    let write_err = |e: std::io::Error| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc").join("doc.md");
        write_atomic(&target, "# hi").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# hi");

        // Overwrite in place, no temp files left behind.
        write_atomic(&target, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
        let entries = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn atomic_write_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_atomic(&blocker.join("doc.md"), "x").unwrap_err();
        assert!(matches!(err, Pdf2MdError::OutputWriteFailed { .. }));
        assert!(err.to_string().contains("doc.md"));
    }
}
