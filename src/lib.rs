//! # pdf2md-text
//!
//! Convert text-layer PDF documents to structured Markdown.
//!
//! The converter reads the embedded text layer rather than rendering pages:
//! font sizes become heading levels, ruled tables become GitHub-flavoured
//! Markdown tables, and images are noted with a marker line. Scanned PDFs
//! (no usable text layer) are detected and flagged, not OCR'd.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate path, extension and %PDF magic
//!  ├─ 2. Open       pdfium document handle + metadata
//!  ├─ 3. Scan check sample leading pages for real text (advisory)
//!  ├─ 4. Per page   spans → headings/paragraphs, grids → tables, image marker
//!  ├─ 5. Assemble   frontmatter, page headings, separators
//!  └─ 6. Polish     collapse blank lines, trim edges
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2md_text::{convert_to_file, ConversionConfig};
//!
//! let config = ConversionConfig::default();
//! let report = convert_to_file("document.pdf", "output", &config)?;
//! println!("wrote {}", report.output_path.display());
//! # Ok::<(), pdf2md_text::Pdf2MdError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2md-text = { version = "0.1", default-features = false }
//! ```
//!
//! ## pdfium
//!
//! The library binds pdfium at runtime on the first document it opens. Set
//! `PDFIUM_LIB_PATH` to point at a specific copy; see
//! [`pipeline::pdfium::bind_pdfium`] for the search order.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::convert_batch;
pub use config::{ConversionConfig, ConversionConfigBuilder, DEFAULT_OUTPUT_DIR, DEFAULT_SOURCE_DIR};
pub use convert::{convert, convert_to_file, inspect, Converter};
pub use error::Pdf2MdError;
pub use output::{
    BatchReport, ConversionOutput, ConversionReport, ConversionStats, DocumentMetadata,
    FileOutcome,
};
pub use pipeline::heading::{FontSizeThresholds, HeadingLevel, HeadingPolicy};
pub use pipeline::pdfium::PdfiumBackend;
pub use pipeline::source::{DocumentBackend, DocumentSource, GeometrySource};
pub use pipeline::table::{Grid, TableSettings};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
