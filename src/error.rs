//! Error types for the pdf2md-text library.
//!
//! A single fatal error type, [`Pdf2MdError`], covers everything that stops a
//! document from being converted: bad input, an unreadable or encrypted PDF,
//! a page whose text layer cannot be read, or an output file that cannot be
//! written.
//!
//! Secondary enrichments never produce a `Pdf2MdError` at the pipeline level.
//! Table geometry and image-count lookups that fail are downgraded to "no
//! result" where they are consumed (see [`crate::pipeline::table`] and
//! [`crate::pipeline::assemble`]), so a broken table pass can never cost the
//! caller the textual payload of a page.
//!
//! At the batch level a `Pdf2MdError` for one file is captured as a string in
//! [`crate::output::FileOutcome::Failed`] and the batch moves on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2md-text library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input path does not carry the `.pdf` extension.
    #[error("File must be a PDF (.pdf extension): '{path}'")]
    WrongExtension { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The batch source path exists but is not a directory.
    #[error("Source path '{path}' is not a directory")]
    NotADirectory { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("Failed to read PDF metadata from '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Requested page index is past the end of the document.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// The text layer of a page could not be read.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    /// Conversion of a document aborted part-way; nothing was written.
    #[error("Conversion failed for '{path}': {source}")]
    ConversionFailed {
        path: PathBuf,
        #[source]
        source: Box<Pdf2MdError>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not list or create a batch directory.
    #[error("Failed to access directory '{path}': {source}")]
    DirectoryAccessFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2MdError {
    /// Wrap an error raised while a document was open.
    ///
    /// Errors that already carry the conversion context are returned as-is so
    /// repeated wrapping never nests the message twice.
    pub fn during_conversion(path: impl Into<PathBuf>, err: Pdf2MdError) -> Self {
        match err {
            already @ Pdf2MdError::ConversionFailed { .. } => already,
            other => Pdf2MdError::ConversionFailed {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// True for errors caused by the caller's input rather than the document.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Pdf2MdError::FileNotFound { .. }
                | Pdf2MdError::PermissionDenied { .. }
                | Pdf2MdError::WrongExtension { .. }
                | Pdf2MdError::NotAPdf { .. }
                | Pdf2MdError::NotADirectory { .. }
                | Pdf2MdError::InvalidConfig(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_extension_display() {
        let e = Pdf2MdError::WrongExtension {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains(".pdf extension"), "got: {msg}");
        assert!(msg.contains("notes.txt"), "got: {msg}");
    }

    #[test]
    fn corrupt_pdf_mentions_metadata() {
        let e = Pdf2MdError::CorruptPdf {
            path: PathBuf::from("broken.pdf"),
            detail: "bad xref".into(),
        };
        assert!(e.to_string().contains("Failed to read PDF metadata"));
        assert!(e.to_string().contains("bad xref"));
    }

    #[test]
    fn conversion_failed_wraps_source() {
        let inner = Pdf2MdError::TextExtractionFailed {
            page: 3,
            detail: "no text layer".into(),
        };
        let e = Pdf2MdError::during_conversion("report.pdf", inner);
        let msg = e.to_string();
        assert!(msg.contains("report.pdf"), "got: {msg}");
        assert!(msg.contains("page 3"), "got: {msg}");
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn during_conversion_does_not_double_wrap() {
        let once = Pdf2MdError::during_conversion(
            "a.pdf",
            Pdf2MdError::Internal("boom".into()),
        );
        let twice = Pdf2MdError::during_conversion("a.pdf", once);
        let msg = twice.to_string();
        assert_eq!(msg.matches("Conversion failed").count(), 1, "got: {msg}");
    }

    #[test]
    fn validation_classification() {
        assert!(Pdf2MdError::FileNotFound {
            path: PathBuf::from("x.pdf")
        }
        .is_validation());
        assert!(Pdf2MdError::NotAPdf {
            path: PathBuf::from("x.pdf"),
            magic: *b"GIF8"
        }
        .is_validation());
        assert!(!Pdf2MdError::CorruptPdf {
            path: PathBuf::from("x.pdf"),
            detail: String::new()
        }
        .is_validation());
    }
}
