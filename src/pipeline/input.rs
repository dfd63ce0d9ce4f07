//! Input resolution: validate a user-supplied PDF path and discover batch
//! inputs.
//!
//! Validation happens before any document is opened so callers get a
//! meaningful error (missing file, wrong extension, not a PDF) rather than an
//! opaque pdfium failure. The `%PDF` magic check mirrors what the backend
//! would reject anyway, just earlier and with a clearer message.

use crate::error::Pdf2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// True when `path` ends in `.pdf`, ignoring ASCII case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Check that `path` names a readable PDF file.
///
/// Order of checks: existence, extension, read permission, magic bytes.
pub fn validate_input(path: &Path) -> Result<(), Pdf2MdError> {
    if !path.is_file() {
        return Err(Pdf2MdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !has_pdf_extension(path) {
        return Err(Pdf2MdError::WrongExtension {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2MdError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2MdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

/// List the PDF files directly inside `dir`, sorted by file name.
///
/// Not recursive. Subdirectories are skipped even if their name ends in
/// `.pdf`.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Pdf2MdError> {
    let entries = std::fs::read_dir(dir).map_err(|e| Pdf2MdError::DirectoryAccessFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Pdf2MdError::DirectoryAccessFailed {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && has_pdf_extension(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} PDF file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// The input's base name without extension.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// The input's file name with extension.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `<output_root>/<base>/<base>.md` for `input`.
pub fn output_path_for(output_root: &Path, input: &Path) -> PathBuf {
    let base = base_name(input);
    output_root.join(&base).join(format!("{base}.md"))
}
