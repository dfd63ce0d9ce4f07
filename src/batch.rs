//! Batch conversion: every PDF in a directory, one at a time.
//!
//! Files are converted serially in file-name order. A failure is recorded
//! against its file and the batch moves on; the returned [`BatchReport`]
//! always accounts for every file found.

use crate::config::ConversionConfig;
use crate::convert::Converter;
use crate::error::Pdf2MdError;
use crate::output::{BatchReport, FileOutcome};
use crate::pipeline::input;
use crate::pipeline::source::DocumentBackend;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

impl<B: DocumentBackend> Converter<B> {
    /// Convert every PDF directly inside `source_dir` into `output_root`.
    ///
    /// A missing `source_dir` is created and reported via
    /// [`BatchReport::created_source_dir`] with no outcomes.
    ///
    /// # Errors
    /// Only directory-level problems fail the batch: `source_dir` cannot be
    /// created or listed, or exists but is not a directory. Per-file errors
    /// land in [`FileOutcome::Failed`].
    pub fn convert_batch(
        &self,
        source_dir: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        config: &ConversionConfig,
    ) -> Result<BatchReport, Pdf2MdError> {
        let start = Instant::now();
        let source_dir = source_dir.as_ref();
        let output_root = output_root.as_ref();
        let mut report = BatchReport {
            source_dir: source_dir.to_path_buf(),
            output_dir: output_root.to_path_buf(),
            ..BatchReport::default()
        };

        if !source_dir.exists() {
            std::fs::create_dir_all(source_dir).map_err(|e| {
                Pdf2MdError::DirectoryAccessFailed {
                    path: source_dir.to_path_buf(),
                    source: e,
                }
            })?;
            info!(
                "Created source directory '{}'; place PDF files there and run again",
                source_dir.display()
            );
            report.created_source_dir = true;
            return Ok(report);
        }
        if !source_dir.is_dir() {
            return Err(Pdf2MdError::NotADirectory {
                path: source_dir.to_path_buf(),
            });
        }

        let files = input::discover_pdfs(source_dir)?;
        if files.is_empty() {
            warn!("No PDF files found in '{}'", source_dir.display());
        } else {
            info!("Found {} PDF file(s) to convert", files.len());
        }

        for (i, path) in files.iter().enumerate() {
            let file_name = input::file_name(path);
            info!("[{}/{}] Converting {}", i + 1, files.len(), file_name);
            let outcome = match self.convert_to_file(path, output_root, config) {
                Ok(file_report) => FileOutcome::Converted {
                    file_name,
                    report: file_report,
                },
                Err(e) => {
                    if e.is_validation() {
                        warn!("Skipping {}: {}", file_name, e);
                    } else {
                        error!("Failed to convert {}: {}", file_name, e);
                    }
                    FileOutcome::Failed {
                        file_name,
                        error: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        report.total_duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Batch complete: {} succeeded, {} failed, {} tables, {} images",
            report.succeeded(),
            report.failed(),
            report.total_tables(),
            report.total_images()
        );
        Ok(report)
    }
}

/// Convert every PDF in `source_dir` using pdfium.
///
/// pdfium is bound once for the whole batch, when the first file is opened.
pub fn convert_batch(
    source_dir: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, Pdf2MdError> {
    Converter::with_pdfium().convert_batch(source_dir, output_root, config)
}
