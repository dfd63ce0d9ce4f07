//! Output types returned by conversions.
//!
//! Everything here derives `Serialize` so the CLI can print a machine-readable
//! report with `--json` and library callers can log or persist results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Document-level metadata, as written to the frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Info-dictionary title, or the input's file stem when absent or blank.
    pub title: String,
    /// Info-dictionary author, or `Unknown` when absent or blank.
    pub author: String,
    pub pages: usize,
    /// Conversion timestamp, `%Y-%m-%d %H:%M:%S` local time.
    pub created: String,
    /// Input file name including extension.
    pub source_file: String,
}

/// Counters collected while a document is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    /// Tables detected (every grid returned by the table pass).
    pub tables: usize,
    /// Images reported across all pages.
    pub images: usize,
    /// Lines in the final Markdown.
    pub lines: usize,
    /// Characters in the final Markdown.
    pub characters: usize,
    /// The leading pages carry almost no text; OCR would be needed.
    pub likely_scanned: bool,
    pub total_duration_ms: u64,
}

/// A complete in-memory conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub markdown: String,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
}

/// Result of converting one document to a file on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub metadata: DocumentMetadata,
    pub stats: ConversionStats,
}

/// What happened to one file of a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted {
        file_name: String,
        report: ConversionReport,
    },
    Failed {
        file_name: String,
        error: String,
    },
}

impl FileOutcome {
    pub fn file_name(&self) -> &str {
        match self {
            FileOutcome::Converted { file_name, .. } | FileOutcome::Failed { file_name, .. } => {
                file_name
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Converted { .. })
    }
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// The source directory did not exist and was created empty.
    pub created_source_dir: bool,
    pub outcomes: Vec<FileOutcome>,
    pub total_duration_ms: u64,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Tables found across all successful conversions.
    pub fn total_tables(&self) -> usize {
        self.converted().map(|r| r.stats.tables).sum()
    }

    /// Images found across all successful conversions.
    pub fn total_images(&self) -> usize {
        self.converted().map(|r| r.stats.images).sum()
    }

    pub fn total_pages(&self) -> usize {
        self.converted().map(|r| r.stats.total_pages).sum()
    }

    fn converted(&self) -> impl Iterator<Item = &ConversionReport> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Converted { report, .. } => Some(report),
            FileOutcome::Failed { .. } => None,
        })
    }
}
