//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Defaults reproduce the standard
//! output: fixed font-size heading thresholds, bordered-table detection,
//! image markers, and a 3-page / 100-character scan check.

use crate::error::Pdf2MdError;
use crate::pipeline::heading::{FontSizeThresholds, HeadingPolicy};
use crate::pipeline::scan::{DEFAULT_MIN_CHARS, DEFAULT_SAMPLE_PAGES};
use crate::pipeline::table::TableSettings;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Directory scanned for PDFs when the CLI is run without arguments.
pub const DEFAULT_SOURCE_DIR: &str = "source";

/// Root under which `<name>/<name>.md` outputs are written by default.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2md_text::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .detect_tables(false)
///     .scan_sample_pages(5)
///     .build()
///     .unwrap();
/// assert!(!config.detect_tables);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Font size → heading level mapping. Default: [`FontSizeThresholds`].
    pub heading_policy: Arc<dyn HeadingPolicy>,

    /// Leading pages sampled by the scan check. Default: 3.
    pub scan_sample_pages: usize,

    /// Trimmed characters below which the sample counts as scanned. Default: 100.
    pub scan_min_chars: usize,

    /// Run the geometry pass and render detected tables. Default: true.
    pub detect_tables: bool,

    /// Emit `*[N image(s) on this page]*` markers. Default: true.
    pub mark_images: bool,

    /// Lattice detection tolerances.
    pub table_settings: TableSettings,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            password: None,
            heading_policy: Arc::new(FontSizeThresholds::default()),
            scan_sample_pages: DEFAULT_SAMPLE_PAGES,
            scan_min_chars: DEFAULT_MIN_CHARS,
            detect_tables: true,
            mark_images: true,
            table_settings: TableSettings::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("heading_policy", &"<dyn HeadingPolicy>")
            .field("scan_sample_pages", &self.scan_sample_pages)
            .field("scan_min_chars", &self.scan_min_chars)
            .field("detect_tables", &self.detect_tables)
            .field("mark_images", &self.mark_images)
            .field("table_settings", &self.table_settings)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn heading_policy(mut self, policy: Arc<dyn HeadingPolicy>) -> Self {
        self.config.heading_policy = policy;
        self
    }

    pub fn scan_sample_pages(mut self, n: usize) -> Self {
        self.config.scan_sample_pages = n;
        self
    }

    pub fn scan_min_chars(mut self, n: usize) -> Self {
        self.config.scan_min_chars = n;
        self
    }

    pub fn detect_tables(mut self, v: bool) -> Self {
        self.config.detect_tables = v;
        self
    }

    pub fn mark_images(mut self, v: bool) -> Self {
        self.config.mark_images = v;
        self
    }

    pub fn table_settings(mut self, settings: TableSettings) -> Self {
        self.config.table_settings = settings;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;
        if c.scan_sample_pages == 0 {
            return Err(Pdf2MdError::InvalidConfig(
                "Scan sample must cover at least 1 page".into(),
            ));
        }
        let t = &c.table_settings;
        let tolerances = [
            ("snap_tolerance", t.snap_tolerance),
            ("join_tolerance", t.join_tolerance),
            ("edge_min_length", t.edge_min_length),
            ("intersection_tolerance", t.intersection_tolerance),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(Pdf2MdError::InvalidConfig(format!(
                    "Table {name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(self.config)
    }
}
