//! End-to-end integration tests for pdf2md-text against real pdfium.
//!
//! These tests use real PDF files in `./test_cases/` and need a pdfium
//! library at runtime. They are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test e2e -- --nocapture

use pdf2md_text::{convert, convert_batch, convert_to_file, inspect, ConversionConfig};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Assert the document has the shape every conversion produces.
fn assert_markdown_structure(md: &str, pages: usize, context: &str) {
    assert!(md.starts_with("---\ntitle: "), "[{context}] missing frontmatter");
    assert!(!md.ends_with('\n'), "[{context}] trailing newline");
    assert!(!md.contains("\n\n\n"), "[{context}] double blank line");
    assert_eq!(
        md.matches("\n## Page ").count(),
        pages,
        "[{context}] one page heading per page"
    );

    let invisible = ['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'];
    for ch in invisible {
        assert!(
            !md.contains(ch),
            "[{context}] Output contains invisible char U+{:04X}",
            ch as u32
        );
    }

    // Table rows are pipe-delimited at both ends.
    for line in md.lines().filter(|l| l.starts_with("| ")) {
        assert!(line.ends_with(" |"), "[{context}] malformed row: {line:?}");
    }

    println!("[{context}] ✓  {} bytes, structure checks passed", md.len());
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_arxiv_paper() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let meta = inspect(&path, None).expect("inspect() should succeed");

    assert_eq!(meta.pages, 15, "Attention paper should have 15 pages");
    assert_eq!(meta.source_file, "attention_is_all_you_need.pdf");
    println!("Metadata: {:?}", meta);
}

#[test]
fn test_inspect_nonexistent() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }

    let result = inspect("/definitely/not/a/real/file.pdf", None);
    assert!(
        result.is_err(),
        "inspect() should return Err for nonexistent file"
    );
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn test_convert_arxiv_paper() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));

    let output = convert(&path, &ConversionConfig::default()).expect("conversion should succeed");

    assert_markdown_structure(&output.markdown, output.stats.total_pages, "arxiv");
    assert!(!output.stats.likely_scanned, "arxiv paper has a text layer");
    assert!(
        output.markdown.contains("Attention"),
        "title text should survive extraction"
    );
    assert!(
        output.markdown.lines().any(|l| l.starts_with("###")),
        "expected at least one font-size heading"
    );
}

#[test]
fn test_convert_irs_form_tables() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("irs_form_1040.pdf"));

    let output = convert(&path, &ConversionConfig::default()).expect("conversion should succeed");

    assert_markdown_structure(&output.markdown, output.stats.total_pages, "irs");
    assert!(output.stats.tables > 0, "ruled form should yield tables");
    assert!(output.markdown.contains("| --- |"));
}

#[test]
fn test_convert_to_file_layout() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));
    let out = tempfile::tempdir().unwrap();

    let report = convert_to_file(&path, out.path(), &ConversionConfig::default())
        .expect("conversion should succeed");

    let expected = out
        .path()
        .join("attention_is_all_you_need")
        .join("attention_is_all_you_need.md");
    assert_eq!(report.output_path, expected);
    let md = std::fs::read_to_string(&expected).unwrap();
    assert_markdown_structure(&md, report.stats.total_pages, "file");
}

#[test]
fn test_batch_over_test_cases() {
    let dir = e2e_skip_unless_ready!(test_cases_dir());
    let out = tempfile::tempdir().unwrap();

    let report = convert_batch(&dir, out.path(), &ConversionConfig::default())
        .expect("batch should complete");

    println!(
        "Batch: {} succeeded, {} failed, {} tables, {} images",
        report.succeeded(),
        report.failed(),
        report.total_tables(),
        report.total_images()
    );
    assert_eq!(report.failed(), 0);
    for outcome in &report.outcomes {
        assert!(outcome.is_success(), "{} failed", outcome.file_name());
    }
}
