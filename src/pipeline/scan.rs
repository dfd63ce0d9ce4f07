//! Scan detection: does the document have a usable text layer?
//!
//! Advisory only. A positive result is logged and surfaced in
//! [`crate::output::ConversionStats::likely_scanned`]; conversion proceeds
//! either way.

use crate::pipeline::source::DocumentSource;
use tracing::debug;

/// Pages sampled from the start of the document.
pub const DEFAULT_SAMPLE_PAGES: usize = 3;

/// Minimum trimmed character count for the sample to count as real text.
pub const DEFAULT_MIN_CHARS: usize = 100;

/// True when the concatenated sample text, trimmed, is shorter than
/// `min_chars` characters.
pub fn looks_scanned<S: AsRef<str>>(texts: &[S], min_chars: usize) -> bool {
    let joined: String = texts.iter().map(|t| t.as_ref()).collect();
    joined.trim().chars().count() < min_chars
}

/// Sample the first `sample_pages` pages of `source`.
///
/// An empty document is not scanned. A page whose text cannot be read makes
/// the whole check come back negative.
pub fn is_likely_scanned(
    source: &dyn DocumentSource,
    sample_pages: usize,
    min_chars: usize,
) -> bool {
    let pages = source.page_count().min(sample_pages);
    if pages == 0 {
        return false;
    }

    let mut texts = Vec::with_capacity(pages);
    for index in 0..pages {
        match source.plain_text(index) {
            Ok(text) => texts.push(text),
            Err(e) => {
                debug!("Scan check skipped, page {} unreadable: {}", index + 1, e);
                return false;
            }
        }
    }
    looks_scanned(&texts, min_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Pdf2MdError;
    use crate::pipeline::source::{SourceInfo, TextBlock};

    struct Pages {
        texts: Vec<String>,
        fail_at: Option<usize>,
    }

    impl DocumentSource for Pages {
        fn info(&self) -> Result<SourceInfo, Pdf2MdError> {
            Ok(SourceInfo {
                page_count: self.texts.len(),
                ..SourceInfo::default()
            })
        }

        fn page_count(&self) -> usize {
            self.texts.len()
        }

        fn text_blocks(&self, _index: usize) -> Result<Vec<TextBlock>, Pdf2MdError> {
            Ok(Vec::new())
        }

        fn plain_text(&self, index: usize) -> Result<String, Pdf2MdError> {
            if self.fail_at == Some(index) {
                return Err(Pdf2MdError::TextExtractionFailed {
                    page: index + 1,
                    detail: "unreadable".into(),
                });
            }
            Ok(self.texts[index].clone())
        }

        fn image_count(&self, _index: usize) -> Result<usize, Pdf2MdError> {
            Ok(0)
        }
    }

    fn pages(texts: &[&str]) -> Pages {
        Pages {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            fail_at: None,
        }
    }

    #[test]
    fn threshold_is_strict() {
        let ninety_nine = "x".repeat(99);
        let hundred = "x".repeat(100);
        assert!(looks_scanned(&[ninety_nine.as_str()], 100));
        assert!(!looks_scanned(&[hundred.as_str()], 100));
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let padded = format!("   {}   \n\n", "x".repeat(99));
        assert!(looks_scanned(&[padded], 100));
    }

    #[test]
    fn empty_document_is_not_scanned() {
        assert!(!is_likely_scanned(&pages(&[]), 3, 100));
    }

    #[test]
    fn blank_pages_are_scanned() {
        assert!(is_likely_scanned(&pages(&["", " ", "\n"]), 3, 100));
    }

    #[test]
    fn only_leading_pages_are_sampled() {
        let long = "word ".repeat(50);
        let doc = pages(&["", "", "", long.as_str()]);
        assert!(is_likely_scanned(&doc, 3, 100));
    }

    #[test]
    fn short_document_samples_what_it_has() {
        let long = "word ".repeat(50);
        assert!(!is_likely_scanned(&pages(&[long.as_str()]), 3, 100));
    }

    #[test]
    fn text_spread_across_sample_counts() {
        let part = "y".repeat(40);
        let doc = pages(&[part.as_str(), part.as_str(), part.as_str()]);
        assert!(!is_likely_scanned(&doc, 3, 100));
    }

    #[test]
    fn unreadable_page_means_not_scanned() {
        let mut doc = pages(&["", "", ""]);
        doc.fail_at = Some(1);
        assert!(!is_likely_scanned(&doc, 3, 100));
    }
}
