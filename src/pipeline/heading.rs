//! Heading classification: font size → heading level.
//!
//! The default policy is a fixed table of absolute thresholds. It does not
//! look at the document's own font distribution, so a document set in 13pt
//! body text will see every body line classified as a level-5 heading. The
//! thresholds are the single tunable constant set; a calibrated policy can be
//! plugged in through [`crate::config::ConversionConfigBuilder::heading_policy`]
//! without touching the assembler.

use std::fmt;

/// A heading level in `0..=5`; `0` means body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HeadingLevel(u8);

impl HeadingLevel {
    /// Body text (not a heading).
    pub const BODY: HeadingLevel = HeadingLevel(0);

    /// Deepest level a policy may return.
    pub const MAX: u8 = 5;

    /// Build a level, clamping anything above [`HeadingLevel::MAX`].
    pub fn new(level: u8) -> Self {
        HeadingLevel(level.min(Self::MAX))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_body(self) -> bool {
        self.0 == 0
    }

    /// Markdown marker for this level.
    ///
    /// Levels 1 and 2 of the output are reserved for page structure, so a
    /// level-L heading is written with L + 2 `#` characters. Body text has no
    /// marker.
    pub fn markdown_marker(self) -> Option<String> {
        if self.is_body() {
            None
        } else {
            Some("#".repeat(usize::from(self.0) + 2))
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps a span's font size to a heading level.
///
/// Implementations must be pure: the same size always yields the same level.
pub trait HeadingPolicy: Send + Sync {
    fn level(&self, font_size: f32) -> HeadingLevel;
}

/// Fixed descending thresholds: `sizes[i]` is the minimum size for level
/// `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSizeThresholds {
    sizes: [f32; 5],
}

impl FontSizeThresholds {
    /// Create a policy from five minimum sizes for levels 1 through 5.
    ///
    /// Returns `None` unless the sizes are finite, positive and strictly
    /// descending.
    pub fn new(sizes: [f32; 5]) -> Option<Self> {
        let finite = sizes.iter().all(|s| s.is_finite() && *s > 0.0);
        let descending = sizes.windows(2).all(|w| w[0] > w[1]);
        (finite && descending).then_some(Self { sizes })
    }
}

impl Default for FontSizeThresholds {
    fn default() -> Self {
        Self {
            sizes: [24.0, 20.0, 16.0, 14.0, 12.0],
        }
    }
}

impl HeadingPolicy for FontSizeThresholds {
    fn level(&self, font_size: f32) -> HeadingLevel {
        self.sizes
            .iter()
            .position(|&min| font_size >= min)
            .map(|i| HeadingLevel::new(i as u8 + 1))
            .unwrap_or(HeadingLevel::BODY)
    }
}
