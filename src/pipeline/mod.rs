//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! Each submodule implements exactly one transformation step. Only
//! [`pdfium`] talks to the PDF engine; every other stage works on the plain
//! data types from [`source`], so each is testable without a real document.
//!
//! ## Data Flow
//!
//! ```text
//!                       ┌─▶ text ──▶ heading ──┐
//! input ──▶ source ─────┼─▶ image count ───────┼─▶ assemble ──▶ postprocess
//! (validate) (pdfium)   └─▶ table ──▶ markdown ┘   (+frontmatter)  (whitespace)
//!                scan (advisory)
//! ```
//!
//! 1. [`input`]   : validate the path, discover batch inputs, name outputs
//! 2. [`source`]  : backend traits and raw page data; [`pdfium`] implements them
//! 3. [`text`]    : text layer → one span per source line
//! 4. [`heading`] : font size → heading level
//! 5. [`table`]   : ruling lines → raw grids, on a separate document handle
//! 6. [`markdown`]: spans and grids → Markdown lines
//! 7. [`scan`]    : flag documents with no usable text layer
//! 8. [`frontmatter`]: metadata block
//! 9. [`assemble`]: per-page ordering, separators, statistics
//! 10. [`postprocess`]: blank-line normalisation and final join

pub mod assemble;
pub mod frontmatter;
pub mod heading;
pub mod input;
pub mod markdown;
pub mod pdfium;
pub mod postprocess;
pub mod scan;
pub mod source;
pub mod table;
pub mod text;
