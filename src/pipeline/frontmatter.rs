//! YAML frontmatter block prepended to every converted document.
//!
//! ```text
//! ---
//! title: Quarterly Report
//! author: Unknown
//! pages: 12
//! created: "2024-05-01 09:30:00"
//! source_file: report.pdf
//! ---
//! ```
//!
//! Strings are emitted plain when a YAML reader would read them back as the
//! same string, and double-quoted otherwise.

use crate::output::DocumentMetadata;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// Delimiter line opening and closing the block.
pub const DELIMITER: &str = "---";

/// Conservative plain-scalar shape: starts with a letter or underscore, no
/// indicator characters, no trailing whitespace.
static RE_PLAIN_SCALAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_ .,()/+-]*$").unwrap());

/// Words YAML 1.1 readers resolve to booleans or null.
static RE_RESERVED_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(y|n|yes|no|true|false|on|off|null|nan|inf)$").unwrap()
});

/// Render the frontmatter block, delimiters included.
pub fn render(metadata: &DocumentMetadata) -> Vec<String> {
    vec![
        DELIMITER.to_string(),
        format!("title: {}", yaml_string(&metadata.title)),
        format!("author: {}", yaml_string(&metadata.author)),
        format!("pages: {}", metadata.pages),
        format!("created: {}", yaml_string(&metadata.created)),
        format!("source_file: {}", yaml_string(&metadata.source_file)),
        DELIMITER.to_string(),
    ]
}

/// Encode `value` as a YAML scalar that reads back as the same string.
pub fn yaml_string(value: &str) -> String {
    let plain = RE_PLAIN_SCALAR.is_match(value)
        && !value.ends_with(' ')
        && !value.contains(" #")
        && !RE_RESERVED_WORD.is_match(value);
    if plain {
        value.to_string()
    } else {
        quote(value)
    }
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
