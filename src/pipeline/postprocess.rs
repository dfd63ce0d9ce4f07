//! Post-processing: deterministic whitespace cleanup of the assembled lines.
//!
//! The assembler appends a blank line after every fragment, which leaves runs
//! of blanks wherever fragments are adjacent or skipped. The rules here turn
//! that into the final document shape:
//!
//! 1. Whitespace-only lines become empty lines
//! 2. Runs of empty lines collapse to one
//! 3. Leading and trailing empty lines are removed
//! 4. Lines are joined with `\n`, with no trailing newline
//!
//! Character-level cleanup ([`is_invisible`], [`remove_invisible_chars`])
//! also lives here; the pdfium backend filters characters as they are read
//! and the converter cleans document info strings.

/// Apply all line rules and join the result into the final document text.
pub fn finalize(lines: Vec<String>) -> String {
    normalize_blank_lines(lines).join("\n")
}

/// Rules 1–3: blank normalisation, collapse, and edge trimming.
pub fn normalize_blank_lines(lines: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut previous_blank = true;
    for line in lines {
        let blank = line.trim().is_empty();
        if blank {
            if !previous_blank {
                out.push(String::new());
            }
        } else {
            out.push(line);
        }
        previous_blank = blank;
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out
}

/// Characters with no visible rendering that text layers leak into output.
///
/// Zero-width spaces and joiners, the byte-order mark, soft hyphens, the word
/// joiner, and the `U+FFFE`/`U+FFFF` non-characters pdfium uses as markers.
pub fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'
            | '\u{200C}'
            | '\u{200D}'
            | '\u{2060}'
            | '\u{FEFF}'
            | '\u{00AD}'
            | '\u{FFFE}'
            | '\u{FFFF}'
    )
}

/// Strip every [`is_invisible`] character from `input`.
pub fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !is_invisible(*c)).collect()
}
