//! Final-answer extraction from verbose model output
//!
//! Small models often reason out loud before answering even when told not to.
//! This module trims such output with purely textual rules: a single line is cut
//! after its first conclusion marker, a long response is reduced to its closing
//! line (or last two lines when the closing line is very short), and anything
//! else is returned untouched.

/// Phrases that usually introduce the conclusion, in priority order
pub const CONCLUSION_MARKERS: &[&str] = &[
    "Therefore,",
    "Thus,",
    "In conclusion,",
    "So,",
    "To summarize,",
    "Based on the information provided,",
    "According to the data,",
    "From the information,",
];

/// A closing line at or below this many characters is merged with the one before it
const SHORT_LINE_CHARS: usize = 10;

/// Line layout of a trimmed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape<'a> {
    Single(&'a str),
    Pair,
    Multi { penultimate: &'a str, last: &'a str },
}

impl<'a> Shape<'a> {
    fn of(text: &'a str) -> Self {
        let lines: Vec<&str> = text.trim().split('\n').collect();
        match lines.as_slice() {
            [only] => Shape::Single(*only),
            [_, _] => Shape::Pair,
            [.., penultimate, last] => Shape::Multi {
                penultimate: *penultimate,
                last: *last,
            },
            // split always yields at least one item
            [] => Shape::Pair,
        }
    }
}

/// Reduce a raw completion to its concluding answer
///
/// | shape      | marker found          | result                                  |
/// |------------|-----------------------|-----------------------------------------|
/// | one line   | yes                   | text after the marker, capitalized      |
/// | one line   | no                    | input unchanged                         |
/// | two lines  | n/a                   | input unchanged                         |
/// | 3+ lines   | last line > 10 chars  | last line                               |
/// | 3+ lines   | last line <= 10 chars | last two lines joined by a space        |
pub fn extract_final_answer(raw: &str) -> String {
    match Shape::of(raw) {
        Shape::Single(line) => after_marker(line).unwrap_or_else(|| raw.to_string()),
        Shape::Pair => raw.to_string(),
        Shape::Multi { penultimate, last } => {
            let last = last.trim();
            if last.chars().count() > SHORT_LINE_CHARS {
                last.to_string()
            } else {
                format!("{} {}", penultimate.trim(), last)
            }
        }
    }
}

/// Text following the first matching marker, matched case-insensitively
fn after_marker(line: &str) -> Option<String> {
    let lower = line.to_lowercase();
    CONCLUSION_MARKERS.iter().find_map(|marker| {
        let marker = marker.to_lowercase();
        lower
            .find(&marker)
            .map(|idx| capitalize(lower[idx + marker.len()..].trim()))
    })
}

/// Upper-case the first character and lower-case the rest
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
