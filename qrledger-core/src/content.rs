use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run regex should compile"));

/// Pull a record number out of a scanned payload.
///
/// A payload made only of ASCII digits is the number itself. Otherwise the
/// longest run of digits is used, the earliest one winning a tie. Payloads
/// without digits yield `None`.
pub fn extract_number_from_content(content: &str) -> Option<String> {
    let content = content.trim();
    if content.is_empty() {
        return None;
    }
    if content.bytes().all(|b| b.is_ascii_digit()) {
        return Some(content.to_string());
    }

    let mut best: Option<&str> = None;
    for run in DIGIT_RUN.find_iter(content) {
        let run = run.as_str();
        if best.is_none_or(|current| run.len() > current.len()) {
            best = Some(run);
        }
    }
    best.map(str::to_string)
}
