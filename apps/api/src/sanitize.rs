//! Prompt sanitation — every prompt that leaves this process goes through
//! `sanitize` first, so provider calls only ever carry a known character set.

/// Punctuation allowed through in addition to letters, digits, and whitespace.
const ALLOWED_PUNCTUATION: &[char] = &['.', ',', ':', ';', '?', '!', '\'', '"', '-'];

/// Normalizes free-form text into a transport-safe string.
///
/// Characters outside the allow-list are dropped, runs of horizontal
/// whitespace collapse to a single space, and leading whitespace is trimmed
/// on each line without collapsing newlines. Idempotent; never panics.
pub fn sanitize(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split('\n')
        .map(sanitize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn sanitize_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut pending_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else if c.is_alphanumeric() || ALLOWED_PUNCTUATION.contains(&c) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            out.push(c);
            pending_space = false;
        }
        // Disallowed characters are dropped without leaving a space behind.
    }
    out
}
