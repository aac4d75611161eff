//! Input sanitizing for the single-line prompt.

/// Reduce pasted text to something the one-line prompt can hold.
///
/// Keeps only the first line (`\r`, `\n` and `\r\n` all end a line), turns
/// tabs into a single space, and drops remaining control characters.
pub fn sanitize_line(text: &str) -> String {
    let first_line = text.split(['\n', '\r']).next().unwrap_or_default();
    let mut sanitized = String::with_capacity(first_line.len());

    for c in first_line.chars() {
        match c {
            '\t' => sanitized.push(' '),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }

    sanitized
}
