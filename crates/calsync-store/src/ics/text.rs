//! TEXT value escaping (RFC 5545 section 3.3.11).
//!
//! Only the writing side lives here: the `icalendar` parser unescapes values
//! when reading.

/// Escapes a TEXT property value.
///
/// Backslashes, semicolons and commas are backslash-escaped and line breaks
/// become `\n`.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    out.push_str("\\n");
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_text("a;b,c"), "a\\;b\\,c");
        assert_eq!(escape_text("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_text("line1\r\nline2"), "line1\\nline2");
        assert_eq!(escape_text("C:\\tmp"), "C:\\\\tmp");
        assert_eq!(escape_text("Room: 4B"), "Room: 4B");
    }
}
