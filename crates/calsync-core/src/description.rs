//! Structured reading of event descriptions.
//!
//! Descriptions are free text, but by convention they hold one `label: value`
//! pair per line. Lines without a colon continue the previous label, and raw
//! URLs (which contain a colon of their own) are kept unlabeled.
//!
//! ```
//! use calsync_core::description::parse_description;
//!
//! let parsed = parse_description("Room: 4B\nHost: Ana\nsecond floor");
//! assert_eq!(parsed.get("Room"), Some("4B"));
//! assert_eq!(parsed.get("Host"), Some("Ana second floor"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Regex for extracting URLs from text.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("Invalid URL regex"));

/// Placeholder shown instead of a literal `null`/`undefined` value.
pub const MISSING_VALUE: &str = "-";

/// One entry of a parsed description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionEntry {
    /// The label before the colon; `None` for unlabeled text and URLs.
    pub label: Option<String>,
    /// The value, with continuation lines joined by single spaces.
    pub value: String,
}

impl DescriptionEntry {
    /// Returns the URLs contained in the value.
    pub fn urls(&self) -> Vec<String> {
        extract_urls(&self.value)
    }
}

/// A description split into labeled entries.
///
/// Entries keep the order in which their label first appeared. A label that
/// appears twice keeps its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDescription {
    entries: Vec<DescriptionEntry>,
}

impl ParsedDescription {
    /// Returns the value for `label`, if present.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label.as_deref() == Some(label))
            .map(|e| e.value.as_str())
    }

    /// Returns the unlabeled text, if any.
    pub fn unlabeled(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label.is_none())
            .map(|e| e.value.as_str())
    }

    /// Iterates over entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &DescriptionEntry> {
        self.entries.iter()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the description held no non-blank line.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns every URL found across all entries.
    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().flat_map(|e| e.urls()).collect()
    }

    fn slot(&mut self, label: Option<&str>) -> &mut String {
        let idx = match self
            .entries
            .iter()
            .position(|e| e.label.as_deref() == label)
        {
            Some(idx) => idx,
            None => {
                self.entries.push(DescriptionEntry {
                    label: label.map(str::to_string),
                    value: String::new(),
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].value
    }

    fn set(&mut self, label: Option<&str>, value: String) {
        *self.slot(label) = value;
    }

    fn append(&mut self, label: Option<&str>, value: &str) {
        let slot = self.slot(label);
        if !slot.is_empty() {
            slot.push(' ');
        }
        slot.push_str(value);
    }
}

/// Parses a description into labeled entries.
///
/// - blank lines are skipped
/// - `label: value` starts (or overwrites) the entry for `label`
/// - a line whose label part contains `http` is a raw URL; it is appended to
///   the unlabeled entry, which becomes the current label
/// - a line without a colon is appended to the current label
/// - the values `null` and `undefined` are shown as [`MISSING_VALUE`]
pub fn parse_description(description: &str) -> ParsedDescription {
    let mut parsed = ParsedDescription::default();
    let mut current: Option<String> = None;

    for line in description.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once(':') {
            Some((label, _)) if label.contains("http") => {
                current = None;
                parsed.append(None, line);
            }
            Some((label, value)) => {
                let label = label.trim().to_string();
                parsed.set(Some(&label), placeholder(value.trim()).to_string());
                current = Some(label);
            }
            None => parsed.append(current.as_deref(), placeholder(line)),
        }
    }

    parsed
}

/// Extracts all http(s) URLs from text, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn placeholder(value: &str) -> &str {
    match value {
        "null" | "undefined" => MISSING_VALUE,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_description() {
        assert!(parse_description("").is_empty());
        assert!(parse_description("\n  \n").is_empty());
    }

    #[test]
    fn labels_and_values() {
        let parsed = parse_description("Room: 4B\nHost:  Ana ");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("Room"), Some("4B"));
        assert_eq!(parsed.get("Host"), Some("Ana"));
        assert_eq!(parsed.unlabeled(), None);
    }

    #[test]
    fn value_keeps_later_colons() {
        let parsed = parse_description("Dial-in: +1 555 0100 pin: 42");
        assert_eq!(parsed.get("Dial-in"), Some("+1 555 0100 pin: 42"));
    }

    #[test]
    fn continuation_lines_join_current_label() {
        let parsed = parse_description("Notes: bring slides\nand the demo laptop\n\nplease");
        assert_eq!(
            parsed.get("Notes"),
            Some("bring slides and the demo laptop please")
        );
    }

    #[test]
    fn leading_unlabeled_text() {
        let parsed = parse_description("just some text\nmore text\nAgenda: review");
        let entries: Vec<_> = parsed.iter().collect();
        assert_eq!(entries[0].label, None);
        assert_eq!(entries[0].value, "just some text more text");
        assert_eq!(parsed.get("Agenda"), Some("review"));
    }

    #[test]
    fn raw_urls_are_unlabeled() {
        let parsed = parse_description(
            "Link: see below\nhttps://meet.example.com/abc\nhttps://docs.example.com/x",
        );
        assert_eq!(parsed.get("Link"), Some("see below"));
        assert_eq!(
            parsed.unlabeled(),
            Some("https://meet.example.com/abc https://docs.example.com/x")
        );
        assert_eq!(parsed.urls().len(), 2);
    }

    #[test]
    fn line_after_url_continues_unlabeled() {
        let parsed = parse_description("https://example.com/a\ntrailing words");
        assert_eq!(parsed.unlabeled(), Some("https://example.com/a trailing words"));
    }

    #[test]
    fn null_and_undefined_become_placeholder() {
        let parsed = parse_description("Location: null\nPhone: undefined\nundefined");
        assert_eq!(parsed.get("Location"), Some(MISSING_VALUE));
        assert_eq!(parsed.get("Phone"), Some("- -"));
    }

    #[test]
    fn repeated_label_keeps_position_takes_last_value() {
        let parsed = parse_description("A: 1\nB: 2\nA: 3");
        let labels: Vec<_> = parsed.iter().map(|e| e.label.clone().unwrap()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(parsed.get("A"), Some("3"));
    }

    #[test]
    fn extracts_urls_from_text() {
        let urls = extract_urls("Join at https://zoom.us/j/123 or http://backup.example.com now");
        assert_eq!(urls, vec!["https://zoom.us/j/123", "http://backup.example.com"]);
        assert!(extract_urls("no links here").is_empty());
    }
}
