//! Resource identifiers.
//!
//! Every event is stored remotely as `{id}.ics`, and the same identifier is
//! written as the iCalendar `UID`. Identifiers are random UUID v4 strings in
//! lowercase hyphenated form.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static EVENT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("Invalid event id regex")
});

/// Generates a fresh event identifier.
///
/// The version nibble is always `4` and the variant nibble is one of
/// `8`, `9`, `a` or `b`.
pub fn new_event_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Returns true if `id` has the shape produced by [`new_event_id`].
///
/// Identifiers coming from other clients may use any shape; this only
/// recognizes ids minted here.
pub fn is_event_id(id: &str) -> bool {
    EVENT_ID_REGEX.is_match(id)
}
