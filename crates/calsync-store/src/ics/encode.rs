use chrono::{DateTime, Utc};

use calsync_core::{Event, format_compact};

use super::text::escape_text;

/// Product identifier written into every encoded document.
pub const PRODID: &str = "-//calsync//calsync//EN";

/// Longest physical line, in octets, before folding.
const MAX_LINE_OCTETS: usize = 75;

/// Encodes an event as a single-event calendar document, stamped now.
pub fn encode(event: &Event) -> String {
    encode_at(event, Utc::now())
}

/// Encodes an event with an explicit `DTSTAMP`.
///
/// Lines end with CRLF and are folded at 75 octets. Title and description
/// are always written, empty if need be. ETag and recurrence data are not
/// part of the document.
pub fn encode_at(event: &Event, stamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{}", PRODID));
    push_line(&mut out, "BEGIN:VEVENT");
    push_line(&mut out, &format!("UID:{}", escape_text(&event.id)));
    push_line(&mut out, &format!("DTSTAMP:{}", format_compact(stamp)));
    push_line(&mut out, &format!("DTSTART:{}", format_compact(event.start_date)));
    push_line(&mut out, &format!("DTEND:{}", format_compact(event.end_date)));
    push_line(&mut out, &format!("SUMMARY:{}", escape_text(&event.title)));
    push_line(
        &mut out,
        &format!("DESCRIPTION:{}", escape_text(&event.description)),
    );
    push_line(&mut out, "END:VEVENT");
    push_line(&mut out, "END:VCALENDAR");
    out
}

/// Appends a content line, folding it so no physical line exceeds
/// [`MAX_LINE_OCTETS`]. Folds never split a UTF-8 sequence.
fn push_line(out: &mut String, line: &str) {
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn standup() -> Event {
        Event::new(
            "6f9619ff-8b86-4d11-b42d-00c04fc964ff",
            "Standup",
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        )
        .with_description("Room: 4B\nHost: Ana")
    }

    #[test]
    fn encodes_single_event_document() {
        let stamp = Utc.with_ymd_and_hms(2023, 12, 31, 12, 0, 0).unwrap();
        let wire = encode_at(&standup(), stamp).replace("\r\n", "\n");

        insta::assert_snapshot!(wire.trim_end(), @r"
        BEGIN:VCALENDAR
        VERSION:2.0
        PRODID:-//calsync//calsync//EN
        BEGIN:VEVENT
        UID:6f9619ff-8b86-4d11-b42d-00c04fc964ff
        DTSTAMP:20231231T120000Z
        DTSTART:20240101T090000Z
        DTEND:20240101T093000Z
        SUMMARY:Standup
        DESCRIPTION:Room: 4B\nHost: Ana
        END:VEVENT
        END:VCALENDAR
        ");
    }

    #[test]
    fn every_line_ends_with_crlf() {
        let wire = encode(&standup());
        assert!(wire.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(wire.matches("\r\n").count(), wire.matches('\n').count());
    }

    #[test]
    fn empty_fields_are_written() {
        let event = Event::new(
            "abc",
            "",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        );
        let wire = encode(&event);
        assert!(wire.contains("\r\nSUMMARY:\r\n"));
        assert!(wire.contains("\r\nDESCRIPTION:\r\n"));
    }

    #[test]
    fn dtstamp_is_encode_time() {
        let before = Utc::now();
        let wire = encode(&standup());
        let stamp_line = wire
            .lines()
            .find(|l| l.starts_with("DTSTAMP:"))
            .unwrap()
            .trim_end();
        let stamp = calsync_core::parse_compact(&stamp_line["DTSTAMP:".len()..]).unwrap();
        assert!(stamp >= before - chrono::Duration::seconds(1));
        assert!(stamp <= Utc::now());
    }

    #[test]
    fn long_lines_are_folded() {
        let event = standup().with_description("é".repeat(100));
        let wire = encode(&event);
        for line in wire.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line:?}");
        }
        let unfolded = wire.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("DESCRIPTION:{}", "é".repeat(100))));
    }
}
