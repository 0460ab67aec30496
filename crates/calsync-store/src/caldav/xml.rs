//! XML for the CalDAV REPORT fetch.
//!
//! Builds the `calendar-query` request body and reads calendar objects back
//! out of the multistatus response.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::error::{StoreError, StoreResult};

/// DAV namespace
pub const DAV_NS: &str = "DAV:";
/// CalDAV namespace
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// One calendar object from a multistatus response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarObject {
    /// The resource href, as sent by the server.
    pub href: String,
    /// The resource ETag as the server wrote it.
    pub etag: Option<String>,
    /// The iCalendar text of the resource.
    pub data: String,
}

/// Generates a REPORT body asking for every event in the collection.
///
/// Unlike a windowed query there is no time-range filter; recurrence is
/// expanded locally.
pub fn calendar_query_body() -> StoreResult<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut query = BytesStart::new("c:calendar-query");
    query.push_attribute(("xmlns:d", DAV_NS));
    query.push_attribute(("xmlns:c", CALDAV_NS));
    write(&mut writer, Event::Start(query))?;

    write(&mut writer, Event::Start(BytesStart::new("d:prop")))?;
    write(&mut writer, Event::Empty(BytesStart::new("d:getetag")))?;
    write(&mut writer, Event::Empty(BytesStart::new("c:calendar-data")))?;
    write(&mut writer, Event::End(BytesEnd::new("d:prop")))?;

    write(&mut writer, Event::Start(BytesStart::new("c:filter")))?;
    let mut vcal_filter = BytesStart::new("c:comp-filter");
    vcal_filter.push_attribute(("name", "VCALENDAR"));
    write(&mut writer, Event::Start(vcal_filter))?;
    let mut vevent_filter = BytesStart::new("c:comp-filter");
    vevent_filter.push_attribute(("name", "VEVENT"));
    write(&mut writer, Event::Empty(vevent_filter))?;
    write(&mut writer, Event::End(BytesEnd::new("c:comp-filter")))?;
    write(&mut writer, Event::End(BytesEnd::new("c:filter")))?;

    write(&mut writer, Event::End(BytesEnd::new("c:calendar-query")))?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| StoreError::internal("REPORT body is not UTF-8").with_source(e))
}

/// Parses a multistatus response into calendar objects.
///
/// Responses without `calendar-data` (the collection itself, errors) are
/// skipped.
///
/// # Errors
///
/// Returns a `ParseError` if the XML is malformed.
pub fn parse_report_response(xml: &str) -> StoreResult<Vec<CalendarObject>> {
    let mut results = Vec::new();

    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut href = String::new();
    let mut etag = String::new();
    let mut data = String::new();
    let mut in_response = false;
    let mut current_element: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            StoreError::parse(format!("Malformed multistatus response: {}", e)).with_source(e)
        })?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match local_name(&name) {
                    "response" => {
                        in_response = true;
                        href.clear();
                        etag.clear();
                        data.clear();
                    }
                    local @ ("href" | "getetag" | "calendar-data") => {
                        current_element = Some(local.to_string());
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if local_name(&name) == "response" && in_response {
                    if !href.is_empty() && !data.trim().is_empty() {
                        let tag = etag.trim();
                        results.push(CalendarObject {
                            href: href.trim().to_string(),
                            etag: (!tag.is_empty()).then(|| tag.to_string()),
                            data: data.clone(),
                        });
                    }
                    in_response = false;
                }
                current_element = None;
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|err| {
                    StoreError::parse(format!("Malformed text in response: {}", err))
                        .with_source(err)
                })?;
                append(current_element.as_deref(), &text, &mut href, &mut etag, &mut data);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e).to_string();
                append(current_element.as_deref(), &text, &mut href, &mut etag, &mut data);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(results)
}

fn append(element: Option<&str>, text: &str, href: &mut String, etag: &mut String, data: &mut String) {
    match element {
        Some("href") => href.push_str(text),
        Some("getetag") => etag.push_str(text),
        Some("calendar-data") => data.push_str(text),
        _ => {}
    }
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> StoreResult<()> {
    writer
        .write_event(event)
        .map_err(|e| StoreError::internal("Failed to write REPORT body").with_source(e))
}

/// Extracts the local name from a potentially namespaced element name.
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_query_body_generation() {
        let body = calendar_query_body().unwrap();
        assert!(body.starts_with("<c:calendar-query"));
        assert!(body.contains("xmlns:c=\"urn:ietf:params:xml:ns:caldav\""));
        assert!(body.contains("<d:getetag/>"));
        assert!(body.contains("<c:calendar-data/>"));
        assert!(body.contains("name=\"VEVENT\""));
        assert!(!body.contains("time-range"));
    }

    #[test]
    fn parse_report_events() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/calendars/user/</d:href>
    <d:propstat>
      <d:prop><d:getetag>"collection"</d:getetag></d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
  <d:response>
    <d:href>/calendars/user/event1.ics</d:href>
    <d:propstat>
      <d:prop>
        <d:getetag>"etag-123"</d:getetag>
        <cal:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:event1
SUMMARY:R&amp;D sync
DTSTART:20250205T100000Z
DTEND:20250205T110000Z
END:VEVENT
END:VCALENDAR</cal:calendar-data>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

        let objects = parse_report_response(xml).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].href, "/calendars/user/event1.ics");
        assert_eq!(objects[0].etag.as_deref(), Some("\"etag-123\""));
        assert!(objects[0].data.contains("UID:event1"));
        assert!(objects[0].data.contains("SUMMARY:R&D sync"));
    }

    #[test]
    fn parse_report_cdata() {
        let xml = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:response>
    <D:href>/cal/a.ics</D:href>
    <D:propstat><D:prop>
      <C:calendar-data><![CDATA[BEGIN:VCALENDAR
END:VCALENDAR]]></C:calendar-data>
    </D:prop></D:propstat>
  </D:response>
</D:multistatus>"#;

        let objects = parse_report_response(xml).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].etag, None);
        assert!(objects[0].data.starts_with("BEGIN:VCALENDAR"));
    }

    #[test]
    fn empty_multistatus() {
        let xml = r#"<D:multistatus xmlns:D="DAV:"></D:multistatus>"#;
        assert!(parse_report_response(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let err = parse_report_response("<d:multistatus><d:response></d:multistatus>").unwrap_err();
        assert_eq!(err.code(), crate::error::StoreErrorCode::ParseError);
    }
}
