//! End-to-end reconciler scenarios against a WireMock CalDAV server.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex},
};

use calsync_core::{EventDraft, is_event_id};
use calsync_replica::{Outcome, Reconciler, Severity};
use calsync_store::{CalDavEventStore, StoreConfig, StoreErrorCode};

fn reconciler_for(url: &str) -> Reconciler {
    let config = StoreConfig::new(url)
        .unwrap()
        .with_credentials("user", "pass")
        .with_timeout(Duration::from_secs(5));
    Reconciler::new(Arc::new(CalDavEventStore::new(config).unwrap()))
}

fn calendar(uid: &str, summary: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Test//Test//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:20240101T000000Z\r\n\
         DTSTART:20240101T090000Z\r\n\
         DTEND:20240101T093000Z\r\n\
         SUMMARY:{summary}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

fn draft(title: &str, hour: u32) -> EventDraft {
    EventDraft::new(
        title,
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 30, 0).unwrap(),
    )
}

#[tokio::test]
async fn create_then_edit_assigns_new_identity() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/cal/[0-9a-f-]{36}\.ics$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/cal/[0-9a-f-]{36}\.ics$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = reconciler_for(&format!("{}/cal", server.uri()));

    let created = reconciler.create(draft("Standup", 9)).await;
    assert!(created.is_success(), "{created}");
    let first = created.event().cloned().unwrap();
    assert!(is_event_id(&first.id));

    let edited = reconciler.edit(&first.id, draft("Standup (moved)", 10)).await;
    assert_eq!(edited.severity(), Severity::Success);
    let second = edited.event().cloned().unwrap();
    assert_ne!(second.id, first.id);

    let snapshot = reconciler.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, second.id);
    assert_eq!(snapshot[0].title, "Standup (moved)");

    let requests = server.received_requests().await.unwrap();
    let delete = requests.iter().find(|r| r.method.as_str() == "DELETE").unwrap();
    assert_eq!(delete.url.path(), format!("/cal/{}.ics", first.id));
}

#[tokio::test]
async fn load_then_delete_missing_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cal/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar("C", "Retro")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cal/C.ics"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = reconciler_for(&format!("{}/cal", server.uri()));

    assert!(matches!(reconciler.load().await, Outcome::Loaded { count: 1 }));
    assert!(reconciler.replica().contains("C"));

    let outcome = reconciler.delete("C").await;
    assert_eq!(outcome.severity(), Severity::Warning);
    assert_eq!(outcome.error().and_then(|e| e.status()), Some(404));
    assert!(reconciler.replica().is_empty());
}

#[tokio::test]
async fn failed_create_during_edit_loses_the_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cal/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calendar("A", "Standup")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cal/A.ics"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(507))
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = reconciler_for(&format!("{}/cal", server.uri()));
    reconciler.load().await;

    let outcome = reconciler.edit("A", draft("Standup", 11)).await;
    match outcome {
        Outcome::ReconciliationGap {
            old_id,
            delete_warning,
            error,
        } => {
            assert_eq!(old_id, "A");
            assert!(delete_warning.is_none());
            assert_eq!(error.code(), StoreErrorCode::StoreWriteError);
            assert_eq!(error.status(), Some(507));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(reconciler.replica().is_empty());
}

#[tokio::test]
async fn unreachable_server_gaps_the_edit() {
    // Nothing listens on port 1.
    let reconciler = reconciler_for("http://127.0.0.1:1/cal/");
    reconciler
        .replica()
        .replace_all(vec![draft("Review", 14).into_event("D")]);

    let outcome = reconciler.edit("D", draft("Review", 15)).await;

    assert_eq!(outcome.severity(), Severity::Warning);
    match outcome {
        Outcome::ReconciliationGap {
            delete_warning: Some(warning),
            error,
            ..
        } => {
            assert_eq!(warning.code(), StoreErrorCode::StoreDeleteWarning);
            assert_eq!(error.code(), StoreErrorCode::NetworkError);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(reconciler.replica().is_empty());
}
