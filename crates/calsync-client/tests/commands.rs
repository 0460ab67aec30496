//! Command-layer tests against a WireMock CalDAV server.

use std::io::Write;

use clap::Parser;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex},
};

use calsync_client::cli::Cli;
use calsync_client::commands::events::{self, EventChanges};
use calsync_client::config::ClientConfig;
use calsync_client::error::ClientError;

const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//Test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:standup\r\n\
DTSTAMP:20240101T000000Z\r\n\
DTSTART:20240101T090000Z\r\n\
DTEND:20240101T093000Z\r\n\
SUMMARY:Standup\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

fn setup(server: &MockServer) -> (Cli, ClientConfig, tempfile::NamedTempFile) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[store]\nurl = \"{}/cal\"\nusername = \"user\"\npassword = \"pass\"\ntimeout_secs = 5",
        server.uri()
    )
    .unwrap();
    let config = ClientConfig::load_from(file.path()).unwrap();
    let cli = Cli::try_parse_from(["calsync", "list"]).unwrap();
    (cli, config, file)
}

#[tokio::test]
async fn list_loads_from_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cal/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
        .expect(1)
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    events::list(&reconciler, &config, Some("2024-01-01"), true)
        .await
        .unwrap();
    assert!(reconciler.replica().contains("standup"));
}

#[tokio::test]
async fn list_propagates_load_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    let err = events::list(&reconciler, &config, None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Operation(_)));
    assert!(err.to_string().contains("Failed to load events"));
}

#[tokio::test]
async fn edit_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    let err = events::edit(&reconciler, "nope", EventChanges::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref id) if id == "nope"));
}

#[tokio::test]
async fn edit_replaces_event() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CALENDAR))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/cal/standup.ics"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/cal/[0-9a-f-]{36}\.ics$"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    let changes = EventChanges {
        title: Some("Standup (moved)".to_string()),
        ..Default::default()
    };
    events::edit(&reconciler, "standup", changes).await.unwrap();

    let snapshot = reconciler.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_ne!(snapshot[0].id, "standup");
    assert_eq!(snapshot[0].title, "Standup (moved)");
}

#[tokio::test]
async fn create_with_inverted_range_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    let err = events::create(
        &reconciler,
        "Backwards".to_string(),
        "2024-01-01 10:00",
        Some("2024-01-01 09:00"),
        String::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ClientError::Operation(_)));
}

#[tokio::test]
async fn delete_of_missing_resource_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/cal/gone.ics"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (cli, config, _file) = setup(&server);
    let reconciler = events::connect(&cli, &config).unwrap();

    events::delete(&reconciler, "gone").await.unwrap();
}
