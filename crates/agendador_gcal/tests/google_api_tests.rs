use agendador_common::{
    CalendarPortError, CalendarReader, CalendarWriter, EventTime, NewCalendarEvent,
    SharedProperty,
};
use agendador_gcal::auth::TokenSource;
use agendador_gcal::service::GoogleCalendarService;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn service(server: &MockServer) -> GoogleCalendarService {
    GoogleCalendarService::new(
        TokenSource::fixed("tok"),
        Some(&server.base_url()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn day_window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2024, 6, 2, 4, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 6, 3, 3, 59, 59).unwrap(),
    )
}

fn new_event() -> NewCalendarEvent {
    let local = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
    NewCalendarEvent {
        summary: "Visit: Ana Rojas (Repisas Don Maxi)".to_string(),
        description: "Customer: Ana Rojas".to_string(),
        start: EventTime {
            date_time: local("2024-06-02 10:00"),
            time_zone: "America/Santiago".to_string(),
        },
        end: EventTime {
            date_time: local("2024-06-02 10:15"),
            time_zone: "America/Santiago".to_string(),
        },
        attendees: vec!["ana@example.com".to_string()],
        slot_key: "2024-06-02T10:00".to_string(),
        created_by: "agendador".to_string(),
    }
}

#[tokio::test]
async fn test_list_events_sends_filter_and_reads_tags() {
    let server = MockServer::start_async().await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/calendars/primary/events")
                .query_param("timeMin", "2024-06-02T04:00:00.000Z")
                .query_param("timeMax", "2024-06-03T03:59:59.000Z")
                .query_param("singleEvents", "true")
                .query_param("maxResults", "250")
                .query_param("sharedExtendedProperty", "created_by=agendador")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({
                "items": [
                    {
                        "id": "evt1",
                        "extendedProperties": {
                            "shared": { "slot_key": "2024-06-02T10:00", "created_by": "agendador" }
                        }
                    },
                    { "id": "evt2" }
                ]
            }));
        })
        .await;

    let (start, end) = day_window();
    let property = SharedProperty::created_by("agendador");
    let events = service(&server)
        .list_events_by_shared_property("primary", start, end, &property)
        .await
        .unwrap();

    list.assert_async().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "evt1");
    assert_eq!(events[0].slot_key.as_deref(), Some("2024-06-02T10:00"));
    assert_eq!(events[0].created_by.as_deref(), Some("agendador"));
    assert_eq!(events[1].slot_key, None);
}

#[tokio::test]
async fn test_list_events_follows_page_tokens() {
    let server = MockServer::start_async().await;
    // Registered first so it takes precedence for requests carrying the token.
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/calendars/primary/events")
                .query_param("pageToken", "page-2");
            then.status(200).json_body(json!({
                "items": [{ "id": "evt2", "extendedProperties": { "shared": { "slot_key": "2024-06-02T11:00" } } }]
            }));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/calendars/primary/events");
            then.status(200).json_body(json!({
                "items": [{ "id": "evt1", "extendedProperties": { "shared": { "slot_key": "2024-06-02T10:00" } } }],
                "nextPageToken": "page-2"
            }));
        })
        .await;

    let (start, end) = day_window();
    let property = SharedProperty::created_by("agendador");
    let events = service(&server)
        .list_events_by_shared_property("primary", start, end, &property)
        .await
        .unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let keys: Vec<_> = events.iter().filter_map(|e| e.slot_key.as_deref()).collect();
    assert_eq!(keys, vec!["2024-06-02T10:00", "2024-06-02T11:00"]);
}

#[tokio::test]
async fn test_free_busy_discards_inverted_windows() {
    let server = MockServer::start_async().await;
    let free_busy = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/freeBusy")
                .header("authorization", "Bearer tok")
                .body_contains("\"timeZone\":\"America/Santiago\"")
                .body_contains("\"items\":[{\"id\":\"primary\"}]");
            then.status(200).json_body(json!({
                "kind": "calendar#freeBusy",
                "calendars": {
                    "primary": {
                        "busy": [
                            { "start": "2024-06-02T14:00:00Z", "end": "2024-06-02T14:30:00Z" },
                            { "start": "2024-06-02T11:00:00-04:00", "end": "2024-06-02T12:00:00-04:00" },
                            { "start": "2024-06-02T18:00:00Z", "end": "2024-06-02T17:00:00Z" }
                        ]
                    }
                }
            }));
        })
        .await;

    let (start, end) = day_window();
    let busy = service(&server)
        .query_free_busy("primary", start, end, "America/Santiago")
        .await
        .unwrap();

    free_busy.assert_async().await;
    assert_eq!(busy.len(), 2);
    assert_eq!(
        busy[1].window().start,
        Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_free_busy_calendar_error_is_a_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/freeBusy");
            then.status(200).json_body(json!({
                "calendars": {
                    "primary": {
                        "errors": [{ "domain": "global", "reason": "notFound" }],
                        "busy": []
                    }
                }
            }));
        })
        .await;

    let (start, end) = day_window();
    let result = service(&server)
        .query_free_busy("primary", start, end, "UTC")
        .await;
    match result {
        Err(CalendarPortError::Provider { detail, .. }) => assert!(detail.contains("notFound")),
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_insert_event_sends_local_time_and_tags() {
    let server = MockServer::start_async().await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/calendars/primary/events")
                .query_param("sendUpdates", "all")
                .header("authorization", "Bearer tok")
                .body_contains("\"dateTime\":\"2024-06-02T10:00:00\"")
                .body_contains("\"dateTime\":\"2024-06-02T10:15:00\"")
                .body_contains("\"timeZone\":\"America/Santiago\"")
                .body_contains("\"slot_key\":\"2024-06-02T10:00\"")
                .body_contains("\"created_by\":\"agendador\"")
                .body_contains("\"useDefault\":true")
                .body_contains("\"email\":\"ana@example.com\"");
            then.status(200).json_body(json!({
                "id": "abc123",
                "htmlLink": "https://www.google.com/calendar/event?eid=abc123",
                "status": "confirmed"
            }));
        })
        .await;

    let created = service(&server)
        .insert_event("primary", new_event())
        .await
        .unwrap();

    insert.assert_async().await;
    assert_eq!(created.id, "abc123");
    assert_eq!(created.slot_key, "2024-06-02T10:00");
    assert_eq!(
        created.html_link.as_deref(),
        Some("https://www.google.com/calendar/event?eid=abc123")
    );
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/calendars/denied/events");
            then.status(401).body("{\"error\":\"invalid_grant\"}");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/calendars/limited/events");
            then.status(403).body("Calendar usage limits exceeded.");
        })
        .await;

    let calendar = service(&server);
    assert!(matches!(
        calendar.insert_event("denied", new_event()).await,
        Err(CalendarPortError::Credential(_))
    ));
    match calendar.insert_event("limited", new_event()).await {
        Err(CalendarPortError::Provider { status, detail }) => {
            assert_eq!(status, 403);
            assert_eq!(detail, "Calendar usage limits exceeded.");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_a_transport_error() {
    let calendar = GoogleCalendarService::new(
        TokenSource::fixed("tok"),
        Some("http://127.0.0.1:9"),
        Duration::from_secs(2),
    )
    .unwrap();
    let (start, end) = day_window();
    assert!(matches!(
        calendar.query_free_busy("primary", start, end, "UTC").await,
        Err(CalendarPortError::Transport(_))
    ));
}
