#[cfg(test)]
mod tests {
    use crate::booking::BookingRequest;
    use crate::guard::ConflictReason;
    use crate::handle::{CalendarHandle, CalendarPorts};
    use crate::logic::{AvailabilityQuery, BookingEngine, BookingOutcome};
    use crate::service::mock::InMemoryCalendar;
    use agendador_common::BookingError;
    use agendador_config::{
        AppConfig, AvailabilityMode, BookingConfig, GoogleConfig, ServerConfig,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn config(mode: AvailabilityMode) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            log_level: None,
            google: GoogleConfig {
                calendar_id: "primary".to_string(),
                key_path: None,
                client_id: None,
                client_secret: None,
                refresh_token: None,
                notify_email: Some("agenda@donmaxi.example".to_string()),
                api_base_url: None,
                request_timeout_secs: None,
            },
            booking: BookingConfig {
                time_zone: "America/Santiago".to_string(),
                duration_minutes: 15,
                availability_mode: mode,
                creator_tag: "agendador".to_string(),
                business_name: "Repisas Don Maxi".to_string(),
                slot_start: "09:00".to_string(),
                slot_end: "17:00".to_string(),
                slot_step_minutes: 30,
            },
        })
    }

    fn engine(mode: AvailabilityMode) -> (BookingEngine, Arc<InMemoryCalendar>) {
        let calendar = Arc::new(InMemoryCalendar::new());
        let handle = CalendarHandle::ready(CalendarPorts::shared(calendar.clone()));
        let engine = BookingEngine::new(config(mode), Arc::new(handle)).unwrap();
        (engine, calendar)
    }

    fn request(first_name: &str) -> BookingRequest {
        serde_json::from_value(json!({
            "first_name": first_name,
            "last_name": "Rojas",
            "email": "ana@example.com",
            "phone": "+56912345678",
            "address": "Av. Providencia 1234",
            "date": "2024-06-02",
            "time": "10:00",
            "tz": "America/Santiago"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_book_then_repeat_is_slot_taken() {
        let (engine, calendar) = engine(AvailabilityMode::SelfCreatedOnly);

        match engine.book(&request("Ana")).await.unwrap() {
            BookingOutcome::Committed(booking) => {
                assert!(booking.ok);
                assert_eq!(booking.slot_key, "2024-06-02T10:00");
                assert!(!booking.event_id.is_empty());
            }
            other => panic!("expected commit, got {other:?}"),
        }

        let inserted = calendar.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].start.time_zone, "America/Santiago");
        assert_eq!(inserted[0].attendees.len(), 2);

        // Another customer, same slot.
        match engine.book(&request("Bruno")).await.unwrap() {
            BookingOutcome::Conflict(conflict) => {
                assert_eq!(conflict.slot_key.as_str(), "2024-06-02T10:00");
                assert_eq!(conflict.reason, ConflictReason::SlotKeyTaken);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(calendar.inserted().len(), 1);
    }

    #[tokio::test]
    async fn test_booked_slot_disappears_from_availability() {
        let (engine, _calendar) = engine(AvailabilityMode::SelfCreatedOnly);
        let query = AvailabilityQuery {
            date: "2024-06-02".to_string(),
            slots: Some("09:30,10:00,10:30".to_string()),
            ..Default::default()
        };

        let before = engine.availability(&query).await.unwrap();
        assert!(before.availability.values().all(|free| *free));
        assert_eq!(before.tz, "America/Santiago");
        assert_eq!(before.mode, "self-created-only");

        engine.book(&request("Ana")).await.unwrap();

        let after = engine.availability(&query).await.unwrap();
        assert_eq!(after.availability.get("09:30"), Some(&true));
        assert_eq!(after.availability.get("10:00"), Some(&false));
        assert_eq!(after.availability.get("10:30"), Some(&true));
    }

    #[tokio::test]
    async fn test_mode_override_sees_external_events() {
        let (engine, calendar) = engine(AvailabilityMode::SelfCreatedOnly);
        calendar.add_external_busy(
            Utc.with_ymd_and_hms(2024, 6, 2, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 2, 15, 0, 0).unwrap(),
        );
        let mut query = AvailabilityQuery {
            date: "2024-06-02".to_string(),
            slots: Some("10:00".to_string()),
            ..Default::default()
        };

        let configured = engine.availability(&query).await.unwrap();
        assert_eq!(configured.availability.get("10:00"), Some(&true));

        query.mode = Some("any-event".to_string());
        let any_event = engine.availability(&query).await.unwrap();
        assert_eq!(any_event.mode, "any-event");
        assert_eq!(any_event.availability.get("10:00"), Some(&false));

        // The guard always checks free/busy, whatever the display mode.
        match engine.book(&request("Ana")).await.unwrap() {
            BookingOutcome::Conflict(conflict) => {
                assert_eq!(conflict.reason, ConflictReason::Overlap)
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_availability_defaults_to_configured_catalog() {
        let (engine, _calendar) = engine(AvailabilityMode::AnyEvent);
        let query = AvailabilityQuery {
            date: "2024-06-02".to_string(),
            ..Default::default()
        };

        let response = engine.availability(&query).await.unwrap();
        assert_eq!(response.availability.len(), 17);
        assert_eq!(engine.slot_catalog().slots.len(), 17);
    }

    #[tokio::test]
    async fn test_availability_rejects_bad_query() {
        let (engine, _calendar) = engine(AvailabilityMode::AnyEvent);

        let wrong_duration = AvailabilityQuery {
            date: "2024-06-02".to_string(),
            duration_minutes: Some(60),
            ..Default::default()
        };
        assert!(matches!(
            engine.availability(&wrong_duration).await,
            Err(BookingError::InputFormat(_))
        ));

        let unknown_mode = AvailabilityQuery {
            date: "2024-06-02".to_string(),
            mode: Some("whenever".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            engine.availability(&unknown_mode).await,
            Err(BookingError::InputFormat(_))
        ));

        let bad_date = AvailabilityQuery {
            date: "June 2nd".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            engine.availability(&bad_date).await,
            Err(BookingError::InputFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_booking_never_reaches_calendar() {
        let (engine, calendar) = engine(AvailabilityMode::AnyEvent);
        calendar.set_fail_reads(true);
        let mut req = request("Ana");
        req.email = "not-an-email".to_string();

        assert!(matches!(
            engine.book(&req).await,
            Err(BookingError::InputFormat(_))
        ));
        assert!(calendar.inserted().is_empty());
    }

    #[test]
    fn test_engine_rejects_unknown_configured_zone() {
        let mut cfg = (*config(AvailabilityMode::AnyEvent)).clone();
        cfg.booking.time_zone = "Santiago".to_string();
        let handle = CalendarHandle::ready(CalendarPorts::shared(Arc::new(InMemoryCalendar::new())));

        assert!(matches!(
            BookingEngine::new(Arc::new(cfg), Arc::new(handle)),
            Err(BookingError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_lazy_handle_without_credentials_is_a_config_error() {
        let cfg = config(AvailabilityMode::AnyEvent);
        let handle = CalendarHandle::lazy(cfg.google.clone());
        assert!(matches!(handle.get().await, Err(BookingError::Config(_))));
    }
}
