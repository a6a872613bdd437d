// --- File: crates/agendador_gcal/src/service.rs ---
//! Google Calendar v3 REST adapter.
//!
//! Implements the calendar ports with plain HTTPS calls. Event start and end are
//! sent as local wall time plus a `timeZone` field, so the provider resolves the
//! offset.

use agendador_common::{
    BookingError, BoxFuture, BusyWindow, CalendarEvent, CalendarPortError, CalendarReader,
    CalendarWriter, NewCalendarEvent, SharedProperty, TaggedEvent, CREATED_BY_PROPERTY,
    SLOT_KEY_PROPERTY,
};
use agendador_config::GoogleConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{token_source_from_config, TokenSource};

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PAGE_SIZE: &str = "250";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: String,
    extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtendedProperties {
    #[serde(default)]
    shared: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<ApiBusy>,
    #[serde(default)]
    errors: Vec<ApiCalendarError>,
}

#[derive(Debug, Deserialize)]
struct ApiBusy {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApiCalendarError {
    #[serde(default)]
    domain: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: String,
    html_link: Option<String>,
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Google Calendar service implementation.
#[derive(Clone)]
pub struct GoogleCalendarService {
    client: Client,
    base_url: Url,
    tokens: TokenSource,
}

impl GoogleCalendarService {
    pub fn new(
        tokens: TokenSource,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CalendarPortError> {
        let base = base_url.unwrap_or(DEFAULT_API_BASE_URL);
        let base_url = Url::parse(base)
            .map_err(|e| CalendarPortError::Transport(format!("invalid api base url '{base}': {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarPortError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            tokens,
        })
    }

    /// Resolves credentials and builds the client from configuration.
    pub async fn from_config(config: &GoogleConfig) -> Result<Self, BookingError> {
        let tokens = token_source_from_config(config).await?;
        let timeout = Duration::from_secs(config.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        GoogleCalendarService::new(tokens, config.api_base_url.as_deref(), timeout)
            .map_err(|e| BookingError::Config(e.to_string()))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, CalendarPortError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CalendarPortError::Transport(format!("api base url '{}' cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CalendarPortError> {
        let token = self.tokens.token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CalendarPortError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(if status == StatusCode::UNAUTHORIZED {
                CalendarPortError::Credential(detail)
            } else {
                CalendarPortError::Provider {
                    status: status.as_u16(),
                    detail,
                }
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CalendarPortError::Decode(e.to_string()))
    }
}

impl CalendarReader for GoogleCalendarService {
    fn list_events_by_shared_property<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        property: &'a SharedProperty,
    ) -> BoxFuture<'a, Vec<TaggedEvent>, CalendarPortError> {
        Box::pin(async move {
            let url = self.endpoint(&["calendars", calendar_id, "events"])?;
            let filter = property.to_string();
            let mut page_token: Option<String> = None;
            let mut events = Vec::new();

            loop {
                let mut request = self.client.get(url.clone()).query(&[
                    ("timeMin", rfc3339(time_min).as_str()),
                    ("timeMax", rfc3339(time_max).as_str()),
                    ("singleEvents", "true"),
                    ("maxResults", PAGE_SIZE),
                    ("sharedExtendedProperty", filter.as_str()),
                ]);
                if let Some(token) = &page_token {
                    request = request.query(&[("pageToken", token.as_str())]);
                }

                let page: EventsPage = self.send(request).await?;
                events.extend(page.items.into_iter().map(|ev| {
                    let mut shared = ev.extended_properties.unwrap_or_default().shared;
                    TaggedEvent {
                        id: ev.id,
                        slot_key: shared.remove(SLOT_KEY_PROPERTY),
                        created_by: shared.remove(CREATED_BY_PROPERTY),
                    }
                }));

                match page.next_page_token {
                    Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                        return Err(CalendarPortError::Decode(format!(
                            "event listing repeated page token {next}"
                        )));
                    }
                    Some(next) => page_token = Some(next),
                    None => break,
                }
            }

            debug!("{} events tagged {} on {}", events.len(), filter, calendar_id);
            Ok(events)
        })
    }

    fn query_free_busy<'a>(
        &'a self,
        calendar_id: &'a str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        time_zone: &'a str,
    ) -> BoxFuture<'a, Vec<BusyWindow>, CalendarPortError> {
        Box::pin(async move {
            let url = self.endpoint(&["freeBusy"])?;
            let body = json!({
                "timeMin": rfc3339(time_min),
                "timeMax": rfc3339(time_max),
                "timeZone": time_zone,
                "items": [{ "id": calendar_id }],
            });

            let mut response: FreeBusyResponse =
                self.send(self.client.post(url).json(&body)).await?;
            let calendar = response.calendars.remove(calendar_id).ok_or_else(|| {
                CalendarPortError::Decode(format!("free/busy answer has no entry for {calendar_id}"))
            })?;

            if let Some(err) = calendar.errors.first() {
                return Err(CalendarPortError::Provider {
                    status: 200,
                    detail: format!("free/busy for {calendar_id} failed: {} ({})", err.reason, err.domain),
                });
            }

            let windows = calendar
                .busy
                .into_iter()
                .filter_map(|b| {
                    let window = BusyWindow::new(b.start, b.end);
                    if window.is_none() {
                        warn!("discarding busy window {} .. {} with start >= end", b.start, b.end);
                    }
                    window
                })
                .collect();
            Ok(windows)
        })
    }
}

impl CalendarWriter for GoogleCalendarService {
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'a, CalendarEvent, CalendarPortError> {
        Box::pin(async move {
            let url = self.endpoint(&["calendars", calendar_id, "events"])?;
            let attendees: Vec<_> = event
                .attendees
                .iter()
                .map(|email| json!({ "email": email }))
                .collect();
            let body = json!({
                "summary": event.summary,
                "description": event.description,
                "start": {
                    "dateTime": event.start.date_time.format(LOCAL_DATE_TIME_FORMAT).to_string(),
                    "timeZone": event.start.time_zone,
                },
                "end": {
                    "dateTime": event.end.date_time.format(LOCAL_DATE_TIME_FORMAT).to_string(),
                    "timeZone": event.end.time_zone,
                },
                "attendees": attendees,
                "reminders": { "useDefault": true },
                "extendedProperties": {
                    "shared": {
                        SLOT_KEY_PROPERTY: event.slot_key,
                        CREATED_BY_PROPERTY: event.created_by,
                    }
                },
            });

            let request = self
                .client
                .post(url)
                .query(&[("sendUpdates", "all")])
                .json(&body);
            let inserted: InsertedEvent = self.send(request).await?;

            Ok(CalendarEvent {
                id: inserted.id,
                html_link: inserted.html_link,
                slot_key: event.slot_key,
            })
        })
    }
}
