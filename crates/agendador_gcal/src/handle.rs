// --- File: crates/agendador_gcal/src/handle.rs ---
use agendador_common::{config_error, BookingError, CalendarReader, CalendarWriter};
use agendador_config::GoogleConfig;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use crate::service::GoogleCalendarService;

/// Both calendar ports, usually backed by one client.
#[derive(Clone)]
pub struct CalendarPorts {
    pub reader: Arc<dyn CalendarReader>,
    pub writer: Arc<dyn CalendarWriter>,
}

impl CalendarPorts {
    pub fn shared<C>(calendar: Arc<C>) -> Self
    where
        C: CalendarReader + CalendarWriter + 'static,
    {
        Self {
            reader: calendar.clone(),
            writer: calendar,
        }
    }
}

/// Calendar client built on first use and reused for the life of the process.
///
/// A failed build is not cached; the next request tries again.
pub struct CalendarHandle {
    ports: OnceCell<CalendarPorts>,
    google: Option<GoogleConfig>,
}

impl CalendarHandle {
    pub fn lazy(google: GoogleConfig) -> Self {
        Self {
            ports: OnceCell::new(),
            google: Some(google),
        }
    }

    /// A handle around already built ports.
    pub fn ready(ports: CalendarPorts) -> Self {
        Self {
            ports: OnceCell::new_with(Some(ports)),
            google: None,
        }
    }

    pub async fn get(&self) -> Result<&CalendarPorts, BookingError> {
        self.ports
            .get_or_try_init(|| async {
                let google = self
                    .google
                    .as_ref()
                    .ok_or_else(|| config_error("no calendar client configured"))?;
                let service = GoogleCalendarService::from_config(google).await?;
                info!("google calendar client ready for {}", google.calendar_id);
                Ok::<_, BookingError>(CalendarPorts::shared(Arc::new(service)))
            })
            .await
    }
}
