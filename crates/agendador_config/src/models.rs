// --- File: crates/agendador_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Google Calendar Config ---
// Credentials are either a service-account key file or an authorized-user
// refresh token. Secrets are usually injected via "secret_from_env".
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    pub calendar_id: String, // Mandatory
    pub key_path: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>, // GOOGLE_CLIENT_SECRET
    pub refresh_token: Option<String>, // GOOGLE_REFRESH_TOKEN
    /// Extra attendee copied on every booking (e.g. the business inbox).
    pub notify_email: Option<String>,
    /// Override for the Calendar v3 REST root, used by tests.
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

/// Which calendar entries block a slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AvailabilityMode {
    /// Only events this service created (tagged with the creator marker).
    #[serde(alias = "created-only")]
    SelfCreatedOnly,
    /// Every busy interval reported by free/busy, regardless of origin.
    AnyEvent,
}

impl AvailabilityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityMode::SelfCreatedOnly => "self-created-only",
            AvailabilityMode::AnyEvent => "any-event",
        }
    }
}

impl fmt::Display for AvailabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AvailabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "self-created-only" | "created-only" => Ok(AvailabilityMode::SelfCreatedOnly),
            "any-event" => Ok(AvailabilityMode::AnyEvent),
            other => Err(format!(
                "unknown availability mode '{other}' (expected 'self-created-only' or 'any-event')"
            )),
        }
    }
}

fn default_creator_tag() -> String {
    "agendador".to_string()
}

// --- Booking Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA zone used when a request does not carry one.
    pub time_zone: String,
    /// Fixed slot length for this deployment.
    pub duration_minutes: u32,
    /// Required: there is deliberately no fallback mode.
    pub availability_mode: AvailabilityMode,
    #[serde(default = "default_creator_tag")]
    pub creator_tag: String,
    pub business_name: String,
    pub slot_start: String, // "HH:mm"
    pub slot_end: String,   // "HH:mm", inclusive
    pub slot_step_minutes: u32,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub log_level: Option<String>,
    pub google: GoogleConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.google.calendar_id.trim().is_empty() {
            return Err("google.calendar_id must not be empty".to_string());
        }
        if self.booking.duration_minutes == 0 {
            return Err("booking.duration_minutes must be positive".to_string());
        }
        if self.booking.slot_step_minutes == 0 {
            return Err("booking.slot_step_minutes must be positive".to_string());
        }
        if self.booking.creator_tag.trim().is_empty() {
            return Err("booking.creator_tag must not be empty".to_string());
        }
        Ok(())
    }
}
