// File: crates/agendador_gcal/src/auth.rs
//! Bearer tokens for the Calendar API.
//!
//! yup-oauth2 caches and refreshes tokens; [`TokenSource`] hides which flow
//! produced the authenticator.

use agendador_common::{config_error, BookingError, BoxFuture, CalendarPortError};
use agendador_config::GoogleConfig;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use yup_oauth2::authorized_user::AuthorizedUserSecret;
use yup_oauth2::{read_service_account_key, AuthorizedUserAuthenticator, ServiceAccountAuthenticator};

pub const CALENDAR_SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/calendar"];

type FetchToken = dyn Fn() -> BoxFuture<'static, String, CalendarPortError> + Send + Sync;

/// Produces an access token per call.
#[derive(Clone)]
pub struct TokenSource {
    fetch: Arc<FetchToken>,
}

impl TokenSource {
    /// A source that always yields the same token.
    pub fn fixed(token: impl Into<String>) -> Self {
        let token = token.into();
        TokenSource {
            fetch: Arc::new(move || -> BoxFuture<'static, String, CalendarPortError> {
                let token = token.clone();
                Box::pin(async move { Ok(token) })
            }),
        }
    }

    pub async fn token(&self) -> Result<String, CalendarPortError> {
        (self.fetch)().await
    }
}

macro_rules! token_source_from_authenticator {
    ($auth:expr) => {{
        let auth = Arc::new($auth);
        TokenSource {
            fetch: Arc::new(move || -> BoxFuture<'static, String, CalendarPortError> {
                let auth = auth.clone();
                Box::pin(async move {
                    let token = auth
                        .token(&CALENDAR_SCOPES[..])
                        .await
                        .map_err(|e| CalendarPortError::Credential(e.to_string()))?;
                    token
                        .token()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            CalendarPortError::Credential("token response without access token".into())
                        })
                })
            }),
        }
    }};
}

/// Service-account key file flow.
pub async fn service_account_token_source(key_path: &str) -> Result<TokenSource, CalendarPortError> {
    let key = read_service_account_key(Path::new(key_path))
        .await
        .map_err(|e| CalendarPortError::Credential(format!("cannot read {key_path}: {e}")))?;
    let auth = ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .map_err(|e| CalendarPortError::Credential(e.to_string()))?;
    Ok(token_source_from_authenticator!(auth))
}

/// Refresh-token flow for a user who granted calendar access.
pub async fn authorized_user_token_source(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenSource, CalendarPortError> {
    let secret = AuthorizedUserSecret {
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
        refresh_token: refresh_token.to_string(),
        key_type: "authorized_user".to_string(),
    };
    let auth = AuthorizedUserAuthenticator::builder(secret)
        .build()
        .await
        .map_err(|e| CalendarPortError::Credential(e.to_string()))?;
    Ok(token_source_from_authenticator!(auth))
}

/// Picks the flow from configuration: a key file wins over refresh-token fields.
pub async fn token_source_from_config(config: &GoogleConfig) -> Result<TokenSource, BookingError> {
    let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(key_path) = present(&config.key_path) {
        info!("using service account credentials from {}", key_path);
        return service_account_token_source(&key_path)
            .await
            .map_err(|e| e.into_read_error());
    }

    match (
        present(&config.client_id),
        present(&config.client_secret),
        present(&config.refresh_token),
    ) {
        (Some(id), Some(secret), Some(refresh)) => {
            info!("using authorized user credentials for client {}", id);
            authorized_user_token_source(&id, &secret, &refresh)
                .await
                .map_err(|e| e.into_read_error())
        }
        _ => Err(config_error(
            "google credentials missing: set key_path or client_id, client_secret and refresh_token",
        )),
    }
}
