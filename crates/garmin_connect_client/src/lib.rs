//! Minimal `GarminClient` trait and the types that cross the provider boundary.

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::SecretString;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod observability;
pub mod utils;

#[derive(Debug, Error)]
pub enum GarminError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("too many requests: {0}")]
    TooManyRequests(String),
    #[error("api error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl GarminError {
    /// Map a non-success status code and (truncated) body to an error.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => GarminError::Authentication(body),
            429 => GarminError::TooManyRequests(body),
            _ => GarminError::Api { status, body },
        }
    }
}

impl From<reqwest::Error> for GarminError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            GarminError::Connection(err.to_string())
        } else if err.is_decode() {
            GarminError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GarminError::from_status(status.as_u16(), err.to_string())
        } else {
            GarminError::Http(err)
        }
    }
}

/// Account credentials for the SSO login handshake.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }
}

/// Authenticated handle returned by [`GarminClient::login`].
#[derive(Clone, Debug)]
pub struct GarminSession {
    access_token: SecretString,
    display_name: Option<String>,
}

impl GarminSession {
    pub fn new(access_token: SecretString, display_name: Option<String>) -> Self {
        Self {
            access_token,
            display_name,
        }
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Inclusive calendar date range for activity queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `startDate` query value, `YYYY-MM-DD`.
    pub fn start_param(&self) -> String {
        utils::format_provider_date(self.start)
    }

    /// `endDate` query value, `YYYY-MM-DD`.
    pub fn end_param(&self) -> String {
        utils::format_provider_date(self.end)
    }
}

#[async_trait]
pub trait GarminClient: Send + Sync + 'static {
    /// Perform the login handshake and return a session handle.
    async fn login(&self, credentials: &Credentials) -> Result<GarminSession, GarminError>;

    /// Fetch raw activity records whose start date falls inside `range`.
    ///
    /// Records are returned as the provider sends them, in provider order.
    /// Implementations page internally; callers see one logical query.
    async fn get_activities_by_date(
        &self,
        session: &GarminSession,
        range: &DateRange,
        activity_type: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, GarminError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn from_status_maps_auth_and_rate_limit() {
        assert!(matches!(
            GarminError::from_status(401, "x".into()),
            GarminError::Authentication(_)
        ));
        assert!(matches!(
            GarminError::from_status(403, "x".into()),
            GarminError::Authentication(_)
        ));
        assert!(matches!(
            GarminError::from_status(429, "slow down".into()),
            GarminError::TooManyRequests(_)
        ));
        match GarminError::from_status(500, "boom".into()) {
            GarminError::Api { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.c", "hunter2");
        assert_eq!(creds.password.expose_secret(), "hunter2");
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn date_range_params_use_iso_dates() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        );
        assert_eq!(range.start_param(), "2024-06-03");
        assert_eq!(range.end_param(), "2024-06-10");
    }
}
