//! Shared mock `GarminClient` used by unit tests.
#![cfg(test)]

use std::sync::Mutex;

use async_trait::async_trait;
use garmin_connect_client::{
    Credentials, DateRange, GarminClient, GarminError, GarminSession,
};
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone, Debug)]
pub enum LoginOutcome {
    Accept(String),
    Reject,
    RateLimit,
    Offline,
    Garbled,
}

#[derive(Clone, Debug)]
pub enum QueryOutcome {
    Records(Vec<serde_json::Value>),
    Fail,
}

/// Scriptable client that records every activity query it receives.
pub struct MockClient {
    login: Mutex<LoginOutcome>,
    query: Mutex<QueryOutcome>,
    queries: Mutex<Vec<(String, DateRange)>>,
}

impl MockClient {
    fn with_login(outcome: LoginOutcome) -> Self {
        Self {
            login: Mutex::new(outcome),
            query: Mutex::new(QueryOutcome::Records(vec![])),
            queries: Mutex::new(vec![]),
        }
    }

    pub fn accepting(token: &str) -> Self {
        Self::with_login(LoginOutcome::Accept(token.to_string()))
    }

    pub fn rejecting() -> Self {
        Self::with_login(LoginOutcome::Reject)
    }

    pub fn rate_limited() -> Self {
        Self::with_login(LoginOutcome::RateLimit)
    }

    pub fn offline() -> Self {
        Self::with_login(LoginOutcome::Offline)
    }

    pub fn garbled() -> Self {
        Self::with_login(LoginOutcome::Garbled)
    }

    pub fn with_records(self, records: Vec<serde_json::Value>) -> Self {
        *self.query.lock().unwrap() = QueryOutcome::Records(records);
        self
    }

    pub fn failing_queries(self) -> Self {
        *self.query.lock().unwrap() = QueryOutcome::Fail;
        self
    }

    pub fn set_login_outcome(&self, outcome: LoginOutcome) {
        *self.login.lock().unwrap() = outcome;
    }

    pub fn set_login_token(&self, token: &str) {
        self.set_login_outcome(LoginOutcome::Accept(token.to_string()));
    }

    /// `(access token, range)` for every activity query so far.
    pub fn queries(&self) -> Vec<(String, DateRange)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl GarminClient for MockClient {
    async fn login(&self, _credentials: &Credentials) -> Result<GarminSession, GarminError> {
        let outcome = self.login.lock().unwrap().clone();
        match outcome {
            LoginOutcome::Accept(token) => Ok(GarminSession::new(
                SecretString::new(token.into_boxed_str()),
                Some("Test Athlete".to_string()),
            )),
            LoginOutcome::Reject => Err(GarminError::Authentication("bad credentials".into())),
            LoginOutcome::RateLimit => Err(GarminError::TooManyRequests("429".into())),
            LoginOutcome::Offline => Err(GarminError::Connection("connection refused".into())),
            LoginOutcome::Garbled => Err(GarminError::Decode("csrf token not found".into())),
        }
    }

    async fn get_activities_by_date(
        &self,
        session: &GarminSession,
        range: &DateRange,
        _activity_type: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, GarminError> {
        self.queries
            .lock()
            .unwrap()
            .push((session.access_token().expose_secret().to_string(), *range));
        match self.query.lock().unwrap().clone() {
            QueryOutcome::Records(records) => Ok(records),
            QueryOutcome::Fail => Err(GarminError::Api {
                status: 500,
                body: "boom".into(),
            }),
        }
    }
}
