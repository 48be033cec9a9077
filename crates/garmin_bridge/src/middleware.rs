//! Logging and metrics wrapper around a [`GarminClient`].

use std::sync::Arc;
use std::time::Instant;

use garmin_connect_client::{Credentials, DateRange, GarminClient, GarminError, GarminSession};
use tracing::debug;

/// Delegates every call to the inner client, logging timings at `debug`
/// and recording `garmin_client_requests_total` and
/// `garmin_client_request_duration_seconds`.
#[derive(Clone)]
pub struct LoggingMiddleware<C: GarminClient> {
    inner: Arc<C>,
}

impl<C: GarminClient> LoggingMiddleware<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    async fn with_logging<F, Fut, T>(
        &self,
        operation: F,
        name: &'static str,
    ) -> Result<T, GarminError>
    where
        F: FnOnce(Arc<C>) -> Fut,
        Fut: std::future::Future<Output = Result<T, GarminError>>,
    {
        let start = Instant::now();
        debug!("Starting operation: {}", name);

        let result = operation(self.inner.clone()).await;

        let duration = start.elapsed();
        let outcome = match &result {
            Ok(_) => {
                debug!(
                    "Operation completed successfully: {} in {:?}",
                    name, duration
                );
                "ok"
            }
            Err(e) => {
                debug!(
                    "Operation failed: {} in {:?} - error: {}",
                    name, duration, e
                );
                "error"
            }
        };
        metrics::counter!(
            "garmin_client_requests_total",
            "operation" => name,
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("garmin_client_request_duration_seconds", "operation" => name)
            .record(duration.as_secs_f64());

        result
    }
}

#[async_trait::async_trait]
impl<C: GarminClient + 'static> GarminClient for LoggingMiddleware<C> {
    async fn login(&self, credentials: &Credentials) -> Result<GarminSession, GarminError> {
        self.with_logging(
            |client| async move { client.login(credentials).await },
            "login",
        )
        .await
    }

    async fn get_activities_by_date(
        &self,
        session: &GarminSession,
        range: &DateRange,
        activity_type: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, GarminError> {
        self.with_logging(
            |client| async move {
                client
                    .get_activities_by_date(session, range, activity_type)
                    .await
            },
            "get_activities_by_date",
        )
        .await
    }
}
