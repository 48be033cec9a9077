//! Activity query adapter.
//!
//! Turns a date range into one provider query and normalizes the raw
//! records into [`ActivitySummary`] values.

use std::sync::Arc;

use chrono::NaiveDateTime;
use garmin_connect_client::{DateRange, GarminClient, GarminSession};
use tracing::{debug, warn};

use crate::Clock;
use crate::error::QueryError;
use crate::types::{ActivitySummary, RawActivity};

pub struct ActivityService {
    client: Arc<dyn GarminClient>,
    clock: Clock,
}

impl ActivityService {
    pub fn new(client: Arc<dyn GarminClient>, clock: Clock) -> Self {
        Self { client, clock }
    }

    /// Current local time according to the service clock.
    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Fetch activities between `start_date` and `end_date` (both inclusive,
    /// compared by calendar day). `end_date` defaults to now.
    pub async fn get_activities(
        &self,
        session: Option<&GarminSession>,
        start_date: NaiveDateTime,
        end_date: Option<NaiveDateTime>,
    ) -> Result<Vec<ActivitySummary>, QueryError> {
        let session = session.ok_or(QueryError::NoSession)?;
        let end_date = end_date.unwrap_or_else(|| self.now());
        let range = DateRange::new(start_date.date(), end_date.date());
        debug!(
            start = %range.start_param(),
            end = %range.end_param(),
            "querying activities"
        );

        let records = self
            .client
            .get_activities_by_date(session, &range, None)
            .await?;
        map_records(records)
    }

    /// Same as [`get_activities`](Self::get_activities) but any failure is
    /// logged and reported as an empty list.
    pub async fn get_activities_or_empty(
        &self,
        session: Option<&GarminSession>,
        start_date: NaiveDateTime,
        end_date: Option<NaiveDateTime>,
    ) -> Vec<ActivitySummary> {
        match self.get_activities(session, start_date, end_date).await {
            Ok(activities) => activities,
            Err(e) => {
                warn!(error = %e, "error fetching activities");
                Vec::new()
            }
        }
    }
}

/// Map raw provider records in order. A record that is not an object, or
/// whose known fields have the wrong JSON type, fails the whole batch.
pub fn map_records(records: Vec<serde_json::Value>) -> Result<Vec<ActivitySummary>, QueryError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<RawActivity>(record)
                .map(ActivitySummary::from)
                .map_err(|source| QueryError::Mapping { index, source })
        })
        .collect()
}
