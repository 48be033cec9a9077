//! Backend bridge between a frontend and a Garmin Connect account.
//!
//! [`session::SessionManager`] owns the single authenticated session,
//! [`activities::ActivityService`] turns date ranges into provider queries and
//! [`routes::router`] exposes both over HTTP.

use std::sync::Arc;

use chrono::NaiveDateTime;
use garmin_connect_client::GarminClient;
use garmin_connect_client::config::Config;
use garmin_connect_client::http_client::ReqwestGarminClient;
use tracing::info;

pub mod activities;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod types;

mod test_utils;

pub use activities::ActivityService;
pub use error::{ApiError, AuthError, BridgeError, BridgeResult, QueryError};
pub use session::SessionManager;
pub use types::ActivitySummary;

use middleware::LoggingMiddleware;

/// Source of the current local time.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Wall clock in the server's local timezone.
pub fn local_clock() -> Clock {
    Arc::new(|| chrono::Local::now().naive_local())
}

/// Clock frozen at `at`.
pub fn fixed_clock(at: NaiveDateTime) -> Clock {
    Arc::new(move || at)
}

/// Build the provider client from configuration read through `get`, wrapped
/// in [`LoggingMiddleware`].
pub fn provider_client<F>(get: F) -> BridgeResult<Arc<dyn GarminClient>>
where
    F: FnMut(&str) -> Option<String>,
{
    let config = Config::from_env_with(get)?;
    info!(
        sso_url = %config.sso_url,
        api_url = %config.api_url,
        page_size = config.page_size,
        "garmin_bridge: provider configuration"
    );
    let client = ReqwestGarminClient::from_config(&config)?;
    Ok(Arc::new(LoggingMiddleware::new(client)))
}
