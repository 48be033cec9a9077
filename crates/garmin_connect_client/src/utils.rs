//! Utility functions for date formatting and response handling.

use chrono::NaiveDate;

/// Date format the activity search endpoint expects.
pub const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_BODY_SNIPPET: usize = 256;

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_provider_date(date: NaiveDate) -> String {
    date.format(PROVIDER_DATE_FORMAT).to_string()
}

/// Keep at most the first 256 characters of an error body.
pub fn body_snippet(body: &str) -> String {
    body.chars().take(MAX_BODY_SNIPPET).collect()
}
