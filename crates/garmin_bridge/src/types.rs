//! Request, response and activity record shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /api/garmin/auth`.
#[derive(Clone, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub status: String,
}

impl AuthResponse {
    pub fn authenticated() -> Self {
        Self {
            status: "authenticated".to_string(),
        }
    }
}

/// Normalized per-activity record returned to API consumers.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActivitySummary {
    pub activity_id: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub date: Option<String>,
    pub duration: Option<f64>,
    pub distance: Option<f64>,
    pub calories: Option<f64>,
    pub avg_hr: Option<f64>,
    pub max_hr: Option<f64>,
    pub training_load: Option<f64>,
}

/// Subset of a provider activity record. Unknown fields are ignored and any
/// missing, `null` or unusable field stays `None`, so one odd record never
/// costs the rest of the batch. Numeric strings such as `"450"` are read as
/// numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawActivity {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub activity_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub activity_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_type_key")]
    pub activity_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time_local: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub calories: Option<f64>,
    #[serde(rename = "averageHR", default, deserialize_with = "lenient_f64")]
    pub average_hr: Option<f64>,
    #[serde(rename = "maxHR", default, deserialize_with = "lenient_f64")]
    pub max_hr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub training_load_peak: Option<f64>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// `activityType` is an object; only its string `typeKey` is kept.
fn lenient_type_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.get("typeKey"))
        .and_then(Value::as_str)
        .map(str::to_string))
}

impl From<RawActivity> for ActivitySummary {
    fn from(raw: RawActivity) -> Self {
        Self {
            activity_id: raw.activity_id,
            name: raw.activity_name,
            activity_type: raw.activity_type,
            date: raw.start_time_local,
            duration: raw.duration,
            distance: raw.distance,
            calories: raw.calories,
            avg_hr: raw.average_hr,
            max_hr: raw.max_hr,
            training_load: raw.training_load_peak,
        }
    }
}
