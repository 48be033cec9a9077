use crate::GarminError;
use std::time::Duration;

pub const DEFAULT_SSO_URL: &str = "https://sso.garmin.com";
pub const DEFAULT_API_URL: &str = "https://connectapi.garmin.com";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub sso_url: String,
    pub api_url: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sso_url: DEFAULT_SSO_URL.into(),
            api_url: DEFAULT_API_URL.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, GarminError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, GarminError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let sso_url = get("GARMIN_SSO_URL").unwrap_or_else(|| DEFAULT_SSO_URL.into());
        let api_url = get("GARMIN_CONNECT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());

        let page_size = match get("GARMIN_PAGE_SIZE") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(GarminError::Config(format!(
                        "GARMIN_PAGE_SIZE must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout_secs = match get("GARMIN_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                GarminError::Config(format!(
                    "GARMIN_HTTP_TIMEOUT_SECS must be an integer, got {raw:?}"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            sso_url,
            api_url,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_uses_defaults() {
        let cfg = Config::from_env_with(|_| None).expect("cfg");
        assert_eq!(cfg.sso_url, DEFAULT_SSO_URL);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.page_size, 20);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn from_env_reads_values() {
        let get = |k: &str| match k {
            "GARMIN_SSO_URL" => Some("http://sso.local".into()),
            "GARMIN_CONNECT_API_URL" => Some("http://api.local".into()),
            "GARMIN_PAGE_SIZE" => Some("50".into()),
            "GARMIN_HTTP_TIMEOUT_SECS" => Some("5".into()),
            _ => None,
        };
        let cfg = Config::from_env_with(get).expect("cfg");
        assert_eq!(cfg.sso_url, "http://sso.local");
        assert_eq!(cfg.api_url, "http://api.local");
        assert_eq!(cfg.page_size, 50);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[test]
    fn from_env_rejects_zero_page_size() {
        let get = |k: &str| (k == "GARMIN_PAGE_SIZE").then(|| "0".to_string());
        assert!(matches!(
            Config::from_env_with(get),
            Err(GarminError::Config(_))
        ));
    }

    #[test]
    fn from_env_rejects_bad_timeout() {
        let get = |k: &str| (k == "GARMIN_HTTP_TIMEOUT_SECS").then(|| "soon".to_string());
        assert!(Config::from_env_with(get).is_err());
    }
}
