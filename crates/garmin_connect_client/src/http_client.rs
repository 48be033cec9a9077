//! HTTP client implementation for Garmin Connect.
//!
//! This module provides a reqwest-based implementation of the [`GarminClient`](crate::GarminClient) trait.
//! Login follows the embedded SSO widget flow: fetch the sign-in page for its
//! CSRF token, post the credentials, then exchange the returned service ticket
//! for an API access token.

use crate::config::Config;
use crate::utils::body_snippet;
use crate::{Credentials, DateRange, GarminClient, GarminError, GarminSession};
use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

static CSRF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"name="_csrf"\s+value="([^"]+)""#).expect("csrf pattern is valid")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>([^<]*)</title>").expect("title pattern is valid"));
static TICKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"embed\?ticket=([^"&]+)""#).expect("ticket pattern is valid"));

const ACTIVITY_SEARCH_PATH: &str = "/activitylist-service/activities/search/activities";
const TICKET_EXCHANGE_PATH: &str = "/oauth-service/oauth/exchange/ticket";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Client for Garmin Connect using reqwest.
///
/// The shared `client` carries no cookies and only serves bearer-auth API
/// calls. Every login builds its own cookie-enabled client, so SSO cookies
/// from one account never reach another account's handshake.
#[derive(Clone, Debug)]
pub struct ReqwestGarminClient {
    sso_url: String,
    api_url: String,
    page_size: u32,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl ReqwestGarminClient {
    /// Create a new client instance with default paging and no request timeout.
    ///
    /// # Arguments
    /// * `sso_url` - Base URL of the SSO service (e.g., "https://sso.garmin.com")
    /// * `api_url` - Base URL of the Connect API (e.g., "https://connectapi.garmin.com")
    pub fn new(sso_url: &str, api_url: &str) -> Result<Self, GarminError> {
        Self::build(sso_url, api_url, crate::config::DEFAULT_PAGE_SIZE, None)
    }

    /// Build a client from [`Config`], applying its timeout and page size.
    pub fn from_config(config: &Config) -> Result<Self, GarminError> {
        Self::build(
            &config.sso_url,
            &config.api_url,
            config.page_size,
            Some(config.timeout),
        )
    }

    fn build(
        sso_url: &str,
        api_url: &str,
        page_size: u32,
        timeout: Option<Duration>,
    ) -> Result<Self, GarminError> {
        let client = http_builder(timeout)
            .build()
            .map_err(|e| GarminError::Config(e.to_string()))?;
        Ok(Self {
            sso_url: sso_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
            timeout,
            client,
        })
    }

    /// Fresh client with its own cookie jar for one SSO handshake.
    fn sso_client(&self) -> Result<reqwest::Client, GarminError> {
        http_builder(self.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| GarminError::Config(e.to_string()))
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn embed_url(&self) -> String {
        format!("{}/sso/embed", self.sso_url)
    }

    fn signin_params(&self) -> Vec<(&'static str, String)> {
        let embed = self.embed_url();
        vec![
            ("id", "gauth-widget".to_string()),
            ("embedWidget", "true".to_string()),
            ("gauthHost", embed.clone()),
            ("service", embed.clone()),
            ("source", embed.clone()),
            ("redirectAfterAccountLoginUrl", embed.clone()),
            ("redirectAfterAccountCreationUrl", embed),
        ]
    }

    /// Build an authenticated GET request.
    fn get_request(&self, session: &GarminSession, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(session.access_token().expose_secret())
    }

    /// Execute a request and expect a text response.
    async fn execute_text(&self, request: reqwest::RequestBuilder) -> Result<String, GarminError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.text().await?)
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GarminError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| GarminError::Decode(e.to_string()))
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> GarminError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        GarminError::from_status(status, body_snippet(&body))
    }

    async fn fetch_csrf_token(&self, sso: &reqwest::Client) -> Result<String, GarminError> {
        let url = format!("{}/sso/signin", self.sso_url);
        let html = self
            .execute_text(sso.get(&url).query(&self.signin_params()))
            .await?;
        extract_csrf(&html).ok_or_else(|| GarminError::Decode("csrf token not found".into()))
    }

    async fn submit_credentials(
        &self,
        sso: &reqwest::Client,
        credentials: &Credentials,
        csrf: &str,
    ) -> Result<String, GarminError> {
        let url = format!("{}/sso/signin", self.sso_url);
        let form = [
            ("username", credentials.email.as_str()),
            ("password", credentials.password.expose_secret()),
            ("embed", "true"),
            ("_csrf", csrf),
        ];
        let html = self
            .execute_text(
                sso.post(&url)
                    .query(&self.signin_params())
                    .form(&form),
            )
            .await?;

        match extract_title(&html) {
            Some(title) if title == "Success" => {}
            Some(title) => {
                return Err(GarminError::Authentication(format!(
                    "sign-in returned {title:?}"
                )));
            }
            None => return Err(GarminError::Decode("sign-in page has no title".into())),
        }
        extract_ticket(&html).ok_or_else(|| GarminError::Decode("service ticket not found".into()))
    }

    async fn exchange_ticket(
        &self,
        sso: &reqwest::Client,
        ticket: &str,
    ) -> Result<TokenResponse, GarminError> {
        let url = format!("{}{}", self.api_url, TICKET_EXCHANGE_PATH);
        let login_url = self.embed_url();
        let form = [("ticket", ticket), ("login-url", login_url.as_str())];
        self.execute_json(sso.post(&url).form(&form)).await
    }
}

fn http_builder(timeout: Option<Duration>) -> reqwest::ClientBuilder {
    let builder = reqwest::Client::builder();
    match timeout {
        Some(t) => builder.timeout(t),
        None => builder,
    }
}

fn extract_csrf(html: &str) -> Option<String> {
    CSRF_RE.captures(html).map(|c| c[1].to_string())
}

fn extract_title(html: &str) -> Option<String> {
    TITLE_RE.captures(html).map(|c| c[1].trim().to_string())
}

fn extract_ticket(html: &str) -> Option<String> {
    TICKET_RE.captures(html).map(|c| c[1].to_string())
}

#[async_trait]
impl GarminClient for ReqwestGarminClient {
    async fn login(&self, credentials: &Credentials) -> Result<GarminSession, GarminError> {
        let sso = self.sso_client()?;
        let csrf = self.fetch_csrf_token(&sso).await?;
        let ticket = self.submit_credentials(&sso, credentials, &csrf).await?;
        let token = self.exchange_ticket(&sso, &ticket).await?;
        info!(display_name = ?token.display_name, "garmin login succeeded");
        Ok(GarminSession::new(
            SecretString::new(token.access_token.into_boxed_str()),
            token.display_name,
        ))
    }

    async fn get_activities_by_date(
        &self,
        session: &GarminSession,
        range: &DateRange,
        activity_type: Option<&str>,
    ) -> Result<Vec<serde_json::Value>, GarminError> {
        let url = format!("{}{}", self.api_url, ACTIVITY_SEARCH_PATH);
        let mut activities = Vec::new();
        let mut start = 0u32;

        loop {
            let mut pairs: Vec<(&str, String)> = vec![
                ("startDate", range.start_param()),
                ("endDate", range.end_param()),
                ("start", start.to_string()),
                ("limit", self.page_size.to_string()),
            ];
            if let Some(t) = activity_type {
                pairs.push(("activityType", t.to_string()));
            }
            let page: Vec<serde_json::Value> = self
                .execute_json(self.get_request(session, &url).query(&pairs))
                .await?;
            let fetched = page.len();
            debug!(start, fetched, "fetched activity page");
            activities.extend(page);

            if fetched < self.page_size as usize {
                break;
            }
            start += self.page_size;
        }

        Ok(activities)
    }
}
