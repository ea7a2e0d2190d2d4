//! Portal login and the authenticated HTTP session.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{DiaryPortal, EntryPage, ListingResponse};
use crate::config::PortalConfig;
use crate::error::{DiaryError, Result};
use crate::payload::SubmissionPayload;

pub const EMAIL_ENV: &str = "INTERNYET_EMAIL";
pub const PASSWORD_ENV: &str = "INTERNYET_PASSWORD";

const LOGIN_PATH: &str = "/auth/login";
const DIARIES_PATH: &str = "/student/internship-diaries";
const STORE_PATH: &str = "/student/internship-diaries/store";

/// Longest response body quoted in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read `INTERNYET_EMAIL` / `INTERNYET_PASSWORD` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            env(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| DiaryError::MissingConfig(key.to_string()))
        };
        Ok(Self {
            email: read(EMAIL_ENV)?,
            password: read(PASSWORD_ENV)?,
        })
    }
}

/// Unauthenticated client; [`PortalClient::authenticate`] turns it into a session.
pub struct PortalClient {
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PortalClient {
    pub fn new(config: &PortalConfig) -> Result<Self> {
        if config.base_url.starts_with("http://") {
            tracing::warn!("Portal base URL uses unencrypted HTTP. Credentials will be sent in plain text.");
        }

        let origin = config.origin.trim_end_matches('/');
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, header_value(origin)?);
        headers.insert(REFERER, header_value(&format!("{origin}/"))?);

        let http = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .default_headers(headers)
            .user_agent(concat!("diary-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| DiaryError::Config(format!("HTTP client error: {err}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Log in once. Cookies set by the portal stay in the returned session.
    pub fn authenticate(self, credentials: &Credentials) -> Result<PortalSession> {
        info!(email = %credentials.email, "Logging in");
        let url = format!("{}{LOGIN_PATH}", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(credentials)
            .send()
            .map_err(|err| DiaryError::Authentication(format!("login request failed: {err}")))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(DiaryError::Authentication(format!(
                "{} → {}",
                status.as_u16(),
                truncate(&body)
            )));
        }

        let bearer = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|value| extract_token(&value));
        debug!(bearer = bearer.is_some(), "Login accepted");

        Ok(PortalSession {
            base_url: self.base_url,
            http: self.http,
            bearer,
        })
    }
}

/// Authenticated channel shared by the fetcher and the submission engine.
pub struct PortalSession {
    base_url: String,
    http: Client,
    bearer: Option<String>,
}

impl std::fmt::Debug for PortalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSession")
            .field("base_url", &self.base_url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl PortalSession {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl DiaryPortal for PortalSession {
    fn fetch_page(&self, page: u32) -> Result<EntryPage> {
        let url = format!("{}{DIARIES_PATH}?page={page}", self.base_url);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .map_err(|err| DiaryError::Fetch(format!("page {page}: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DiaryError::Fetch(format!(
                "page {page}: status {} → {}",
                status.as_u16(),
                truncate(&body)
            )));
        }

        let listing: ListingResponse = response
            .json()
            .map_err(|err| DiaryError::Fetch(format!("page {page}: invalid listing: {err}")))?;
        Ok(listing.into())
    }

    fn submit(&self, payload: &SubmissionPayload) -> Result<()> {
        let url = format!("{}{STORE_PATH}", self.base_url);
        let response = self
            .authorize(self.http.post(&url))
            .json(payload)
            .send()
            .map_err(|err| DiaryError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        if matches!(status, 200 | 201) {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(DiaryError::Submission {
            status,
            body: truncate(&body),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|err| DiaryError::Config(format!("invalid header value {value}: {err}")))
}

/// Login responses put the token at the top level or under `data`.
fn extract_token(body: &Value) -> Option<String> {
    let candidates = [
        body.get("token"),
        body.get("access_token"),
        body.pointer("/data/token"),
        body.pointer("/data/access_token"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
