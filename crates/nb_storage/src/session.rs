//! Authenticated session for the Google Drive API.
//!
//! One `DriveSession` is built at startup and shared (`Arc`) by every upload.
//! The access token is cached behind a `RwLock` and refreshed either lazily,
//! when it is about to expire, or on the schedule started by
//! [`DriveSession::spawn_refresh`].

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use nb_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens closer than this to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// OAuth2 client credentials plus a long-lived refresh token.
///
/// Accepts the credentials file written by pydrive/oauth2client, which is what
/// `GOOGLE_CREDENTIALS_JSON` usually holds.
#[derive(Clone, Deserialize)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_expiry: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl OAuthCredentials {
    pub fn new(client_id: String, client_secret: String, refresh_token: String) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
            access_token: None,
            token_expiry: None,
            token_uri: default_token_uri(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let credentials: Self = serde_json::from_str(json)?;
        if credentials.refresh_token.trim().is_empty() {
            return Err(Error::Config("Google credentials have no refresh token".to_string()));
        }
        Ok(credentials)
    }

    fn cached_token(&self) -> Option<AccessToken> {
        let value = self.access_token.clone().filter(|t| !t.is_empty())?;
        let expires_at = self.token_expiry.as_deref().and_then(parse_expiry)?;
        Some(AccessToken { value, expires_at })
    }
}

// oauth2client writes "2024-03-05T09:07:42Z"; also accept full RFC 3339.
fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
                .ok()
                .map(|n| n.and_utc())
        })
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > ChronoDuration::seconds(EXPIRY_MARGIN_SECS)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

pub struct DriveSession {
    client: Client,
    credentials: OAuthCredentials,
    token: RwLock<Option<AccessToken>>,
}

impl fmt::Debug for DriveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveSession")
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl DriveSession {
    pub fn new(credentials: OAuthCredentials) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let token = credentials.cached_token();
        Ok(Self {
            client,
            credentials,
            token: RwLock::new(token),
        })
    }

    /// A bearer token valid for at least another minute.
    pub async fn access_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
                return Ok(token.value.clone());
            }
        }

        let mut token = self.token.write().await;
        // Someone else may have refreshed while we waited for the lock.
        if let Some(current) = token.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(current.value.clone());
        }

        let fresh = self.request_token().await?;
        let value = fresh.value.clone();
        *token = Some(fresh);
        Ok(value)
    }

    /// Unconditionally exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<()> {
        let fresh = self.request_token().await?;
        *self.token.write().await = Some(fresh);
        Ok(())
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", self.credentials.refresh_token.as_str()),
        ];

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(Error::Storage(format!(
                "Token refresh failed with {}: {}",
                status, error_text
            )));
        }

        let token = response.json::<TokenResponse>().await?;
        debug!("Drive access token refreshed, valid for {}s", token.expires_in);
        Ok(AccessToken {
            value: token.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(token.expires_in),
        })
    }

    /// Refresh the token every `interval` until the returned handle is aborted.
    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match self.refresh().await {
                    Ok(()) => info!("🔑 Drive session refreshed"),
                    Err(e) => warn!("Drive session refresh failed: {}", e),
                }
            }
        })
    }
}
