//! OAuth2 password-grant token lifecycle.
//!
//! Implements the flow used by the SDI OS auth server:
//!   1. Request a token with the user's password (`grant_type=password`).
//!   2. Refresh it once expired (`grant_type=refresh_token`).
//!   3. Revoke it.
//!
//! A `TokenManager` holds at most one token. Re-granting or refreshing
//! replaces it in place; revoking deactivates it.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;

use crate::error::{SdiosError, SdiosResult};
use crate::transport::{header_value, version_headers};
use crate::types::{ClientConfig, Credentials, TokenResponse};
use crate::version::ApiVersion;

const TOKEN_PATH: &str = "api/o/token/";
const REVOKE_PATH: &str = "api/o/revoke_token/";

/// One OAuth2 access / refresh token pair.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Lifetime in seconds, counted from `created_at`
    pub expires_in: u64,
    pub created_at: Instant,
    pub active: bool,
}

impl Token {
    fn from_response(resp: TokenResponse, now: Instant) -> Self {
        Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            token_type: resp.token_type,
            expires_in: resp.expires_in,
            created_at: now,
            active: true,
        }
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }

    /// Expiry evaluated at an arbitrary monotonic instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= self.lifetime()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn time_left_at(&self, now: Instant) -> Duration {
        self.lifetime()
            .saturating_sub(now.saturating_duration_since(self.created_at))
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// Owns the credentials and the single live token of one session.
pub struct TokenManager {
    client: Client,
    base_url: String,
    api_version: Option<ApiVersion>,
    credentials: Option<Credentials>,
    token: Option<Token>,
}

impl TokenManager {
    /// Build an unauthenticated manager. No request is made yet.
    pub fn new(client: Client, config: &ClientConfig) -> SdiosResult<Self> {
        let api_version = config.validate()?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            api_version,
            credentials: None,
            token: None,
        })
    }

    pub fn api_version(&self) -> Option<&ApiVersion> {
        self.api_version.as_ref()
    }

    pub(crate) fn set_api_version(&mut self, version: Option<ApiVersion>) {
        self.api_version = version;
    }

    // ── State ───────────────────────────────────────────────────────

    /// The live token, if one is active.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref().filter(|t| t.active)
    }

    pub fn is_active(&self) -> bool {
        self.token().is_some()
    }

    /// True when no usable token is held or the active one has run out.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.token().map_or(true, |t| t.is_expired_at(now))
    }

    pub fn access_token(&self) -> &str {
        self.token().map_or("", |t| t.access_token.as_str())
    }

    pub fn refresh_token(&self) -> &str {
        self.token().map_or("", |t| t.refresh_token.as_str())
    }

    pub fn token_type(&self) -> &str {
        self.token().map_or("", |t| t.token_type.as_str())
    }

    pub fn expires_in(&self) -> u64 {
        self.token().map_or(0, |t| t.expires_in)
    }

    pub fn time_left(&self) -> Duration {
        self.token()
            .map_or(Duration::ZERO, |t| t.time_left_at(Instant::now()))
    }

    /// `Authorization` header value of the active token.
    pub fn authorization(&self) -> SdiosResult<String> {
        self.token()
            .map(Token::authorization)
            .ok_or_else(SdiosError::no_active_token)
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Request a new token with the password grant.
    ///
    /// A still-valid previous token is revoked after the new grant
    /// succeeds; a failure to revoke it is logged and otherwise ignored.
    pub async fn request(&mut self, credentials: Credentials) -> SdiosResult<()> {
        let form = [
            ("grant_type", "password"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password()),
        ];
        let resp = self.authenticate(&credentials, &form).await?;

        if self.is_active() && !self.is_expired() {
            if let Err(e) = self.revoke().await {
                warn!("Could not revoke superseded API token: {e}");
            }
        }

        debug!("Granted API token for {}", credentials.username);
        self.token = Some(Token::from_response(resp, Instant::now()));
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Exchange the refresh token for a new token pair.
    pub async fn refresh(&mut self) -> SdiosResult<()> {
        let (Some(token), Some(credentials)) = (self.token(), self.credentials.as_ref()) else {
            return Err(SdiosError::no_active_token());
        };
        let refresh_token = token.refresh_token.clone();
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let resp = self.authenticate(credentials, &form).await?;

        debug!("Refreshed API token");
        self.token = Some(Token::from_response(resp, Instant::now()));
        Ok(())
    }

    /// Revoke the active token.
    pub async fn revoke(&mut self) -> SdiosResult<()> {
        let (Some(token), Some(credentials)) = (self.token(), self.credentials.as_ref()) else {
            return Err(SdiosError::no_active_token());
        };

        let mut headers = version_headers(self.api_version.as_ref())?;
        headers.insert(AUTHORIZATION, header_value(&token.authorization())?);
        let form = [
            ("token", token.access_token.as_str()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret()),
        ];

        let url = format!("{}/{}", self.base_url, REVOKE_PATH);
        let resp = self
            .client
            .post(&url)
            .headers(headers)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SdiosError::revoke_token(format!("Failure to revoke API token: {body}"))
                .with_status(status.as_u16()));
        }

        debug!("Revoked API token");
        if let Some(token) = self.token.as_mut() {
            token.active = false;
        }
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn authenticate(
        &self,
        credentials: &Credentials,
        form: &[(&str, &str)],
    ) -> SdiosResult<TokenResponse> {
        let url = format!("{}/{}", self.base_url, TOKEN_PATH);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&credentials.client_id, Some(credentials.client_secret()))
            .headers(version_headers(self.api_version.as_ref())?)
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SdiosError::create_token(format!("Failure to create API token: {body}"))
                .with_status(status.as_u16()));
        }

        serde_json::from_str(&body).map_err(|e| {
            SdiosError::create_token(format!("Failure to create API token: {e}: {body}"))
                .with_status(status.as_u16())
        })
    }
}

impl fmt::Display for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, " {:>13}: {}", "Access Token", self.access_token())?;
        writeln!(f, " {:>13}: {}", "Refresh Token", self.refresh_token())?;
        writeln!(f, " {:>13}: {}", "Token Type", self.token_type())?;
        writeln!(f, " {:>13}: {}", "Expires In", self.expires_in())?;
        writeln!(f, " {:>13}: {}", "Time Left", self.time_left().as_secs_f64())?;
        writeln!(f, " {:>13}: {}", "Is Expired", self.is_expired())?;
        writeln!(f, " {:>13}: {}", "Is Active", self.is_active())
    }
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("active", &self.is_active())
            .field("expires_in", &self.expires_in())
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
