// Token lifecycle for the Breezeway public API
//
// Client id + secret are exchanged for a JWT access token (and usually a
// refresh token). Tokens are treated as valid for 23 hours from receipt;
// after that the refresh token is tried once and, failing that, the
// credentials are exchanged again.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::endpoint_url;

/// Credential exchange endpoint.
pub const AUTH_PATH: &str = "/public/auth/v1/";

/// Refresh endpoint (refresh token goes in the `Authorization` header).
pub const REFRESH_PATH: &str = "/public/auth/v1/refresh";

/// How long a freshly issued token is trusted: one hour short of the
/// vendor's 24-hour lifetime.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(23 * 60 * 60);

/// Client credentials issued by Breezeway. Immutable for the lifetime of
/// the manager that owns them.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"****")
            .finish()
    }
}

// ── Clock ────────────────────────────────────────────────────────────

/// Source of wall-clock time for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

// ── Token state ──────────────────────────────────────────────────────

struct TokenState {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: SystemTime,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Observable lifecycle state of a [`TokenManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No exchange has succeeded yet.
    Unauthenticated,
    /// A token is held and has not reached its expiry instant.
    Valid,
    /// A token is held but its expiry instant has passed.
    Expired,
}

// ── Manager ──────────────────────────────────────────────────────────

/// Owns the credential pair and the single current bearer token.
///
/// Reads are lock-free: the current token lives in an `ArcSwapOption` and
/// is replaced wholesale after every successful exchange. Exchanges are
/// single-flight: callers that find the token missing or expired queue
/// on an async mutex and re-check after acquiring it, so concurrent
/// request handlers share one refresh instead of racing.
pub struct TokenManager {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    state: ArcSwapOption<TokenState>,
    exchange: Mutex<()>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        Self::with_clock(http, base_url, credentials, Arc::new(SystemClock))
    }

    /// Build a manager that reads time from `clock` (tests inject a manual clock).
    pub fn with_clock(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            clock,
            state: ArcSwapOption::empty(),
            exchange: Mutex::new(()),
        }
    }

    /// The client id this manager authenticates as.
    pub fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    /// Current lifecycle state, without touching the network.
    pub fn status(&self) -> TokenStatus {
        let guard = self.state.load();
        match guard.as_ref() {
            None => TokenStatus::Unauthenticated,
            Some(state) if self.clock.now() < state.expires_at => TokenStatus::Valid,
            Some(_) => TokenStatus::Expired,
        }
    }

    /// Expiry instant of the held token, if any.
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.state.load().as_ref().map(|s| s.expires_at)
    }

    /// Return a bearer token that is unexpired at the time of return.
    ///
    /// No network call is made while the held token is valid. Otherwise
    /// the refresh token is tried first; any refresh failure falls back
    /// to a full credential exchange, whose failure is the only error
    /// surfaced here.
    pub async fn valid_token(&self) -> Result<SecretString, Error> {
        if let Some(token) = self.current() {
            return Ok(token);
        }

        let _guard = self.exchange.lock().await;

        // Another caller may have completed the exchange while we waited.
        if let Some(token) = self.current() {
            return Ok(token);
        }

        let previous = self.state.load_full();
        let refresh_token = previous.as_deref().and_then(|s| s.refresh_token.as_ref());

        let next = match refresh_token {
            Some(refresh) => match self.refresh(refresh).await {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "token refresh failed, re-authenticating");
                    self.authenticate().await?
                }
            },
            None => self.authenticate().await?,
        };

        Ok(self.install(next))
    }

    /// Discard any held token and perform a full credential exchange.
    pub async fn reauthenticate(&self) -> Result<(), Error> {
        let _guard = self.exchange.lock().await;
        let next = self.authenticate().await?;
        self.install(next);
        Ok(())
    }

    fn current(&self) -> Option<SecretString> {
        let guard = self.state.load();
        let state = guard.as_ref()?;
        (self.clock.now() < state.expires_at).then(|| state.access_token.clone())
    }

    fn install(&self, next: TokenState) -> SecretString {
        let token = next.access_token.clone();
        self.state.store(Some(Arc::new(next)));
        token
    }

    /// `POST /public/auth/v1/` with `{client_id, client_secret}`.
    async fn authenticate(&self) -> Result<TokenState, Error> {
        let url = endpoint_url(&self.base_url, AUTH_PATH)?;
        debug!("authenticating at {url}");

        let body = json!({
            "client_id": self.credentials.client_id,
            "client_secret": self.credentials.client_secret.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("{} - {body}", status_text(status)),
            });
        }

        let state = self.parse_tokens(resp).await?;
        debug!("authentication successful");
        Ok(state)
    }

    /// `POST /public/auth/v1/refresh` with `Authorization: JWT <refresh>`.
    async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenState, Error> {
        let url = endpoint_url(&self.base_url, REFRESH_PATH)?;
        debug!("refreshing access token at {url}");

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::AUTHORIZATION, bearer_value(refresh_token)?)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("refresh rejected: {}", status_text(status)),
            });
        }

        self.parse_tokens(resp).await
    }

    async fn parse_tokens(&self, resp: reqwest::Response) -> Result<TokenState, Error> {
        let body = resp.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("invalid token response: {e}"),
                body: body.clone(),
            }
        })?;

        Ok(TokenState {
            access_token: SecretString::from(parsed.access_token),
            refresh_token: parsed
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
            expires_at: self.clock.now() + TOKEN_VALIDITY,
        })
    }
}

/// `JWT <token>` header value, marked sensitive so it never shows in logs.
pub(crate) fn bearer_value(token: &SecretString) -> Result<reqwest::header::HeaderValue, Error> {
    let mut value =
        reqwest::header::HeaderValue::from_str(&format!("JWT {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("token is not a valid header value: {e}"),
            })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Status line text, e.g. `401 Unauthorized`.
pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_str().to_owned(),
    }
}
