// Breezeway inventory API client
//
// Wraps `reqwest::Client` with token injection, URL construction and
// `{ results: [...] }` envelope unwrapping. Search and the task sweep are
// implemented as inherent methods in their own modules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::auth::{Credentials, TokenManager, bearer_value};
use crate::error::Error;
use crate::kind::EntityKind;
use crate::record::Record;
use crate::transport::{TransportConfig, endpoint_url};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.breezeway.io";

/// List responses wrap their items as `{ "results": [...] }`.
#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    results: Option<Vec<Record>>,
}

/// Authenticated client for the property, task and reservation endpoints.
///
/// Every call asks the owned [`TokenManager`] for a valid token first;
/// callers never handle tokens themselves.
pub struct BreezewayClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenManager,
}

impl BreezewayClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client and its token manager from transport settings.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: Credentials) -> Self {
        let tokens = TokenManager::new(http.clone(), base_url.clone(), credentials);
        Self::with_token_manager(http, base_url, tokens)
    }

    /// Inject a token manager (e.g. one driven by a manual clock).
    pub fn with_token_manager(
        http: reqwest::Client,
        base_url: Url,
        tokens: TokenManager,
    ) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    // ── Entity operations ────────────────────────────────────────────

    /// Fetch a single record, naming the kind as a string.
    ///
    /// Unknown kinds fail with [`Error::UnsupportedKind`] before any
    /// request is made.
    pub async fn fetch(&self, kind: &str, id: &str) -> Result<Record, Error> {
        let kind = EntityKind::parse(kind)?;
        self.get(kind, id).await
    }

    /// `GET` the detail endpoint for `kind`.
    pub async fn get(&self, kind: EntityKind, id: &str) -> Result<Record, Error> {
        self.get_json(&kind.detail_path(id), &[]).await
    }

    /// `GET` the list endpoint for `kind`, passing `params` through as the
    /// query string. A response without `results` is an empty list.
    pub async fn list(
        &self,
        kind: EntityKind,
        params: &[(&str, &str)],
    ) -> Result<Vec<Record>, Error> {
        let envelope: ListEnvelope = self.get_json(kind.list_path(), params).await?;
        Ok(envelope.results.unwrap_or_default())
    }

    pub async fn list_properties(&self, params: &[(&str, &str)]) -> Result<Vec<Record>, Error> {
        self.list(EntityKind::Property, params).await
    }

    pub async fn list_tasks(&self, params: &[(&str, &str)]) -> Result<Vec<Record>, Error> {
        self.list(EntityKind::Task, params).await
    }

    pub async fn list_reservations(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Vec<Record>, Error> {
        self.list(EntityKind::Reservation, params).await
    }

    /// `PATCH` a property with a partial field set and return the server's
    /// copy. The body is sent as given; see [`crate::PropertyUpdate`] for
    /// building one that preserves nested fields.
    pub async fn update_property(
        &self,
        id: &str,
        fields: &(impl Serialize + Sync),
    ) -> Result<Record, Error> {
        let url = endpoint_url(&self.base_url, &EntityKind::Property.detail_path(id))?;
        debug!("PATCH {url}");

        let token = self.tokens.valid_token().await?;
        let resp = self
            .http
            .patch(url)
            .header(reqwest::header::AUTHORIZATION, bearer_value(&token)?)
            .json(fields)
            .send()
            .await?;

        handle_response(resp).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = endpoint_url(&self.base_url, path)?;
        debug!("GET {url} params={params:?}");

        let token = self.tokens.valid_token().await?;
        let mut builder = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, bearer_value(&token)?)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !params.is_empty() {
            builder = builder.query(params);
        }

        let resp = builder.send().await?;
        handle_response(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = preview(&body), "request failed");
        return Err(Error::Request {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_owned(),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

/// First 200 characters of a response body.
fn preview(body: &str) -> &str {
    body.char_indices()
        .nth(200)
        .map_or(body, |(end, _)| &body[..end])
}
