// Slack `/breezeway` slash command
//
// Subcommands: `search <query>`, `property <id>`, `wifi <name or address>`,
// `list`. Requests are form-encoded; when a signing secret is configured
// the `X-Slack-Signature` header is checked before anything runs.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hmac::{Hmac, Mac, digest::KeyInit};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, warn};

use breezly_api::{BreezewayClient, EntityKind, Record};

use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Requests older (or newer) than this many seconds are rejected.
pub const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

/// Lists posted back to a channel stop after this many entries.
pub const MAX_LISTED: usize = 10;

const USAGE: &str = "Usage: `/breezeway [search|property|wifi|list] [query]`\n\n\
    Examples:\n\
    • `/breezeway search St Louis`\n\
    • `/breezeway property 737329`\n\
    • `/breezeway wifi 4700 McPherson`";

const COMMANDS: &str = "Available commands:\n\
    • `search [query]` - Search properties\n\
    • `property [id]` - Get property details\n\
    • `wifi [property]` - Get WiFi credentials\n\
    • `list` - List properties";

// ── Signature verification ──────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("request timestamp outside the allowed window")]
    Stale,

    #[error("malformed signature")]
    Malformed,

    #[error("signature mismatch")]
    Mismatch,
}

/// `v0=<hex>` HMAC-SHA256 of `v0:<timestamp>:<body>`.
pub fn sign(secret: &SecretString, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = mac_for(secret, timestamp, body)?;
    Ok(format!("v0={}", hex::encode(mac.finalize().into_bytes())))
}

/// Check a request signature and its timestamp against `now` (unix seconds).
pub fn verify_signature(
    secret: &SecretString,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let sent_at: i64 = timestamp.parse().map_err(|_| SignatureError::Stale)?;
    if now.abs_diff(sent_at) > MAX_CLOCK_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::Stale);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|hex_sig| hex::decode(hex_sig).ok())
        .ok_or(SignatureError::Malformed)?;

    mac_for(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

fn mac_for(
    secret: &SecretString,
    timestamp: &str,
    body: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

fn verify_headers(
    secret: &SecretString,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), SignatureError> {
    let header = |name: &'static str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .ok_or(SignatureError::MissingHeader(name))
    };
    let timestamp = header("x-slack-request-timestamp")?;
    let signature = header("x-slack-signature")?;
    verify_signature(
        secret,
        timestamp,
        body,
        signature,
        chrono::Utc::now().timestamp(),
    )
}

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible only to the user who ran the command.
    Ephemeral,
    /// Posted to the channel.
    InChannel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlackResponse {
    fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }

    fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// `POST /slack/commands`
pub async fn slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(ref secret) = state.slack_signing_secret {
        if let Err(e) = verify_headers(secret, &headers, &body) {
            warn!(error = %e, "rejected slash command");
            return (StatusCode::UNAUTHORIZED, e.to_string()).into_response();
        }
    }

    let text = command_text(&body);
    debug!(text, "slash command");
    Json(respond(state.toolbox.client(), &text).await).into_response()
}

/// The `text` field of a form-encoded slash-command payload.
pub fn command_text(body: &[u8]) -> String {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "text")
        .map(|(_, value)| value.trim().to_owned())
        .unwrap_or_default()
}

/// Run a `/breezeway` command line and build the reply.
pub async fn respond(client: &BreezewayClient, text: &str) -> SlackResponse {
    let text = text.trim();
    if text.is_empty() {
        return SlackResponse::ephemeral(USAGE);
    }

    let (subcommand, query) = text.split_once(' ').unwrap_or((text, ""));
    let query = query.trim();

    let result = match subcommand.to_lowercase().as_str() {
        "search" => search(client, query).await,
        "property" => property(client, query).await,
        "wifi" => wifi(client, query).await,
        "list" => list(client).await,
        other => Ok(SlackResponse::ephemeral(format!(
            ":x: Unknown command: {other}\n\n{COMMANDS}"
        ))),
    };

    result.unwrap_or_else(|e| {
        warn!(error = %e, "slash command failed");
        SlackResponse::ephemeral(format!(":x: Error: {e}"))
    })
}

async fn search(client: &BreezewayClient, query: &str) -> Result<SlackResponse, breezly_api::Error> {
    if query.is_empty() {
        return Ok(SlackResponse::ephemeral(
            ":x: Please provide a search query.\nExample: `/breezeway search St Louis`",
        ));
    }

    let results = client.search(query, Some(&[EntityKind::Property])).await;
    if results.is_empty() {
        return Ok(SlackResponse::ephemeral(format!(
            "No properties found for \"{query}\""
        )));
    }

    let noun = if results.len() == 1 { "property" } else { "properties" };
    let mut text = format!("Found {} {noun} matching \"{query}\"", results.len());
    if results.len() > MAX_LISTED {
        text.push_str(&format!(" (showing first {MAX_LISTED})"));
    }
    text.push_str(":\n\n");
    for (i, hit) in results.iter().take(MAX_LISTED).enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, property_block(&hit.data, false)));
    }

    Ok(SlackResponse::in_channel(text))
}

async fn property(client: &BreezewayClient, id: &str) -> Result<SlackResponse, breezly_api::Error> {
    if id.is_empty() {
        return Ok(SlackResponse::ephemeral(
            ":x: Please provide a property ID.\nExample: `/breezeway property 737329`",
        ));
    }

    match client.get(EntityKind::Property, id).await {
        Ok(record) => Ok(SlackResponse::in_channel(format!(
            "Property Details:\n\n{}",
            property_block(&record, true)
        ))),
        Err(e) if e.is_not_found() => Ok(SlackResponse::ephemeral(format!(
            ":x: Property {id} not found"
        ))),
        Err(e) => Err(e),
    }
}

async fn wifi(client: &BreezewayClient, query: &str) -> Result<SlackResponse, breezly_api::Error> {
    if query.is_empty() {
        return Ok(SlackResponse::ephemeral(
            ":x: Please provide a property name or address.\nExample: `/breezeway wifi 4700 McPherson`",
        ));
    }

    let results = client.search(query, Some(&[EntityKind::Property])).await;
    let Some(first) = results.iter().find(|r| !r.id.is_empty()) else {
        return Ok(SlackResponse::ephemeral(format!(
            "No properties found for \"{query}\""
        )));
    };

    let property = client.get(EntityKind::Property, &first.id).await?;
    let mut text = format!(
        "WiFi Info for {}:\n\n",
        property.name().unwrap_or_default()
    );
    match notes_wifi(&property) {
        Some((network, password)) => {
            text.push_str(&format!(":signal_strength: *Network:* {network}\n"));
            text.push_str(&format!(
                ":key: *Password:* {}\n",
                password.as_deref().unwrap_or("Not set")
            ));
        }
        None => text.push_str(":signal_strength: WiFi information not available for this property"),
    }

    Ok(SlackResponse::in_channel(text))
}

async fn list(client: &BreezewayClient) -> Result<SlackResponse, breezly_api::Error> {
    let properties = client.list_properties(&[]).await?;
    let shown = properties.len().min(MAX_LISTED);

    let mut text = format!(
        "Total properties: {} (showing first {shown}):\n\n",
        properties.len()
    );
    for (i, p) in properties.iter().take(MAX_LISTED).enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, property_block(p, false)));
    }

    Ok(SlackResponse::in_channel(text))
}

/// WiFi credentials as stored in the property's notes.
fn notes_wifi(property: &Record) -> Option<(String, Option<String>)> {
    let network = property.note(&["wifi_network", "wifi network"])?;
    let password = property.note(&["wifi_password", "wifi password"]);
    Some((network, password))
}

fn property_block(p: &Record, detailed: bool) -> String {
    let address2 = p
        .text("address2")
        .map(|a| format!(" {a}"))
        .unwrap_or_default();

    let mut text = format!("*{}*\n", p.name().unwrap_or_default());
    text.push_str(&format!(
        ":round_pushpin: {}{address2}, {}\n",
        p.text("address1").unwrap_or_default(),
        p.text("city").unwrap_or_default()
    ));
    text.push_str(&format!(":id: Breezeway ID: {}\n", p.id().unwrap_or_default()));
    if let Some(reference) = p.reference_id() {
        text.push_str(&format!(":link: Internal ID: {reference}\n"));
    }
    if detailed {
        if let Some((network, password)) = notes_wifi(p) {
            let password = password.map(|pw| format!(" / {pw}")).unwrap_or_default();
            text.push_str(&format!(":signal_strength: WiFi: {network}{password}\n"));
        }
    }
    text
}
