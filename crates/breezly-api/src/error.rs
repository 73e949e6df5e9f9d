use thiserror::Error;

/// Top-level error type for the `breezly-api` crate.
///
/// Covers every failure mode of the Breezeway client: credential
/// exchange, entity requests, transport, and response decoding.
/// Front-ends map these into their own presentation (CLI diagnostics,
/// JSON error bodies, tool error results).
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Credential exchange rejected by the remote API.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Requests ────────────────────────────────────────────────────
    /// Any other non-success HTTP status from an entity endpoint.
    #[error("API request failed (HTTP {status}): {message}")]
    Request { status: u16, message: String },

    /// Caller asked for an entity kind outside property/task/reservation.
    #[error("Unknown entity type: {0}")]
    UnsupportedKind(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the remote API answered 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Request { status, .. } => *status == 404,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if the failure came from credential exchange or an
    /// upstream 401/403.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Request { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }

    /// Returns `true` for connection-level failures (nothing reached the API).
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
