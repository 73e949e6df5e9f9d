//! CLI error types with miette diagnostics.
//!
//! Maps `breezly_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use breezly_api::EntityKind;
use breezly_config::ConfigError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the Breezeway API")]
    #[diagnostic(
        code(breezly::connection_failed),
        help(
            "Check network access to the API root, or override it with --base-url.\n\
             Try: breezly auth check -v"
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(breezly::tls_error),
        help("Check the ca_cert path in your profile.")
    )]
    Tls { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(breezly::timeout),
        help("Increase the timeout with --timeout or the profile's timeout setting.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(breezly::auth_failed),
        help(
            "Verify the client id and secret for this profile.\n\
             Re-run: breezly config init"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(breezly::no_credentials),
        help(
            "Configure credentials with: breezly config init\n\
             Or set BREEZEWAY_API_KEY and BREEZEWAY_API_SECRET."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(breezly::not_found),
        help("Run: breezly {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(breezly::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected API response: {message}")]
    #[diagnostic(code(breezly::bad_response), help("Re-run with -vv to see the raw body."))]
    BadResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(breezly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(breezly::config))]
    Config(Box<ConfigError>),

    // ── Server ───────────────────────────────────────────────────────
    #[error("Server stopped: {message}")]
    #[diagnostic(code(breezly::server))]
    Server { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// A not-found error for `kind`, pointing at its list command.
    pub fn not_found(kind: EntityKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: kind.to_string(),
            identifier: identifier.into(),
            list_command: format!("{} list", kind.plural()),
        }
    }
}

// ── breezly_api::Error → CliError mapping ────────────────────────────

impl From<breezly_api::Error> for CliError {
    fn from(err: breezly_api::Error) -> Self {
        use breezly_api::Error;

        match err {
            Error::Authentication { message } => Self::AuthFailed { message },
            Error::Request { status, message } if status == 401 || status == 403 => {
                Self::AuthFailed { message }
            }
            Error::Request { status, message } => Self::ApiError { status, message },
            Error::UnsupportedKind(kind) => Self::Validation {
                field: "type".into(),
                reason: format!("unknown entity type '{kind}', expected property, task or reservation"),
            },
            Error::Transport(e) if e.is_timeout() => Self::Timeout,
            Error::Transport(e) => Self::ConnectionFailed {
                source: Box::new(e),
            },
            Error::InvalidUrl(e) => Self::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            Error::Tls(message) => Self::Tls { message },
            Error::Deserialization { message, .. } => Self::BadResponse { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_statuses_map_to_exit_codes() {
        let auth: CliError = breezly_api::Error::Request {
            status: 403,
            message: "forbidden".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let other: CliError = breezly_api::Error::Request {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert_eq!(other.exit_code(), exit_code::GENERAL);

        let kind: CliError = breezly_api::Error::UnsupportedKind("guest".into()).into();
        assert_eq!(kind.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn missing_credentials_is_an_auth_exit() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "work".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(err.to_string().contains("'work'"));
    }
}
