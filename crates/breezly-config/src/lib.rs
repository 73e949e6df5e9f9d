//! Shared configuration for the breezly CLI and servers.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to the connection settings `breezly_api` needs. The
//! CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use breezly_api::{Credentials, DEFAULT_BASE_URL, TlsMode, TransportConfig};

/// Keyring service name; entries are keyed `<profile>/client-secret`.
pub const KEYRING_SERVICE: &str = "breezly";

/// Environment variable carrying the client id.
pub const CLIENT_ID_ENV: &str = "BREEZEWAY_API_KEY";

/// Environment variable carrying the client secret.
pub const CLIENT_SECRET_ENV: &str = "BREEZEWAY_API_SECRET";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// HTTP server settings (`breezly serve`).
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given on the command line.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}

/// A named set of Breezeway credentials.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root override (e.g. a staging host or proxy).
    pub base_url: Option<String>,

    /// Client id issued by Breezeway.
    pub client_id: Option<String>,

    /// Client secret (plaintext, prefer keyring or env var).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout, in seconds.
    pub timeout: Option<u64>,
}

/// Settings for the REST / MCP / slash-command listener.
#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Slack signing secret (plaintext, prefer `SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            slack_signing_secret: None,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".into()
}

impl ServerConfig {
    /// Listen address; a `PORT` variable replaces the configured port.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve_bind(&self.bind, std::env::var("PORT").ok().as_deref())
    }

    /// Slack signing secret from `SLACK_SIGNING_SECRET` or the config file.
    pub fn slack_signing_secret(&self) -> Option<SecretString> {
        std::env::var("SLACK_SIGNING_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.slack_signing_secret.clone())
            .map(SecretString::from)
    }
}

fn resolve_bind(bind: &str, port: Option<&str>) -> Result<SocketAddr, ConfigError> {
    let mut addr: SocketAddr = bind.parse().map_err(|_| ConfigError::Validation {
        field: "server.bind".into(),
        reason: format!("expected host:port, got '{bind}'"),
    })?;

    if let Some(port) = port {
        let port = port.parse().map_err(|_| ConfigError::Validation {
            field: "PORT".into(),
            reason: format!("expected a port number, got '{port}'"),
        })?;
        addr.set_port(port);
    }

    Ok(addr)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "breezly", "breezly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("breezly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path`, then `BREEZEWAY_*` variables.
///
/// Nested keys use a double underscore: `BREEZEWAY_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BREEZEWAY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Client id from the profile, falling back to `BREEZEWAY_API_KEY`.
pub fn resolve_client_id(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    profile
        .client_id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| std::env::var(CLIENT_ID_ENV).ok().filter(|id| !id.is_empty()))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the client secret from the credential chain (no CLI flag step).
pub fn resolve_client_secret(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's client_secret_env → env var lookup
    if let Some(ref env_name) = profile.client_secret_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Standard env var
    if let Ok(val) = std::env::var(CLIENT_SECRET_ENV) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in config
    if let Some(ref secret) = profile.client_secret {
        return Ok(SecretString::from(secret.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a client secret in the system keyring for `profile_name`.
pub fn store_client_secret(profile_name: &str, secret: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(secret)?;
    Ok(())
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/client-secret"))
}

// ── Connection settings ─────────────────────────────────────────────

/// Everything needed to build a `BreezewayClient`.
#[derive(Debug, Clone)]
pub struct Connection {
    pub base_url: url::Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

/// Build connection settings from a profile, with no CLI flag overrides.
pub fn profile_to_connection(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<Connection, ConfigError> {
    let raw_url = profile.base_url.as_deref().unwrap_or(&defaults.base_url);
    let base_url = parse_base_url(raw_url)?;

    let client_id = resolve_client_id(profile, profile_name)?;
    let client_secret = resolve_client_secret(profile, profile_name)?;

    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(Connection {
        base_url,
        credentials: Credentials::new(client_id, client_secret),
        transport: TransportConfig { tls, timeout },
    })
}

/// Parse and check an API root URL.
pub fn parse_base_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    Ok(url)
}
