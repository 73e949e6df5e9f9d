//! CLI configuration: thin wrapper around `breezly_config`.
//!
//! Adds connection resolution that respects `GlobalOpts` flag overrides
//! (--base-url, --client-id, --client-secret, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use breezly_api::{Credentials, TransportConfig};
use breezly_config::{Connection, Defaults};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use breezly_config::{
    Config, Profile, config_path, load_config_or_default, parse_base_url, save_config,
    store_client_secret,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build connection settings from config, profile, and CLI overrides.
///
/// With no matching profile the flags (and their env vars) must carry
/// both halves of the credential pair.
pub fn resolve_connection(global: &GlobalOpts, config: &Config) -> Result<Connection, CliError> {
    let profile_name = active_profile_name(global, config);

    let mut conn = match config.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, global, &config.defaults)?,
        None => from_flags(global, &profile_name, &config.defaults)?,
    };

    if let Some(secs) = global.timeout {
        conn.transport = conn.transport.with_timeout(Duration::from_secs(secs));
    }
    Ok(conn)
}

fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<Connection, CliError> {
    // Flags outrank every profile value, so fold them in first.
    let merged = Profile {
        base_url: global.base_url.clone().or_else(|| profile.base_url.clone()),
        client_id: global.client_id.clone().or_else(|| profile.client_id.clone()),
        client_secret: global
            .client_secret
            .clone()
            .or_else(|| profile.client_secret.clone()),
        client_secret_env: profile.client_secret_env.clone(),
        ca_cert: profile.ca_cert.clone(),
        timeout: profile.timeout,
    };

    let mut conn = breezly_config::profile_to_connection(&merged, profile_name, defaults)?;
    // The profile chain ranks env and keyring above plaintext; a flag beats both.
    if let Some(ref secret) = global.client_secret {
        conn.credentials.client_secret = SecretString::from(secret.clone());
    }
    Ok(conn)
}

fn from_flags(
    global: &GlobalOpts,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<Connection, CliError> {
    let raw_url = global.base_url.as_deref().unwrap_or(&defaults.base_url);
    let base_url = breezly_config::parse_base_url(raw_url)?;

    let (Some(client_id), Some(secret)) = (&global.client_id, &global.client_secret) else {
        return Err(CliError::NoCredentials {
            profile: profile_name.into(),
        });
    };

    Ok(Connection {
        base_url,
        credentials: Credentials::new(client_id.clone(), SecretString::from(secret.clone())),
        transport: TransportConfig::default()
            .with_timeout(Duration::from_secs(defaults.timeout)),
    })
}
