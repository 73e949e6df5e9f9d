//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = masked(config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{e}")),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("breezly configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let base_url: String = Input::new()
        .with_prompt("API root URL")
        .default(breezly_api::DEFAULT_BASE_URL.into())
        .interact_text()
        .map_err(prompt_err)?;
    config::parse_base_url(&base_url)?;

    let client_id: String = Input::new()
        .with_prompt("Client id")
        .interact_text()
        .map_err(prompt_err)?;

    let secret = rpassword::prompt_password("Client secret: ").map_err(prompt_err)?;
    if client_id.is_empty() || secret.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "client id and secret cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the client secret?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let client_secret = if store_selection == 0 {
        config::store_client_secret(&profile_name, &secret)?;
        eprintln!("   ✓ Client secret stored in system keyring");
        None
    } else {
        Some(secret)
    };

    let profile = Profile {
        base_url: (base_url != breezly_api::DEFAULT_BASE_URL).then_some(base_url),
        client_id: Some(client_id),
        client_secret,
        ..Profile::default()
    };

    // Keep other profiles and server settings intact.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: breezly auth check");
    Ok(())
}

fn masked(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.client_secret.is_some() {
            profile.client_secret = Some(MASK.into());
        }
    }
    if cfg.server.slack_signing_secret.is_some() {
        cfg.server.slack_signing_secret = Some(MASK.into());
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                client_id: Some("abc".into()),
                client_secret: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.server.slack_signing_secret = Some("slack".into());

        let cfg = masked(cfg);
        let text = toml::to_string_pretty(&cfg).unwrap_or_default();
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("slack\""));
        assert!(text.contains("abc"));
        assert!(text.contains(MASK));
    }
}
