//! `breezly auth check`: exchange credentials and report the token state.

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use breezly_api::{BreezewayClient, TokenStatus};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct AuthReport {
    base_url: String,
    client_id: String,
    authenticated: bool,
    expires_at: Option<DateTime<Utc>>,
}

pub async fn handle(
    client: &BreezewayClient,
    args: AuthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Check => {
            let tokens = client.tokens();
            tokens.valid_token().await?;

            let report = AuthReport {
                base_url: client.base_url().to_string(),
                client_id: tokens.client_id().to_owned(),
                authenticated: tokens.status() == TokenStatus::Valid,
                expires_at: tokens.expires_at().map(DateTime::<Utc>::from),
            };

            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &report,
                |r| detail(r, color),
                |r| r.client_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn detail(r: &AuthReport, color: bool) -> String {
    let mark = if color {
        "✓ authenticated".green().bold().to_string()
    } else {
        "✓ authenticated".to_owned()
    };
    let expires = r
        .expires_at
        .map_or_else(|| "unknown".to_owned(), |at| at.to_rfc3339());
    format!(
        "{mark}\n  API:       {}\n  Client id: {}\n  Expires:   {expires}",
        r.base_url, r.client_id,
    )
}
