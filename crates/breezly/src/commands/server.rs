//! `breezly serve` and `breezly mcp`.

use std::net::SocketAddr;
use std::sync::Arc;

use breezly_api::BreezewayClient;
use breezly_config::Config;
use breezly_server::{AppState, Toolbox};

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn serve(
    client: Arc<BreezewayClient>,
    args: ServeArgs,
    config: &Config,
) -> Result<(), CliError> {
    let addr: SocketAddr = match args.bind {
        Some(ref bind) => bind.parse().map_err(|_| CliError::Validation {
            field: "bind".into(),
            reason: format!("expected host:port, got '{bind}'"),
        })?,
        None => config.server.bind_addr()?,
    };

    let state = AppState::new(client)
        .with_slack_signing_secret(config.server.slack_signing_secret());
    if state.slack_signing_secret.is_none() {
        tracing::warn!("no Slack signing secret configured; slash commands are not verified");
    }

    breezly_server::serve(addr, state)
        .await
        .map_err(|e| CliError::Server {
            message: format!("{e:#}"),
        })
}

pub async fn mcp(client: Arc<BreezewayClient>) -> Result<(), CliError> {
    breezly_server::mcp::serve_stdio(Toolbox::new(client))
        .await
        .map_err(|e| CliError::Server {
            message: format!("{e:#}"),
        })
}
