// breezly-server: MCP, REST and slash-command front-ends over one shared client

pub mod format;
pub mod mcp;
pub mod rest;
pub mod slack;
pub mod tools;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tracing::info;

use breezly_api::BreezewayClient;

pub use tools::{ToolError, Toolbox};

/// State shared by every HTTP handler.
#[derive(Clone)]
pub struct AppState {
    pub toolbox: Toolbox,
    /// When set, slash-command requests must carry a valid Slack signature.
    pub slack_signing_secret: Option<SecretString>,
}

impl AppState {
    pub fn new(client: Arc<BreezewayClient>) -> Self {
        Self {
            toolbox: Toolbox::new(client),
            slack_signing_secret: None,
        }
    }

    pub fn with_slack_signing_secret(mut self, secret: Option<SecretString>) -> Self {
        self.slack_signing_secret = secret;
        self
    }
}

/// REST routes, the slash-command endpoint, and MCP at `/mcp`.
pub fn router(state: AppState) -> Router {
    let mcp = mcp::http_service(state.toolbox.clone());

    rest::routes()
        .route("/slack/commands", post(slack::slash_command))
        .nest_service("/mcp", mcp)
        .with_state(state)
}

/// Bind `addr` and serve [`router`] until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let slack_verified = state.slack_signing_secret.is_some();
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, slack_verified, "HTTP server listening");
    info!("health check: http://{addr}/health");
    info!("MCP endpoint: http://{addr}/mcp");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
