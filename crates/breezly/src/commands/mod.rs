//! Command dispatch: bridges CLI args -> API calls -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod lookup;
pub mod properties;
pub mod reservations;
pub mod server;
pub mod tasks;

use std::sync::Arc;

use breezly_api::{BreezewayClient, EntityKind};
use breezly_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: Arc<BreezewayClient>,
    config: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Properties(args) => properties::handle(&client, args, global).await,
        Command::Tasks(args) => tasks::handle(&client, args, global).await,
        Command::Reservations(args) => reservations::handle(&client, args, global).await,
        Command::Search(args) => lookup::search(&client, args, global).await,
        Command::Fetch(args) => lookup::fetch(&client, args, global).await,
        Command::Auth(args) => auth::handle(&client, args, global).await,
        Command::Serve(args) => server::serve(client, args, config).await,
        Command::Mcp => server::mcp(client).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

/// Turn an upstream 404 into a `NotFound` for `kind`.
pub(crate) fn not_found_as(
    kind: EntityKind,
    id: &str,
) -> impl FnOnce(breezly_api::Error) -> CliError {
    let id = id.to_owned();
    move |err| {
        if err.is_not_found() {
            CliError::not_found(kind, id)
        } else {
            err.into()
        }
    }
}
