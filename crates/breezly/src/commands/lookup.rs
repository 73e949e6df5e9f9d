//! Cross-kind search and single-record fetch.

use tabled::Tabled;

use breezly_api::{BreezewayClient, EntityKind, SearchResult};
use breezly_server::format;

use crate::cli::{FetchArgs, GlobalOpts, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::not_found_as;

#[derive(Tabled)]
struct SearchRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Snippet")]
    snippet: String,
}

impl From<&SearchResult> for SearchRow {
    fn from(r: &SearchResult) -> Self {
        Self {
            kind: r.kind.to_string(),
            id: r.id.clone(),
            title: output::truncate(&r.title, 40),
            snippet: output::truncate(&r.snippet, 60),
        }
    }
}

pub async fn search(
    client: &BreezewayClient,
    args: SearchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kinds = args
        .types
        .iter()
        .map(|t| EntityKind::parse(t))
        .collect::<Result<Vec<_>, _>>()?;
    let filter = (!kinds.is_empty()).then_some(kinds.as_slice());

    let results = client.search(&args.query, filter).await;

    if results.is_empty() {
        if !global.quiet {
            eprintln!("{}", format::search_results(&args.query, &results));
        }
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &results,
        |r| SearchRow::from(r),
        |r| format!("{}:{}", r.kind, r.id),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn fetch(
    client: &BreezewayClient,
    args: FetchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = EntityKind::parse(&args.kind)?;
    let record = client
        .get(kind, &args.id)
        .await
        .map_err(not_found_as(kind, &args.id))?;

    let out = output::render_single(
        &global.output,
        &record,
        |r| serde_json::to_string_pretty(r).unwrap_or_default(),
        |r| r.id().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
