//! Property command handlers.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use breezly_api::{BreezewayClient, EntityKind, NotesUpdate, PropertyUpdate, Record};
use breezly_server::format;
use breezly_server::tools::find_by_internal_id;

use crate::cli::{GlobalOpts, PageArgs, PropertiesArgs, PropertiesCommand, UpdateArgs};
use crate::error::CliError;
use crate::output;

use super::not_found_as;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct PropertyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Internal ID")]
    reference: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "City")]
    city: String,
}

impl From<&Record> for PropertyRow {
    fn from(p: &Record) -> Self {
        Self {
            id: p.id().unwrap_or_default(),
            name: output::truncate(&p.name().unwrap_or_default(), 40),
            reference: p.reference_id().unwrap_or_default(),
            status: p.status().unwrap_or_default(),
            city: p.text("city").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PropertyCount {
    total: usize,
    by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
struct WifiDetails {
    property_id: String,
    name: Option<String>,
    network: Option<String>,
    password: Option<String>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &BreezewayClient,
    args: PropertiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PropertiesCommand::List(page) => list(client, &page, global).await,

        PropertiesCommand::Get { id } => {
            let property = client
                .get(EntityKind::Property, &id)
                .await
                .map_err(not_found_as(EntityKind::Property, &id))?;
            print_property(&property, global);
            Ok(())
        }

        PropertiesCommand::Find { internal_id } => {
            let property = find_by_internal_id(client, &internal_id)
                .await?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "property with internal id".into(),
                    identifier: internal_id.clone(),
                    list_command: "properties list".into(),
                })?;
            print_property(&property, global);
            Ok(())
        }

        PropertiesCommand::Count => {
            let properties = client.list_properties(&[]).await?;
            let mut by_status = BTreeMap::new();
            for p in &properties {
                let status = p.status().unwrap_or_else(|| "unknown".into());
                *by_status.entry(status).or_insert(0) += 1;
            }
            let count = PropertyCount {
                total: properties.len(),
                by_status,
            };

            let out = output::render_single(
                &global.output,
                &count,
                |c| {
                    let mut text = format!("Total properties: {}", c.total);
                    for (status, n) in &c.by_status {
                        let _ = write!(text, "\n  {status}: {n}");
                    }
                    text
                },
                |c| c.total.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PropertiesCommand::Wifi { id } => {
            let property = client
                .get(EntityKind::Property, &id)
                .await
                .map_err(not_found_as(EntityKind::Property, &id))?;
            let (network, password) = property
                .wifi()
                .map_or((None, None), |(network, password)| (Some(network), password));
            let details = WifiDetails {
                property_id: id,
                name: property.name(),
                network,
                password,
            };

            let out = output::render_single(
                &global.output,
                &details,
                |d| match d.network {
                    Some(ref network) => format!(
                        "{}\nNetwork: {network}\nPassword: {}",
                        d.name.as_deref().unwrap_or(&d.property_id),
                        d.password.as_deref().unwrap_or("Not set"),
                    ),
                    None => format!("No WiFi details on file for property {}", d.property_id),
                },
                |d| d.network.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PropertiesCommand::Update(args) => update(client, args, global).await,
    }
}

async fn list(
    client: &BreezewayClient,
    page: &PageArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let all = client.list_properties(&[]).await?;
    let shown: Vec<Record> = all
        .into_iter()
        .skip(page.offset)
        .take(page.limit.unwrap_or(usize::MAX))
        .collect();

    let out = output::render_list(
        &global.output,
        &shown,
        |p| PropertyRow::from(p),
        |p| p.id().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn update(
    client: &BreezewayClient,
    args: UpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let notes = NotesUpdate {
        about: args.about,
        direction: args.direction,
        trash_info: args.trash_info,
        guest_access: args.guest_access,
    };
    let update = PropertyUpdate {
        wifi_name: args.wifi_name,
        wifi_password: args.wifi_password,
        notes: (!notes.is_empty()).then_some(notes),
    };
    if update.is_empty() {
        return Err(CliError::Validation {
            field: "update".into(),
            reason: "nothing to change; pass at least one of --wifi-name, --wifi-password, \
                     --about, --direction, --trash-info, --guest-access"
                .into(),
        });
    }

    let id = args.id;
    let current = client
        .get(EntityKind::Property, &id)
        .await
        .map_err(not_found_as(EntityKind::Property, &id))?;
    let updated = client.update_property(&id, &update.to_patch(&current)).await?;

    let out = output::render_single(
        &global.output,
        &updated,
        |_| format::update_summary(&id, current.name().as_deref(), &update),
        |p| p.id().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_property(property: &Record, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        property,
        |p| format::property_card(p, true),
        |p| p.id().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
}
