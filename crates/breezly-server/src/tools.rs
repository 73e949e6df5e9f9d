// Named tool registry shared by the MCP handler and the REST tool endpoint.

use std::sync::Arc;

use rmcp::{
    model::{JsonObject, Tool},
    schemars,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use breezly_api::{BreezewayClient, EntityKind, NotesUpdate, PropertyUpdate};

use crate::format;

/// Helper to generate schema without the $schema field
pub fn generate_schema<T: schemars::JsonSchema>() -> Arc<JsonObject> {
    let root = rmcp::schemars::schema_for!(T);
    let mut value = serde_json::to_value(root).unwrap_or(Value::Null);
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        Arc::new(obj.clone())
    } else {
        Arc::new(JsonObject::new())
    }
}

// ── Parameters ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    #[schemars(description = "The search query to find relevant Breezeway data")]
    pub query: String,
    #[schemars(
        description = "Optional: specific entity types to search (properties, tasks, reservations). Defaults to all types."
    )]
    pub types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FetchParams {
    #[serde(rename = "type")]
    #[schemars(description = "The type of entity to fetch: property, task, or reservation")]
    pub kind: String,
    #[schemars(description = "The ID of the entity to fetch")]
    pub id: String,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListPropertiesParams {
    #[schemars(description = "Maximum number of properties to return")]
    pub limit: Option<usize>,
    #[schemars(description = "Number of properties to skip for pagination")]
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPropertyParams {
    #[schemars(description = "The Breezeway property ID")]
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPropertyByInternalIdParams {
    #[serde(rename = "internalId")]
    #[schemars(description = "The Internal ID (reference_property_id from the PMS)")]
    pub internal_id: String,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    #[schemars(description = "Filter tasks by property ID")]
    pub property_id: Option<String>,
    #[schemars(description = "Filter tasks by status (e.g. \"open\", \"completed\")")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListReservationsParams {
    #[schemars(description = "Filter reservations by property ID")]
    pub property_id: Option<String>,
    #[schemars(description = "Filter by check-in date (YYYY-MM-DD)")]
    pub start_date: Option<String>,
    #[schemars(description = "Filter by check-out date (YYYY-MM-DD)")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePropertyParams {
    #[schemars(description = "The Breezeway property ID")]
    pub id: String,
    #[schemars(description = "Fields to update")]
    pub updates: UpdatesParam,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct UpdatesParam {
    #[schemars(description = "WiFi network name")]
    pub wifi_name: Option<String>,
    #[schemars(description = "WiFi password")]
    pub wifi_password: Option<String>,
    pub notes: Option<NotesParam>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct NotesParam {
    #[schemars(description = "Property description")]
    pub about: Option<String>,
    #[schemars(description = "Directions to property")]
    pub direction: Option<String>,
    #[schemars(description = "Trash disposal information")]
    pub trash_info: Option<String>,
    #[schemars(description = "Guest access instructions")]
    pub guest_access: Option<String>,
}

impl From<UpdatesParam> for PropertyUpdate {
    fn from(p: UpdatesParam) -> Self {
        Self {
            wifi_name: p.wifi_name,
            wifi_password: p.wifi_password,
            notes: p.notes.map(|n| NotesUpdate {
                about: n.about,
                direction: n.direction,
                trash_info: n.trash_info,
                guest_access: n.guest_access,
            }),
        }
    }
}

/// Get all tool definitions
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool::new(
            "search",
            "Search across Breezeway properties, tasks, and reservations. Returns a list of relevant results based on the search query.",
            generate_schema::<SearchParams>(),
        ),
        Tool::new(
            "fetch",
            "Fetch detailed information about a specific Breezeway entity (property, task, or reservation) by its ID.",
            generate_schema::<FetchParams>(),
        ),
        Tool::new(
            "list_properties",
            "Get a list of all Breezeway properties with optional pagination. Returns property names, addresses, IDs, and basic info.",
            generate_schema::<ListPropertiesParams>(),
        ),
        Tool::new(
            "get_property",
            "Get detailed information about a specific property by its Breezeway ID, including WiFi, description, directions and trash info.",
            generate_schema::<GetPropertyParams>(),
        ),
        Tool::new(
            "get_property_by_internal_id",
            "Find a property by its Internal ID (the PMS reference id). Useful for cross-referencing between systems.",
            generate_schema::<GetPropertyByInternalIdParams>(),
        ),
        Tool::new(
            "list_tasks",
            "Get a list of tasks, optionally filtered by property ID or status.",
            generate_schema::<ListTasksParams>(),
        ),
        Tool::new(
            "list_reservations",
            "Get a list of reservations, optionally filtered by property ID or date range.",
            generate_schema::<ListReservationsParams>(),
        ),
        Tool::new(
            "update_property",
            "[ADMIN ONLY] Update property information like WiFi credentials, description, directions, or trash info.",
            generate_schema::<UpdatePropertyParams>(),
        ),
    ]
}

// ── Dispatch ────────────────────────────────────────────────────────

/// Why a tool call produced no output.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The tool ran and the Breezeway API call failed.
    #[error(transparent)]
    Failed(#[from] breezly_api::Error),
}

impl ToolError {
    /// Text for an error-flagged tool result.
    pub fn tool_message(&self, name: &str) -> String {
        format!("Error executing tool \"{name}\": {self}")
    }
}

/// Executes named tools against a shared client.
#[derive(Clone)]
pub struct Toolbox {
    client: Arc<BreezewayClient>,
}

impl Toolbox {
    pub fn new(client: Arc<BreezewayClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BreezewayClient {
        &self.client
    }

    /// Run `name` with JSON `args` and return its text output.
    pub async fn call(&self, name: &str, args: Value) -> Result<String, ToolError> {
        debug!(tool = name, "tool call");
        match name {
            "search" => self.search(parse(name, args)?).await,
            "fetch" => self.fetch(parse(name, args)?).await,
            "list_properties" => self.list_properties(parse(name, args)?).await,
            "get_property" => self.get_property(parse(name, args)?).await,
            "get_property_by_internal_id" => {
                self.get_property_by_internal_id(parse(name, args)?).await
            }
            "list_tasks" => self.list_tasks(parse(name, args)?).await,
            "list_reservations" => self.list_reservations(parse(name, args)?).await,
            "update_property" => self.update_property(parse(name, args)?).await,
            _ => Err(ToolError::UnknownTool(name.to_owned())),
        }
    }

    async fn search(&self, p: SearchParams) -> Result<String, ToolError> {
        let kinds = p
            .types
            .map(|types| {
                types
                    .iter()
                    .map(|t| EntityKind::parse(t))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|e| ToolError::InvalidArguments {
                tool: "search".into(),
                message: e.to_string(),
            })?;

        let results = self.client.search(&p.query, kinds.as_deref()).await;
        Ok(format::search_results(&p.query, &results))
    }

    async fn fetch(&self, p: FetchParams) -> Result<String, ToolError> {
        let record = self.client.fetch(&p.kind, &p.id).await?;
        Ok(format::fetch_details(&p.kind, &p.id, &record))
    }

    async fn list_properties(&self, p: ListPropertiesParams) -> Result<String, ToolError> {
        let all = self.client.list_properties(&[]).await?;
        let page: Vec<_> = all
            .iter()
            .skip(p.offset.unwrap_or(0))
            .take(p.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(format::property_list(&page, all.len()))
    }

    async fn get_property(&self, p: GetPropertyParams) -> Result<String, ToolError> {
        let property = self.client.get(EntityKind::Property, &p.id).await?;
        Ok(format::property_card(&property, true))
    }

    async fn get_property_by_internal_id(
        &self,
        p: GetPropertyByInternalIdParams,
    ) -> Result<String, ToolError> {
        let Some(property) = find_by_internal_id(&self.client, &p.internal_id).await? else {
            return Ok(format!(
                "No property found with Internal ID: {}",
                p.internal_id
            ));
        };
        Ok(format::property_card(&property, false))
    }

    async fn list_tasks(&self, p: ListTasksParams) -> Result<String, ToolError> {
        let params = query_pairs(&[("property_id", &p.property_id), ("status", &p.status)]);
        let tasks = self.client.list_tasks(&borrow_pairs(&params)).await?;
        Ok(format::task_list(&tasks))
    }

    async fn list_reservations(&self, p: ListReservationsParams) -> Result<String, ToolError> {
        let params = query_pairs(&[
            ("property_id", &p.property_id),
            ("start_date", &p.start_date),
            ("end_date", &p.end_date),
        ]);
        let reservations = self
            .client
            .list_reservations(&borrow_pairs(&params))
            .await?;
        Ok(format::reservation_list(&reservations))
    }

    async fn update_property(&self, p: UpdatePropertyParams) -> Result<String, ToolError> {
        let update = PropertyUpdate::from(p.updates);
        let current = self.client.get(EntityKind::Property, &p.id).await?;
        self.client
            .update_property(&p.id, &update.to_patch(&current))
            .await?;
        Ok(format::update_summary(
            &p.id,
            current.name().as_deref(),
            &update,
        ))
    }
}

/// Scan the property list for a matching `reference_property_id`, then
/// fetch that property's full record.
pub async fn find_by_internal_id(
    client: &BreezewayClient,
    internal_id: &str,
) -> Result<Option<breezly_api::Record>, breezly_api::Error> {
    let properties = client.list_properties(&[]).await?;
    let Some(id) = properties
        .iter()
        .find(|p| p.reference_id().as_deref() == Some(internal_id))
        .and_then(breezly_api::Record::id)
    else {
        return Ok(None);
    };
    client.get(EntityKind::Property, &id).await.map(Some)
}

fn parse<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_owned(),
        message: e.to_string(),
    })
}

/// Keep only the filters that were given.
fn query_pairs(filters: &[(&'static str, &Option<String>)]) -> Vec<(&'static str, String)> {
    filters
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (*key, v.clone())))
        .collect()
}

fn borrow_pairs<'a>(pairs: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    pairs.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_tool_has_an_object_schema() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 8);
        for tool in &tools {
            assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
            assert!(!tool.input_schema.contains_key("$schema"));
        }
    }

    #[test]
    fn parses_camel_case_filters() {
        let p: ListReservationsParams =
            parse("list_reservations", json!({ "propertyId": "7", "startDate": "2025-01-01" }))
                .unwrap();
        assert_eq!(p.property_id.as_deref(), Some("7"));
        assert_eq!(p.start_date.as_deref(), Some("2025-01-01"));
        assert!(p.end_date.is_none());
    }

    #[test]
    fn null_arguments_mean_empty_object() {
        let p: ListPropertiesParams = parse("list_properties", Value::Null).unwrap();
        assert!(p.limit.is_none());
    }

    #[test]
    fn missing_required_argument_is_invalid() {
        let err = parse::<FetchParams>("fetch", json!({ "id": "1" })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref tool, .. } if tool == "fetch"));
    }

    #[test]
    fn query_pairs_drop_missing_filters() {
        let pairs = query_pairs(&[("property_id", &Some("7".into())), ("status", &None)]);
        assert_eq!(pairs, vec![("property_id", "7".to_owned())]);
    }

    #[test]
    fn tool_message_names_the_tool() {
        let err = ToolError::Failed(breezly_api::Error::UnsupportedKind("guest".into()));
        assert_eq!(
            err.tool_message("fetch"),
            "Error executing tool \"fetch\": Unknown entity type: guest"
        );
    }
}
