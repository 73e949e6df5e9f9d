// Schema-less entity records
//
// Breezeway's payloads are neither fully documented nor stable, so records
// stay as open JSON objects. Accessors cover the handful of fields the
// front-ends rely on; everything else is reachable through `get`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A property, task, or reservation as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field access.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Field rendered as text: non-empty strings as-is, numbers and
    /// booleans via `to_string`. Empty strings, nulls and containers
    /// yield `None`.
    pub fn text(&self, key: &str) -> Option<String> {
        value_text(self.0.get(key)?)
    }

    /// Identifier as a string (Breezeway ids are usually numeric).
    pub fn id(&self) -> Option<String> {
        self.text("id")
    }

    /// Property display name (`name`, falling back to `display`).
    pub fn name(&self) -> Option<String> {
        self.text("name").or_else(|| self.text("display"))
    }

    /// Task title (`title`, falling back to `name`).
    pub fn title(&self) -> Option<String> {
        self.text("title").or_else(|| self.text("name"))
    }

    pub fn status(&self) -> Option<String> {
        self.text("status")
    }

    /// Street address (`address`, falling back to `address1`).
    pub fn address(&self) -> Option<String> {
        self.text("address").or_else(|| self.text("address1"))
    }

    pub fn property_id(&self) -> Option<String> {
        self.text("property_id")
    }

    pub fn check_in(&self) -> Option<String> {
        self.text("check_in")
    }

    pub fn check_out(&self) -> Option<String> {
        self.text("check_out")
    }

    /// External PMS reference (the "internal id" used by property managers).
    pub fn reference_id(&self) -> Option<String> {
        self.text("reference_property_id")
    }

    /// The nested `notes` object, if present.
    pub fn notes(&self) -> Option<&Map<String, Value>> {
        self.0.get("notes")?.as_object()
    }

    /// First non-empty note among `keys`.
    pub fn note(&self, keys: &[&str]) -> Option<String> {
        let notes = self.notes()?;
        keys.iter().find_map(|k| notes.get(*k).and_then(value_text))
    }

    /// WiFi network and password, from top-level fields or `notes`.
    pub fn wifi(&self) -> Option<(String, Option<String>)> {
        let network = self
            .text("wifi_name")
            .or_else(|| self.note(&["wifi_network", "wifi network"]))?;
        let password = self
            .text("wifi_password")
            .or_else(|| self.note(&["wifi_password", "wifi password"]));
        Some((network, password))
    }

    /// Lowercased canonical JSON text, used for substring search.
    pub fn search_text(&self) -> String {
        serde_json::to_string(&self.0)
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
