// Caller-side partial property updates
//
// The gateway's PATCH sends whatever body it is given. Building that body
// is the caller's job: `notes` is a nested object on the server, and a
// PATCH replaces it wholesale, so untouched note keys have to be copied
// over from the current record first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::Record;

/// Editable property fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<NotesUpdate>,
}

/// Editable keys inside a property's `notes` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trash_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_access: Option<String>,
}

impl NotesUpdate {
    pub fn is_empty(&self) -> bool {
        self.about.is_none()
            && self.direction.is_none()
            && self.trash_info.is_none()
            && self.guest_access.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &String)> {
        [
            ("about", self.about.as_ref()),
            ("direction", self.direction.as_ref()),
            ("trash_info", self.trash_info.as_ref()),
            ("guest_access", self.guest_access.as_ref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
    }
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        self.wifi_name.is_none()
            && self.wifi_password.is_none()
            && self.notes.as_ref().is_none_or(NotesUpdate::is_empty)
    }

    /// Build the PATCH body against the record as it currently stands.
    ///
    /// WiFi fields are sent only when set. When any note is set, the
    /// body's `notes` is the current `notes` object with the new keys
    /// laid over it.
    pub fn to_patch(&self, current: &Record) -> Value {
        let mut body = Map::new();

        if let Some(ref name) = self.wifi_name {
            body.insert("wifi_name".into(), Value::String(name.clone()));
        }
        if let Some(ref password) = self.wifi_password {
            body.insert("wifi_password".into(), Value::String(password.clone()));
        }

        if let Some(notes) = self.notes.as_ref().filter(|n| !n.is_empty()) {
            let mut merged = current.notes().cloned().unwrap_or_default();
            for (key, value) in notes.entries() {
                merged.insert(key.into(), Value::String(value.clone()));
            }
            body.insert("notes".into(), Value::Object(merged));
        }

        Value::Object(body)
    }
}
