use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::Error;

/// The three resource families exposed by the Breezeway inventory API.
///
/// Parses from either the singular or plural spelling, ignoring ASCII
/// case (`property`, `Properties`, ...). Displays as the singular.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[strum(to_string = "property", serialize = "properties")]
    #[serde(alias = "properties")]
    Property,
    #[strum(to_string = "task", serialize = "tasks")]
    #[serde(alias = "tasks")]
    Task,
    #[strum(to_string = "reservation", serialize = "reservations")]
    #[serde(alias = "reservations")]
    Reservation,
}

impl EntityKind {
    /// Every kind, in the order search results are reported.
    pub const ALL: [Self; 3] = [Self::Property, Self::Task, Self::Reservation];

    /// Parse a caller-supplied kind name.
    pub fn parse(name: &str) -> Result<Self, Error> {
        Self::from_str(name.trim()).map_err(|_| Error::UnsupportedKind(name.to_owned()))
    }

    /// List endpoint. The task list lives under a trailing slash.
    pub fn list_path(self) -> &'static str {
        match self {
            Self::Property => "/public/inventory/v1/property",
            Self::Task => "/public/inventory/v1/task/",
            Self::Reservation => "/public/inventory/v1/reservation",
        }
    }

    /// Detail endpoint for a single record.
    pub fn detail_path(self, id: &str) -> String {
        let base = self.list_path().trim_end_matches('/');
        format!("{base}/{id}")
    }

    /// Plural noun, used in human-readable summaries.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Property => "properties",
            Self::Task => "tasks",
            Self::Reservation => "reservations",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural() {
        assert_eq!(EntityKind::parse("property").unwrap(), EntityKind::Property);
        assert_eq!(EntityKind::parse("tasks").unwrap(), EntityKind::Task);
        assert_eq!(
            EntityKind::parse("Reservations").unwrap(),
            EntityKind::Reservation
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = EntityKind::parse("guest").unwrap_err();
        assert!(matches!(err, Error::UnsupportedKind(ref k) if k == "guest"));
    }

    #[test]
    fn displays_singular() {
        assert_eq!(EntityKind::Task.to_string(), "task");
        let name: &'static str = EntityKind::Reservation.into();
        assert_eq!(name, "reservation");
    }

    #[test]
    fn paths_match_inventory_api() {
        assert_eq!(EntityKind::Task.list_path(), "/public/inventory/v1/task/");
        assert_eq!(
            EntityKind::Task.detail_path("42"),
            "/public/inventory/v1/task/42"
        );
        assert_eq!(
            EntityKind::Property.detail_path("737329"),
            "/public/inventory/v1/property/737329"
        );
    }

    #[test]
    fn serde_accepts_plural_alias() {
        let kinds: Vec<EntityKind> =
            serde_json::from_str(r#"["properties", "task", "reservations"]"#).unwrap();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
        assert_eq!(
            serde_json::to_string(&EntityKind::Property).unwrap(),
            r#""property""#
        );
    }
}
