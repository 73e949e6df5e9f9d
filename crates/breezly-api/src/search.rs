// Client-side search across the inventory lists
//
// Breezeway has no text-search endpoint. Each requested kind is listed in
// full and every record's JSON text is matched case-insensitively against
// the query. Inventories are small (tens to low hundreds of records), so
// one unfiltered list call per kind is acceptable.

use serde::Serialize;
use tracing::{debug, warn};

use crate::client::BreezewayClient;
use crate::kind::EntityKind;
use crate::record::Record;

/// A single search hit, normalized across kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: String,
    pub title: String,
    pub snippet: String,
    /// The matching record, untouched.
    pub data: Record,
}

impl SearchResult {
    /// Derive title and snippet from the kind-specific fields.
    pub fn from_record(kind: EntityKind, record: Record) -> Self {
        let id = record.id().unwrap_or_default();
        let or_na = |v: Option<String>| v.unwrap_or_else(|| "N/A".into());

        let (title, snippet) = match kind {
            EntityKind::Property => (
                record.name().unwrap_or_default(),
                format!(
                    "Address: {} | Status: {}",
                    or_na(record.address()),
                    or_na(record.status())
                ),
            ),
            EntityKind::Task => (
                record.title().unwrap_or_default(),
                format!("Status: {}", or_na(record.status())),
            ),
            EntityKind::Reservation => (
                format!("Reservation {id}"),
                format!(
                    "Check-in: {} | Check-out: {}",
                    or_na(record.check_in()),
                    or_na(record.check_out())
                ),
            ),
        };

        Self {
            kind,
            id,
            title,
            snippet,
            data: record,
        }
    }
}

/// Whether `record` contains `needle` (already lowercased) anywhere in its
/// serialized form.
pub fn matches(record: &Record, needle: &str) -> bool {
    record.search_text().contains(needle)
}

/// Requested kinds in reporting order (property, task, reservation),
/// deduplicated. `None` means all three.
pub fn requested_kinds(kinds: Option<&[EntityKind]>) -> Vec<EntityKind> {
    match kinds {
        None => EntityKind::ALL.to_vec(),
        Some(kinds) => EntityKind::ALL
            .into_iter()
            .filter(|k| kinds.contains(k))
            .collect(),
    }
}

impl BreezewayClient {
    /// Search the requested kinds (all three by default) for `query`.
    ///
    /// Lists are fetched one kind at a time. A kind whose list call fails
    /// is logged and skipped, so the result is whatever the remaining
    /// kinds matched; this never fails as a whole.
    pub async fn search(&self, query: &str, kinds: Option<&[EntityKind]>) -> Vec<SearchResult> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for kind in requested_kinds(kinds) {
            let records = match self.list(kind, &[]).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(%kind, error = %e, "search: listing {} failed, skipping", kind.plural());
                    continue;
                }
            };

            let before = results.len();
            results.extend(
                records
                    .into_iter()
                    .filter(|r| matches(r, &needle))
                    .map(|r| SearchResult::from_record(kind, r)),
            );
            debug!(%kind, hits = results.len() - before, "search: kind scanned");
        }

        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn property_envelope() {
        let r = record(json!({ "id": 10, "name": "Casa", "address1": "1 Main St", "status": "active" }));
        let hit = SearchResult::from_record(EntityKind::Property, r);
        assert_eq!(hit.id, "10");
        assert_eq!(hit.title, "Casa");
        assert_eq!(hit.snippet, "Address: 1 Main St | Status: active");
    }

    #[test]
    fn task_envelope_defaults_missing_status() {
        let r = record(json!({ "id": "t-1", "title": "Deep clean" }));
        let hit = SearchResult::from_record(EntityKind::Task, r);
        assert_eq!(hit.title, "Deep clean");
        assert_eq!(hit.snippet, "Status: N/A");
    }

    #[test]
    fn reservation_envelope() {
        let r = record(json!({ "id": 5, "check_in": "2025-03-01", "check_out": "2025-03-04" }));
        let hit = SearchResult::from_record(EntityKind::Reservation, r);
        assert_eq!(hit.title, "Reservation 5");
        assert_eq!(hit.snippet, "Check-in: 2025-03-01 | Check-out: 2025-03-04");
    }

    #[test]
    fn envelope_serializes_kind_as_type() {
        let hit = SearchResult::from_record(EntityKind::Task, record(json!({ "id": 1 })));
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["type"], "task");
        assert_eq!(value["data"], json!({ "id": 1 }));
    }

    #[test]
    fn requested_kinds_keep_fixed_order() {
        assert_eq!(
            requested_kinds(Some(&[EntityKind::Reservation, EntityKind::Property, EntityKind::Property])),
            vec![EntityKind::Property, EntityKind::Reservation]
        );
        assert_eq!(requested_kinds(None), EntityKind::ALL.to_vec());
        assert!(requested_kinds(Some(&[])).is_empty());
    }

    #[test]
    fn matching_ignores_case() {
        let r = record(json!({ "id": 1, "address": "12 Needle Lane" }));
        assert!(matches(&r, &"NEEDLE".to_lowercase()));
        assert!(!matches(&r, "haystack"));
    }
}
