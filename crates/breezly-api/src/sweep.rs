// Completed-task sweep
//
// The task list accepts `completed_after` / `completed_before` on some
// accounts and rejects them on others. The sweep tries the server-side
// filter first; if that call fails it walks active properties one by one,
// listing each property's tasks with a fixed pause between calls to stay
// under the API's rate limit.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use crate::client::BreezewayClient;
use crate::error::Error;
use crate::record::Record;

/// Pause between per-property task list calls.
pub const DEFAULT_PROPERTY_DELAY: Duration = Duration::from_millis(500);

/// Which path produced the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSource {
    /// The server honoured the completion-date filter.
    ServerFilter,
    /// The filter was rejected; tasks were collected per property.
    PerProperty { properties: usize, failed: usize },
}

/// Outcome of a sweep over a time window.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub source: SweepSource,
    /// Every task fetched, completed or not.
    pub tasks: Vec<Record>,
    /// Tasks completed inside the window.
    pub completed: Vec<Record>,
}

impl SweepReport {
    /// Task count per status; tasks without a status count as `unknown`.
    pub fn status_breakdown(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for task in &self.tasks {
            let status = task.status().unwrap_or_else(|| "unknown".into());
            *counts.entry(status).or_insert(0) += 1;
        }
        counts
    }
}

/// Finds tasks completed within a time window.
pub struct TaskSweep<'a> {
    client: &'a BreezewayClient,
    delay: Duration,
}

impl<'a> TaskSweep<'a> {
    pub fn new(client: &'a BreezewayClient) -> Self {
        Self {
            client,
            delay: DEFAULT_PROPERTY_DELAY,
        }
    }

    /// Override the pause between per-property calls.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Collect tasks and keep those completed in `[start, end]`.
    ///
    /// Only a failure to list properties on the fallback path is an
    /// error; individual property failures are logged and skipped.
    pub async fn completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<SweepReport, Error> {
        let after = start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let before = end.to_rfc3339_opts(SecondsFormat::Millis, true);

        let filtered = self
            .client
            .list_tasks(&[("completed_after", &after), ("completed_before", &before)])
            .await;

        let (source, tasks) = match filtered {
            Ok(tasks) => {
                debug!(count = tasks.len(), "date filter accepted");
                (SweepSource::ServerFilter, tasks)
            }
            Err(e) => {
                info!(error = %e, "date filter rejected, sweeping property by property");
                self.per_property().await?
            }
        };

        let completed = tasks
            .iter()
            .filter(|t| completed_within(t, start, end))
            .cloned()
            .collect();

        Ok(SweepReport {
            source,
            tasks,
            completed,
        })
    }

    async fn per_property(&self) -> Result<(SweepSource, Vec<Record>), Error> {
        let properties: Vec<Record> = self
            .client
            .list_properties(&[])
            .await?
            .into_iter()
            .filter(is_active_rental)
            .collect();

        debug!(count = properties.len(), "active rental properties");

        let mut tasks = Vec::new();
        let mut failed = 0;

        for (index, property) in properties.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let Some(id) = property.id() else {
                continue;
            };

            match self.client.list_tasks(&[("property_id", &id)]).await {
                Ok(found) => {
                    debug!(property = %id, count = found.len(), "property tasks");
                    tasks.extend(found);
                }
                Err(e) => {
                    warn!(property = %id, error = %e, "listing property tasks failed");
                    failed += 1;
                }
            }
        }

        let source = SweepSource::PerProperty {
            properties: properties.len(),
            failed,
        };
        Ok((source, tasks))
    }
}

/// Active rental units: status `active`, excluding `ZZ…` archive entries
/// and `#00…` warehouse / training entries.
pub fn is_active_rental(property: &Record) -> bool {
    let name = property.name().unwrap_or_default();
    property.status().as_deref() == Some("active")
        && !name.starts_with("ZZ")
        && !name.starts_with("#00")
}

/// Status is `completed` / `complete` and the completion time falls in
/// `[start, end]`.
pub fn completed_within(task: &Record, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    let done = matches!(task.status().as_deref(), Some("completed" | "complete"));
    if !done {
        return false;
    }

    ["completed_at", "completed_date", "updated_at"]
        .iter()
        .find_map(|key| task.text(key))
        .and_then(|raw| parse_timestamp(&raw))
        .is_some_and(|at| at >= start && at <= end)
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
