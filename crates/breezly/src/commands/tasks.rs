//! Task command handlers.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, IsTerminal};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use indicatif::ProgressBar;
use serde::Serialize;
use tabled::Tabled;

use breezly_api::{BreezewayClient, Record, SweepSource, TaskSweep, parse_timestamp};

use crate::cli::{CompletedArgs, GlobalOpts, TasksArgs, TasksCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Scheduled")]
    scheduled: String,
}

impl From<&Record> for TaskRow {
    fn from(t: &Record) -> Self {
        Self {
            id: t.id().unwrap_or_default(),
            title: output::truncate(&t.title().unwrap_or_default(), 40),
            property: t.property_id().unwrap_or_default(),
            status: t.status().unwrap_or_default(),
            scheduled: t.text("scheduled_date").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletedSummary {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source: &'static str,
    properties_swept: Option<usize>,
    properties_failed: Option<usize>,
    fetched: usize,
    by_status: BTreeMap<String, usize>,
    completed: Vec<Record>,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &BreezewayClient,
    args: TasksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TasksCommand::List {
            property_id,
            status,
        } => {
            let mut params = Vec::new();
            if let Some(ref id) = property_id {
                params.push(("property_id", id.as_str()));
            }
            if let Some(ref status) = status {
                params.push(("status", status.as_str()));
            }

            let tasks = client.list_tasks(&params).await?;
            let out = output::render_list(
                &global.output,
                &tasks,
                |t| TaskRow::from(t),
                |t| t.id().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TasksCommand::Completed(window) => completed(client, &window, global).await,
    }
}

async fn completed(
    client: &BreezewayClient,
    args: &CompletedArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (start, end) = resolve_window(args, Utc::now())?;

    let spinner = if global.quiet || !io::stderr().is_terminal() {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_message(format!("Collecting tasks completed {start} .. {end}"));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    };

    let sweep = TaskSweep::new(client).with_delay(Duration::from_millis(args.delay_ms));
    let result = sweep.completed_between(start, end).await;
    spinner.finish_and_clear();
    let report = result?;

    let (source, properties_swept, properties_failed) = match report.source {
        SweepSource::ServerFilter => ("server_filter", None, None),
        SweepSource::PerProperty { properties, failed } => {
            ("per_property", Some(properties), Some(failed))
        }
    };
    let summary = CompletedSummary {
        start,
        end,
        source,
        properties_swept,
        properties_failed,
        fetched: report.tasks.len(),
        by_status: report.status_breakdown(),
        completed: report.completed,
    };

    let out = output::render_single(
        &global.output,
        &summary,
        render_summary,
        |s| {
            s.completed
                .iter()
                .filter_map(Record::id)
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_summary(s: &CompletedSummary) -> String {
    let mut text = format!("Window: {} .. {}\n", s.start, s.end);
    match (s.properties_swept, s.properties_failed) {
        (Some(swept), Some(failed)) => {
            let _ = writeln!(
                text,
                "Source: per-property sweep ({swept} properties, {failed} failed)"
            );
        }
        _ => text.push_str("Source: server date filter\n"),
    }
    let _ = writeln!(text, "Tasks fetched: {}", s.fetched);
    for (status, n) in &s.by_status {
        let _ = writeln!(text, "  {status}: {n}");
    }
    let _ = write!(text, "\nCompleted in window: {}", s.completed.len());

    if !s.completed.is_empty() {
        let rows: Vec<TaskRow> = s.completed.iter().map(TaskRow::from).collect();
        let _ = write!(
            text,
            "\n{}",
            tabled::Table::new(rows).with(tabled::settings::Style::rounded())
        );
    }
    text
}

/// `--since`/`--until`, or the last `--hours` ending now.
fn resolve_window(
    args: &CompletedArgs,
    now: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), CliError> {
    let end = match args.until {
        Some(ref raw) => parse_bound("until", raw)?,
        None => now,
    };
    let start = match args.since {
        Some(ref raw) => parse_bound("since", raw)?,
        None => end - chrono::Duration::hours(i64::from(args.hours)),
    };

    if start > end {
        return Err(CliError::Validation {
            field: "since".into(),
            reason: format!("window start {start} is after its end {end}"),
        });
    }
    Ok((start, end))
}

fn parse_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, CliError> {
    parse_timestamp(raw)
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| CliError::Validation {
            field: field.into(),
            reason: format!("expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD', got '{raw}'"),
        })
}
