// Plain-text renderings shared by the protocol tools and the CLI.

use std::fmt::Write as _;

use breezly_api::{PropertyUpdate, Record, SearchResult};

const NA: &str = "N/A";
const NOT_SET: &str = "Not set";

/// Numbered search hits, or a "no results" line.
pub fn search_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results found for query: \"{query}\"");
    }

    let body = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. [{}] {}\n   ID: {}\n   {}",
                i + 1,
                r.kind.to_string().to_uppercase(),
                r.title,
                r.id,
                r.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Found {} result(s) for \"{query}\":\n\n{body}", results.len())
}

/// Pretty JSON of a single record inside a fenced block.
pub fn fetch_details(kind: &str, id: &str, record: &Record) -> String {
    let json = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".into());
    format!("Details for {kind} {id}:\n\n```json\n{json}\n```")
}

/// One page of properties out of `total`.
pub fn property_list(page: &[Record], total: usize) -> String {
    let body = page
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "{}. {}\n   ID: {}\n   Internal ID: {}\n   Address: {}",
                i + 1,
                p.name().unwrap_or_default(),
                p.id().unwrap_or_default(),
                p.reference_id().as_deref().unwrap_or(NA),
                p.text("address1").as_deref().unwrap_or(NA),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Found {} {} (of {total} total):\n\n{body}",
        page.len(),
        plural(page.len(), "property", "properties")
    )
}

/// Readable property summary. Note excerpts are included when `with_notes`.
pub fn property_card(p: &Record, with_notes: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**{}**", p.name().unwrap_or_default());
    out.push('\n');
    let _ = writeln!(out, "Breezeway ID: {}", p.id().unwrap_or_default());
    let _ = writeln!(
        out,
        "Internal ID: {}",
        p.reference_id().as_deref().unwrap_or(NA)
    );
    let _ = writeln!(out, "Address: {}", p.text("address1").as_deref().unwrap_or(NA));
    let _ = writeln!(
        out,
        "City: {}, {} {}",
        p.text("city").as_deref().unwrap_or(NA),
        p.text("state").as_deref().unwrap_or(NA),
        p.text("zip").unwrap_or_default(),
    );
    out.push('\n');
    let _ = writeln!(out, "WiFi: {}", p.text("wifi_name").as_deref().unwrap_or(NOT_SET));
    let _ = write!(
        out,
        "WiFi Password: {}",
        p.text("wifi_password").as_deref().unwrap_or(NOT_SET)
    );

    if with_notes {
        out.push_str("\n\n");
        let _ = writeln!(out, "Description: {}", excerpt(p.note(&["about"]), 200));
        let _ = writeln!(out, "Directions: {}", excerpt(p.note(&["direction"]), 100));
        let _ = write!(out, "Trash Info: {}", excerpt(p.note(&["trash_info"]), 100));
    }

    out
}

pub fn task_list(tasks: &[Record]) -> String {
    if tasks.is_empty() {
        return "No tasks found matching the criteria.".into();
    }

    let body = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {}\n   ID: {}\n   Status: {}\n   Property: {}",
                i + 1,
                t.title().unwrap_or_default(),
                t.id().unwrap_or_default(),
                t.status().as_deref().unwrap_or(NA),
                t.property_id().as_deref().unwrap_or(NA),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Found {} {}:\n\n{body}",
        tasks.len(),
        plural(tasks.len(), "task", "tasks")
    )
}

pub fn reservation_list(reservations: &[Record]) -> String {
    if reservations.is_empty() {
        return "No reservations found matching the criteria.".into();
    }

    let body = reservations
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. Reservation {}\n   Check-in: {}\n   Check-out: {}\n   Property: {}",
                i + 1,
                r.id().unwrap_or_default(),
                r.check_in().as_deref().unwrap_or(NA),
                r.check_out().as_deref().unwrap_or(NA),
                r.property_id().as_deref().unwrap_or(NA),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Found {} {}:\n\n{body}",
        reservations.len(),
        plural(reservations.len(), "reservation", "reservations")
    )
}

/// Confirmation after a property PATCH, echoing the requested fields.
pub fn update_summary(id: &str, name: Option<&str>, update: &PropertyUpdate) -> String {
    let fields = serde_json::to_string_pretty(update).unwrap_or_else(|_| "{}".into());
    format!(
        "Successfully updated property {id} ({})\n\nUpdated fields:\n{fields}",
        name.unwrap_or(NA)
    )
}

/// First `max` characters followed by an ellipsis, or "Not set".
pub fn excerpt(text: Option<String>, max: usize) -> String {
    match text {
        Some(text) => {
            let cut: String = text.chars().take(max).collect();
            format!("{cut}...")
        }
        None => NOT_SET.into(),
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}
