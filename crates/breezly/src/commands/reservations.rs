//! Reservation command handlers.

use tabled::Tabled;

use breezly_api::{BreezewayClient, Record};

use crate::cli::{GlobalOpts, ReservationsArgs, ReservationsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Guest")]
    guest: String,
    #[tabled(rename = "Check-in")]
    check_in: String,
    #[tabled(rename = "Check-out")]
    check_out: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Record> for ReservationRow {
    fn from(r: &Record) -> Self {
        Self {
            id: r.id().unwrap_or_default(),
            property: r.property_id().unwrap_or_default(),
            guest: r.text("guest_name").unwrap_or_default(),
            check_in: r.check_in().unwrap_or_default(),
            check_out: r.check_out().unwrap_or_default(),
            status: r.status().unwrap_or_default(),
        }
    }
}

pub async fn handle(
    client: &BreezewayClient,
    args: ReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ReservationsCommand::List {
            property_id,
            start_date,
            end_date,
        } => {
            let params: Vec<(&str, &str)> = [
                ("property_id", property_id.as_deref()),
                ("start_date", start_date.as_deref()),
                ("end_date", end_date.as_deref()),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();

            let reservations = client.list_reservations(&params).await?;
            let out = output::render_list(
                &global.output,
                &reservations,
                |r| ReservationRow::from(r),
                |r| r.id().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
