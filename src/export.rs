use std::io;
use std::path::Path;

use chrono::DateTime;
use csv_async::AsyncWriterBuilder;
use tokio::fs::File;

use crate::model::{Ms, ReservationInfo};

/// Output flavors for the reservation export. Both are delimited text;
/// either loads directly into a spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }
}

/// Render a timestamp for the export (naive local wall-clock).
fn format_instant(ms: Ms) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Write the reservation set as delimited text, one row per reservation:
/// `ID,Name,Guests,Table,Start,End`. Rows come from a ledger snapshot, in
/// whatever order the caller sorted them.
pub async fn write_reservations(
    path: &Path,
    format: ExportFormat,
    rows: &[ReservationInfo],
) -> io::Result<()> {
    let file = File::create(path).await?;
    let mut writer = AsyncWriterBuilder::new()
        .delimiter(format.delimiter())
        .create_writer(file);

    writer
        .write_record(["ID", "Name", "Guests", "Table", "Start", "End"])
        .await
        .map_err(io::Error::other)?;
    for r in rows {
        writer
            .write_record([
                r.id.to_string(),
                r.name.clone(),
                r.guests.to_string(),
                r.table_id.to_string(),
                format_instant(r.span.start),
                format_instant(r.span.end),
            ])
            .await
            .map_err(io::Error::other)?;
    }
    writer.flush().await.map_err(io::Error::other)?;
    Ok(())
}
