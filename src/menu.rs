//! Interactive command surface: a numbered menu over the ledger API.
//! Every branch parses input, makes one ledger call, and prints the typed
//! result or failure.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use ulid::Ulid;

use crate::export::{self, ExportFormat};
use crate::ledger::{Ledger, LedgerError};
use crate::model::{MINUTE_MS, Ms, ReservationInfo};
use crate::observability;

const MENU: &str = "\
--- maitred ---
1) Add table
2) List tables
3) New reservation
4) List reservations
5) List reservations by date
6) Search by name
7) Cancel reservation
8) Export CSV
9) Export TSV
0) Exit";

/// Parse `YYYY-MM-DD HH:MM` as naive local wall-clock milliseconds.
pub fn parse_datetime(input: &str) -> Option<Ms> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%d %H:%M")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

fn render(r: &ReservationInfo) -> String {
    format!(
        "[{}] {} | {} guests | table {} | {} \u{2192} {}",
        r.id,
        r.name,
        r.guests,
        r.table_id,
        format_instant(r.span.start),
        format_instant(r.span.end),
    )
}

fn format_instant(ms: Ms) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label`, read one line. None on EOF.
    async fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        print!("{label}");
        io::stdout().flush()?;
        self.lines.next_line().await
    }
}

fn count_op(op: &'static str, result: &Result<(), &LedgerError>) {
    match result {
        Ok(()) => {
            metrics::counter!(observability::OPS_TOTAL, "op" => op, "status" => "ok").increment(1);
        }
        Err(e) => {
            metrics::counter!(observability::OPS_TOTAL, "op" => op, "status" => observability::error_label(e))
                .increment(1);
        }
    }
}

/// Run the menu loop until the operator exits or stdin closes.
pub async fn run(ledger: Arc<Ledger>, export_dir: PathBuf) -> io::Result<()> {
    let mut prompter = Prompter::new();
    loop {
        println!("\n{MENU}");
        let Some(choice) = prompter.ask("> ").await? else {
            break;
        };
        match choice.trim() {
            "1" => add_table(&ledger, &mut prompter).await?,
            "2" => list_tables(&ledger),
            "3" => reserve(&ledger, &mut prompter).await?,
            "4" => list(&ledger, None).await,
            "5" => {
                let Some(input) = prompter.ask("Date (YYYY-MM-DD): ").await? else {
                    break;
                };
                match parse_date(&input) {
                    Some(date) => list(&ledger, Some(date)).await,
                    None => println!("Unrecognized date."),
                }
            }
            "6" => search(&ledger, &mut prompter).await?,
            "7" => cancel(&ledger, &mut prompter).await?,
            "8" => export(&ledger, &export_dir, ExportFormat::Csv).await,
            "9" => export(&ledger, &export_dir, ExportFormat::Tsv).await,
            "0" => break,
            other => println!("Unknown choice: {other}"),
        }
    }
    Ok(())
}

async fn add_table(ledger: &Ledger, prompter: &mut Prompter) -> io::Result<()> {
    let Some(input) = prompter.ask("Seats: ").await? else {
        return Ok(());
    };
    let Ok(seats) = input.trim().parse::<u32>() else {
        println!("Seats must be a positive integer.");
        return Ok(());
    };
    match ledger.add_table(seats).await {
        Ok(id) => {
            metrics::gauge!(observability::TABLES_ACTIVE).set(ledger.table_count() as f64);
            count_op("add_table", &Ok(()));
            println!("Table {id} added.");
        }
        Err(e) => {
            count_op("add_table", &Err(&e));
            println!("{e}");
        }
    }
    Ok(())
}

fn list_tables(ledger: &Ledger) {
    let tables = ledger.list_tables();
    if tables.is_empty() {
        println!("No tables.");
        return;
    }
    for t in tables {
        println!("Table {} \u{2013} {} seats", t.id, t.seats);
    }
}

async fn reserve(ledger: &Ledger, prompter: &mut Prompter) -> io::Result<()> {
    let Some(name) = prompter.ask("Name: ").await? else {
        return Ok(());
    };
    let Some(guests_input) = prompter.ask("Guests: ").await? else {
        return Ok(());
    };
    let Ok(guests) = guests_input.trim().parse::<u32>() else {
        println!("Guests must be a positive integer.");
        return Ok(());
    };
    let Some(start_input) = prompter.ask("Start (YYYY-MM-DD HH:MM): ").await? else {
        return Ok(());
    };
    let Some(start) = parse_datetime(&start_input) else {
        println!("Unrecognized start time.");
        return Ok(());
    };
    let Some(duration_input) = prompter.ask("Duration (minutes): ").await? else {
        return Ok(());
    };
    let Ok(duration_min) = duration_input.trim().parse::<i64>() else {
        println!("Duration must be a positive integer.");
        return Ok(());
    };
    let end = start + duration_min * MINUTE_MS;

    let started = Instant::now();
    let result = ledger.reserve(name.trim(), guests, start, end).await;
    metrics::histogram!(observability::RESERVE_DURATION_SECONDS)
        .record(started.elapsed().as_secs_f64());
    match result {
        Ok(c) => {
            metrics::counter!(observability::RESERVATIONS_BOOKED_TOTAL).increment(1);
            count_op("reserve", &Ok(()));
            println!(
                "Reserved table {} for {} (reservation {}).",
                c.table_id,
                name.trim(),
                c.reservation_id
            );
        }
        Err(e) => {
            count_op("reserve", &Err(&e));
            println!("{e}");
        }
    }
    Ok(())
}

async fn list(ledger: &Ledger, date: Option<NaiveDate>) {
    let rows = ledger.list(date).await;
    if rows.is_empty() {
        println!("No reservations.");
        return;
    }
    for r in &rows {
        println!("{}", render(r));
    }
}

async fn search(ledger: &Ledger, prompter: &mut Prompter) -> io::Result<()> {
    let Some(fragment) = prompter.ask("Search name: ").await? else {
        return Ok(());
    };
    let rows = ledger.search(fragment.trim()).await;
    if rows.is_empty() {
        println!("No matches.");
    }
    for r in &rows {
        println!("{}", render(r));
    }
    Ok(())
}

async fn cancel(ledger: &Ledger, prompter: &mut Prompter) -> io::Result<()> {
    let Some(input) = prompter.ask("Reservation ID: ").await? else {
        return Ok(());
    };
    let Ok(id) = Ulid::from_string(input.trim()) else {
        println!("Unrecognized reservation id.");
        return Ok(());
    };
    match ledger.cancel(id).await {
        Ok(table_id) => {
            metrics::counter!(observability::RESERVATIONS_CANCELLED_TOTAL).increment(1);
            count_op("cancel", &Ok(()));
            println!("Cancelled; table {table_id} is free for that interval.");
        }
        Err(e) => {
            count_op("cancel", &Err(&e));
            println!("{e}");
        }
    }
    Ok(())
}

async fn export(ledger: &Ledger, export_dir: &Path, format: ExportFormat) {
    let rows = ledger.list(None).await;
    if rows.is_empty() {
        println!("Nothing to export.");
        return;
    }
    let path = export_dir.join(format!("reservations.{}", format.extension()));
    match export::write_reservations(&path, format, &rows).await {
        Ok(()) => {
            count_op("export", &Ok(()));
            println!("Exported {} reservations to {}", rows.len(), path.display());
        }
        Err(e) => println!("Export failed: {e}"),
    }
}
