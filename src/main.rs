use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveTime, Timelike};
use clap::Parser;
use tracing::info;

use maitred::compactor;
use maitred::ledger::{Ledger, OperatingHours};
use maitred::menu;
use maitred::model::{DAY_MS, Ms};

/// Restaurant table reservation ledger with an interactive menu.
#[derive(Parser, Debug)]
#[command(name = "maitred", version, about)]
struct Args {
    /// Directory holding the reservation journal and exports.
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Opening time, HH:MM.
    #[arg(long, default_value = "11:00")]
    open: String,

    /// Closing time, HH:MM (24:00 for midnight).
    #[arg(long, default_value = "22:00")]
    close: String,

    /// Journal appends before background compaction kicks in.
    #[arg(long, default_value_t = 1000)]
    compact_threshold: u64,

    /// Serve Prometheus metrics on this port.
    #[arg(long)]
    metrics_port: Option<u16>,
}

/// Wall-clock `HH:MM` as milliseconds after midnight; accepts `24:00`.
fn parse_wall_clock(input: &str) -> Option<Ms> {
    if input == "24:00" {
        return Some(DAY_MS);
    }
    NaiveTime::parse_from_str(input, "%H:%M")
        .ok()
        .map(|t| t.num_seconds_from_midnight() as Ms * 1000)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    maitred::observability::init(args.metrics_port);

    let open_ms = parse_wall_clock(&args.open).ok_or("invalid --open time")?;
    let close_ms = parse_wall_clock(&args.close).ok_or("invalid --close time")?;
    let hours =
        OperatingHours::new(open_ms, close_ms).ok_or("closing time must be after opening time")?;

    std::fs::create_dir_all(&args.data_dir)?;
    let journal_path = args.data_dir.join("reservations.journal");
    let ledger = Arc::new(Ledger::open(journal_path, hours)?);

    info!("maitred ready, {} tables on the floor", ledger.table_count());
    info!("  data_dir: {}", args.data_dir.display());
    info!("  hours: {}\u{2013}{}", args.open, args.close);
    info!(
        "  metrics: {}",
        args.metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    tokio::spawn(compactor::run_compactor(
        ledger.clone(),
        args.compact_threshold,
    ));

    menu::run(ledger, args.data_dir).await?;

    info!("maitred stopped");
    Ok(())
}
