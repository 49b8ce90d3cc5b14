//! Reservation stress driver: hammers the ledger from many tasks and
//! reports latency percentiles. Run with `cargo bench`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use maitred::ledger::{Ledger, LedgerError, OperatingHours};
use maitred::model::{DAY_MS, HOUR_MS, MINUTE_MS, Ms};

const DAY0: Ms = 21_000 * DAY_MS;
const SLOT: Ms = 30 * MINUTE_MS;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    println!("  {label}:");
    println!(
        "    n={}, avg={:.2}ms, p50={:.2}ms, p95={:.2}ms, p99={:.2}ms, max={:.2}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        latencies.last().unwrap().as_secs_f64() * 1000.0,
    );
}

/// Slot s of day d, inside the 11:00-22:00 window (22 half-hour slots/day).
fn slot(day: i64, s: i64) -> Ms {
    DAY0 + day * DAY_MS + 11 * HOUR_MS + s * SLOT
}

fn bench_ledger(name: &str) -> Ledger {
    let dir = std::env::temp_dir().join("maitred_bench");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    Ledger::open(path, OperatingHours::default()).unwrap()
}

async fn phase1_sequential() {
    let ledger = bench_ledger("phase1.journal");
    ledger.add_table(4).await.unwrap();

    let n = 2000usize;
    let mut latencies = Vec::with_capacity(n);
    let start = Instant::now();

    for i in 0..n as i64 {
        // Disjoint slots: fill day after day, never a conflict.
        let s = slot(i / 22, i % 22);
        let t = Instant::now();
        ledger
            .reserve("Sequential", 2, s, s + SLOT)
            .await
            .unwrap();
        latencies.push(t.elapsed());
    }

    let elapsed = start.elapsed();
    println!(
        "  {} bookings in {:.2}s ({:.0}/s)",
        n,
        elapsed.as_secs_f64(),
        n as f64 / elapsed.as_secs_f64()
    );
    print_latency("sequential reserve", &mut latencies);
}

async fn phase2_contended() {
    let ledger = Arc::new(bench_ledger("phase2.journal"));
    for seats in [2, 2, 2, 2, 2, 4, 4, 4, 6, 6] {
        ledger.add_table(seats).await.unwrap();
    }

    let workers = 32usize;
    let attempts = 200i64;
    let start = Instant::now();

    let mut handles = Vec::new();
    for w in 0..workers as i64 {
        let ledger = ledger.clone();
        handles.push(tokio::spawn(async move {
            let mut latencies = Vec::with_capacity(attempts as usize);
            let mut booked = 0u64;
            let mut rejected = 0u64;
            for i in 0..attempts {
                // All workers fight over the same two service days.
                let s = slot((w + i) % 2, (w * 7 + i) % 22);
                let t = Instant::now();
                match ledger.reserve("Contended", 2, s, s + SLOT).await {
                    Ok(_) => booked += 1,
                    Err(LedgerError::NoTableAvailable { .. }) => rejected += 1,
                    Err(e) => panic!("unexpected error: {e}"),
                }
                latencies.push(t.elapsed());
            }
            (latencies, booked, rejected)
        }));
    }

    let mut latencies = Vec::new();
    let mut booked = 0u64;
    let mut rejected = 0u64;
    for handle in handles {
        let (l, b, r) = handle.await.unwrap();
        latencies.extend(l);
        booked += b;
        rejected += r;
    }

    let elapsed = start.elapsed();
    println!(
        "  {} attempts in {:.2}s ({:.0}/s): {} booked, {} rejected",
        workers * attempts as usize,
        elapsed.as_secs_f64(),
        (workers * attempts as usize) as f64 / elapsed.as_secs_f64(),
        booked,
        rejected
    );
    print_latency("contended reserve", &mut latencies);

    // The point of the exercise: contention must never double-book.
    for table in ledger.list_tables() {
        let state = ledger.get_table_state(&table.id).unwrap();
        let guard = state.read().await;
        for pair in guard.reservations.windows(2) {
            assert!(
                pair[0].span.end <= pair[1].span.start,
                "table {} double-booked",
                table.id
            );
        }
    }
    println!("  invariant check passed: no double bookings");
}

#[tokio::main]
async fn main() {
    println!("phase 1: sequential bookings, one table");
    phase1_sequential().await;

    println!("phase 2: contended bookings, 10 tables, 32 workers");
    phase2_contended().await;
}
