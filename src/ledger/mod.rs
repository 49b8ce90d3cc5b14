mod conflict;
mod error;
pub mod hours;
mod mutations;
mod queries;
mod selector;

pub use conflict::is_available;
pub use error::LedgerError;
pub use hours::OperatingHours;
pub use mutations::Confirmation;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, oneshot};
use ulid::Ulid;

use crate::journal::Journal;
use crate::model::*;

pub type SharedTableState = Arc<RwLock<TableState>>;

/// One dining table as tracked by the ledger. Seats are immutable after
/// creation and cached outside the lock so candidate ranking never has to
/// acquire a table lock.
pub(super) struct TableEntry {
    pub(super) seats: u32,
    pub(super) state: SharedTableState,
}

// ── Group-commit journal channel ─────────────────────────

pub(super) enum JournalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the journal and batches appends for group
/// commit:
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond Ok to all senders.
async fn journal_writer_loop(mut journal: Journal, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            JournalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                loop {
                    match rx.try_recv() {
                        Ok(JournalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush the batch first, then handle the
                            // non-append command.
                            flush_and_respond(&mut journal, &mut batch);
                            handle_non_append(&mut journal, other);
                            break;
                        }
                        Err(_) => break, // channel empty — flush batch
                    }
                }

                if !batch.is_empty() {
                    flush_and_respond(&mut journal, &mut batch);
                }
            }
            other => handle_non_append(&mut journal, other),
        }
    }
}

fn flush_and_respond(journal: &mut Journal, batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>) {
    metrics::histogram!(crate::observability::JOURNAL_FLUSH_BATCH_SIZE)
        .record(batch.len() as f64);
    let flush_start = std::time::Instant::now();
    let result = flush_batch(journal, batch);
    metrics::histogram!(crate::observability::JOURNAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());
    for (_, tx) in batch.drain(..) {
        let r = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn flush_batch(
    journal: &mut Journal,
    batch: &[(Event, oneshot::Sender<io::Result<()>>)],
) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch.iter() {
        if let Err(e) = journal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = journal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn handle_non_append(journal: &mut Journal, cmd: JournalCommand) {
    match cmd {
        JournalCommand::Compact { events, response } => {
            let result = Journal::write_compact_file(journal.path(), &events)
                .and_then(|()| journal.swap_compact_file());
            let _ = response.send(result);
        }
        JournalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(journal.appends_since_compact());
        }
        JournalCommand::Append { .. } => unreachable!(),
    }
}

/// The reservation ledger: authoritative record of tables and reservations.
/// Sole mutator of both; every mutation is journaled before it is applied.
pub struct Ledger {
    tables: DashMap<Ulid, TableEntry>,
    journal_tx: mpsc::Sender<JournalCommand>,
    /// Reverse lookup: reservation id → table id.
    reservation_index: DashMap<Ulid, Ulid>,
    hours: OperatingHours,
}

/// Apply an event directly to a TableState (no locking — caller holds the
/// table's write lock, or is the sole owner during replay).
fn apply_to_table(ts: &mut TableState, event: &Event, index: &DashMap<Ulid, Ulid>) {
    match event {
        Event::ReservationBooked {
            id,
            table_id,
            name,
            guests,
            span,
        } => {
            ts.insert_reservation(Reservation {
                id: *id,
                name: name.clone(),
                guests: *guests,
                span: *span,
            });
            index.insert(*id, *table_id);
        }
        Event::ReservationCancelled { id, .. } => {
            ts.remove_reservation(*id);
            index.remove(id);
        }
        // TableAdded is handled at the map level, not here
        Event::TableAdded { .. } => {}
    }
}

impl Ledger {
    /// Open the ledger over the journal at `journal_path`, replaying any
    /// existing events into memory.
    pub fn open(journal_path: PathBuf, hours: OperatingHours) -> io::Result<Self> {
        let events = Journal::replay(&journal_path)?;
        let journal = Journal::open(&journal_path)?;
        let (journal_tx, journal_rx) = mpsc::channel(4096);
        tokio::spawn(journal_writer_loop(journal, journal_rx));

        let ledger = Self {
            tables: DashMap::new(),
            journal_tx,
            reservation_index: DashMap::new(),
            hours,
        };

        // Replay — we're the sole owner of these Arcs, so try_write always
        // succeeds instantly. Never blocking_write here: this may run inside
        // an async context.
        for event in &events {
            match event {
                Event::TableAdded { id, seats } => {
                    ledger.tables.insert(
                        *id,
                        TableEntry {
                            seats: *seats,
                            state: Arc::new(RwLock::new(TableState::new(*id, *seats))),
                        },
                    );
                }
                other => {
                    if let Some(table_id) = event_table_id(other)
                        && let Some(entry) = ledger.tables.get(&table_id)
                    {
                        let state = entry.state.clone();
                        drop(entry);
                        let mut guard = state.try_write().expect("replay: uncontended write");
                        apply_to_table(&mut guard, other, &ledger.reservation_index);
                    }
                }
            }
        }

        Ok(ledger)
    }

    pub fn hours(&self) -> &OperatingHours {
        &self.hours
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn get_table_state(&self, id: &Ulid) -> Option<SharedTableState> {
        self.tables.get(id).map(|e| e.state.clone())
    }

    pub fn table_for_reservation(&self, reservation_id: &Ulid) -> Option<Ulid> {
        self.reservation_index
            .get(reservation_id)
            .map(|e| *e.value())
    }

    pub(super) fn table_ids(&self) -> Vec<Ulid> {
        self.tables.iter().map(|e| *e.key()).collect()
    }

    /// Write an event to the journal via the background group-commit writer.
    async fn journal_append(&self, event: &Event) -> Result<(), LedgerError> {
        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| LedgerError::StorageFailure("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| LedgerError::StorageFailure("journal writer dropped response".into()))?
            .map_err(|e| LedgerError::StorageFailure(e.to_string()))
    }

    /// Journal-append + apply in one call. The caller holds the table's
    /// write lock, so the commit is invisible until the lock drops.
    pub(super) async fn persist_and_apply(
        &self,
        ts: &mut TableState,
        event: &Event,
    ) -> Result<(), LedgerError> {
        self.journal_append(event).await?;
        apply_to_table(ts, event, &self.reservation_index);
        Ok(())
    }

    /// Lookup reservation → table, acquire the table's write lock, and
    /// verify the reservation is still present (it may have been cancelled
    /// while we waited for the lock).
    pub(super) async fn resolve_reservation_write(
        &self,
        reservation_id: &Ulid,
    ) -> Result<(Ulid, tokio::sync::OwnedRwLockWriteGuard<TableState>), LedgerError> {
        let table_id = self
            .table_for_reservation(reservation_id)
            .ok_or(LedgerError::NotFound(*reservation_id))?;
        let state = self
            .get_table_state(&table_id)
            .ok_or(LedgerError::NotFound(table_id))?;
        let guard = state.write_owned().await;
        if !guard.reservations.iter().any(|r| r.id == *reservation_id) {
            return Err(LedgerError::NotFound(*reservation_id));
        }
        Ok((table_id, guard))
    }

    /// Rewrite the journal with only the events needed to recreate the
    /// current state: every table, then its live reservations.
    pub async fn compact_journal(&self) -> Result<(), LedgerError> {
        let mut events = Vec::new();
        for table_id in self.table_ids() {
            let Some(entry) = self.tables.get(&table_id) else {
                continue;
            };
            let seats = entry.seats;
            let state = entry.state.clone();
            drop(entry);

            let guard = state.read().await;
            events.push(Event::TableAdded {
                id: table_id,
                seats,
            });
            for r in &guard.reservations {
                events.push(Event::ReservationBooked {
                    id: r.id,
                    table_id,
                    name: r.name.clone(),
                    guests: r.guests,
                    span: r.span,
                });
            }
        }

        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Compact {
                events,
                response: tx,
            })
            .await
            .map_err(|_| LedgerError::StorageFailure("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| LedgerError::StorageFailure("journal writer dropped response".into()))?
            .map_err(|e| LedgerError::StorageFailure(e.to_string()))
    }

    pub async fn journal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .journal_tx
            .send(JournalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// Extract the table id from an event (None for table-level events).
fn event_table_id(event: &Event) -> Option<Ulid> {
    match event {
        Event::ReservationBooked { table_id, .. }
        | Event::ReservationCancelled { table_id, .. } => Some(*table_id),
        Event::TableAdded { .. } => None,
    }
}
