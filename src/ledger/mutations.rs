use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;

use super::conflict::{conflicting, validate_span};
use super::{Ledger, LedgerError, TableEntry};

/// Successful `reserve` outcome: which reservation was created and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub reservation_id: Ulid,
    pub table_id: Ulid,
}

impl Ledger {
    /// Register a new table. Seats are fixed for the table's lifetime.
    pub async fn add_table(&self, seats: u32) -> Result<Ulid, LedgerError> {
        if seats == 0 {
            return Err(LedgerError::InvalidInput("seats must be positive"));
        }
        if seats > MAX_SEATS {
            return Err(LedgerError::LimitExceeded("too many seats"));
        }
        if self.tables.len() >= MAX_TABLES {
            return Err(LedgerError::LimitExceeded("too many tables"));
        }

        let id = Ulid::new();
        let event = Event::TableAdded { id, seats };
        self.journal_append(&event).await?;
        self.tables.insert(
            id,
            TableEntry {
                seats,
                state: Arc::new(RwLock::new(TableState::new(id, seats))),
            },
        );
        debug!("added table {id} with {seats} seats");
        Ok(id)
    }

    /// Book a table for `guests` over `[start, end)`. Selection, conflict
    /// re-check, and commit happen under one table write lock at a time, in
    /// ascending (seats, id) order; a lost race against a concurrent
    /// `reserve` surfaces as a conflict on re-check and the walk moves on
    /// to the next candidate.
    pub async fn reserve(
        &self,
        name: &str,
        guests: u32,
        start: Ms,
        end: Ms,
    ) -> Result<Confirmation, LedgerError> {
        if name.is_empty() {
            return Err(LedgerError::InvalidInput("guest name must not be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(LedgerError::LimitExceeded("guest name too long"));
        }
        if guests == 0 {
            return Err(LedgerError::InvalidInput("party size must be positive"));
        }
        if guests > MAX_GUESTS {
            return Err(LedgerError::LimitExceeded("party too large"));
        }
        if end <= start {
            return Err(LedgerError::InvalidInput("end must be after start"));
        }
        let span = Span::new(start, end);
        validate_span(&span)?;
        if !self.hours.is_within_hours(&span) {
            return Err(LedgerError::OutsideHours(span));
        }

        for (_, table_id) in self.candidates(guests) {
            let Some(state) = self.get_table_state(&table_id) else {
                continue;
            };
            let mut guard = state.write().await;
            if guard.reservations.len() >= MAX_RESERVATIONS_PER_TABLE {
                continue;
            }
            if conflicting(&guard, &span).is_some() {
                continue;
            }

            let id = Ulid::new();
            let event = Event::ReservationBooked {
                id,
                table_id,
                name: name.to_string(),
                guests,
                span,
            };
            self.persist_and_apply(&mut guard, &event).await?;
            debug!("booked {id} for {guests} guests on table {table_id}");
            return Ok(Confirmation {
                reservation_id: id,
                table_id,
            });
        }

        Err(LedgerError::NoTableAvailable { guests, span })
    }

    /// Cancel a reservation, freeing its interval on the assigned table.
    /// Returns the freed table's id; `NotFound` if the reservation does not
    /// exist (cancellation of a missing id is an error, not a no-op).
    pub async fn cancel(&self, reservation_id: Ulid) -> Result<Ulid, LedgerError> {
        let (table_id, mut guard) = self.resolve_reservation_write(&reservation_id).await?;
        let event = Event::ReservationCancelled {
            id: reservation_id,
            table_id,
        };
        self.persist_and_apply(&mut guard, &event).await?;
        debug!("cancelled {reservation_id} on table {table_id}");
        Ok(table_id)
    }
}
