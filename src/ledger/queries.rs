use chrono::{DateTime, NaiveDate};
use ulid::Ulid;

use crate::model::*;

use super::Ledger;

/// Civil date a timestamp falls on (naive local wall-clock).
pub(crate) fn civil_date(ms: Ms) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive())
}

impl Ledger {
    /// All reservations ordered by start ascending (ties by id), optionally
    /// restricted to those starting on the given civil date.
    pub async fn list(&self, date_filter: Option<NaiveDate>) -> Vec<ReservationInfo> {
        let mut rows = self.snapshot().await;
        if let Some(date) = date_filter {
            rows.retain(|r| civil_date(r.span.start) == Some(date));
        }
        rows.sort_by_key(|r| (r.span.start, r.id));
        rows
    }

    /// Reservations whose guest name contains `fragment`, case-sensitive,
    /// ordered by start ascending.
    pub async fn search(&self, fragment: &str) -> Vec<ReservationInfo> {
        let mut rows = self.snapshot().await;
        rows.retain(|r| r.name.contains(fragment));
        rows.sort_by_key(|r| (r.span.start, r.id));
        rows
    }

    pub async fn get_reservation(&self, id: Ulid) -> Option<ReservationInfo> {
        let table_id = self.table_for_reservation(&id)?;
        let state = self.get_table_state(&table_id)?;
        let guard = state.read().await;
        guard
            .reservations
            .iter()
            .find(|r| r.id == id)
            .map(|r| ReservationInfo {
                id: r.id,
                table_id,
                name: r.name.clone(),
                guests: r.guests,
                span: r.span,
            })
    }

    /// Tables ordered smallest-first (ties by id).
    pub fn list_tables(&self) -> Vec<TableInfo> {
        let mut rows: Vec<TableInfo> = self
            .tables
            .iter()
            .map(|e| TableInfo {
                id: *e.key(),
                seats: e.value().seats,
            })
            .collect();
        rows.sort_by_key(|t| (t.seats, t.id));
        rows
    }

    /// Per-table read-locked snapshot. Commits happen entirely under a
    /// table's write lock, so each table is seen either fully before or
    /// fully after any in-flight reservation.
    async fn snapshot(&self) -> Vec<ReservationInfo> {
        let mut rows = Vec::new();
        for table_id in self.table_ids() {
            let Some(state) = self.get_table_state(&table_id) else {
                continue;
            };
            let guard = state.read().await;
            rows.extend(guard.reservations.iter().map(|r| ReservationInfo {
                id: r.id,
                table_id,
                name: r.name.clone(),
                guests: r.guests,
                span: r.span,
            }));
        }
        rows
    }
}
