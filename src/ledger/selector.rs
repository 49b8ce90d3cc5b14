use ulid::Ulid;

use crate::model::Span;

use super::conflict::is_available;
use super::Ledger;

/// Rank candidate tables for a party: capacity-sufficient only, smallest
/// seat count first, ties broken by ascending table id. The (seats, id)
/// ordering makes selection deterministic and is also the lock acquisition
/// order during `reserve`.
pub(crate) fn rank_candidates(
    tables: impl Iterator<Item = (Ulid, u32)>,
    guests: u32,
) -> Vec<(u32, Ulid)> {
    let mut candidates: Vec<(u32, Ulid)> = tables
        .filter(|(_, seats)| *seats >= guests)
        .map(|(id, seats)| (seats, id))
        .collect();
    candidates.sort();
    candidates
}

impl Ledger {
    pub(super) fn candidates(&self, guests: u32) -> Vec<(u32, Ulid)> {
        rank_candidates(
            self.tables.iter().map(|e| (*e.key(), e.value().seats)),
            guests,
        )
    }

    /// Smallest-fit probe: the table `reserve` would commit to if nothing
    /// changes between this call and the commit. Read-only; returns None
    /// when no capacity-sufficient table is free for the whole interval.
    pub async fn find_table(&self, guests: u32, span: &Span) -> Option<Ulid> {
        for (_, table_id) in self.candidates(guests) {
            let Some(state) = self.get_table_state(&table_id) else {
                continue;
            };
            let guard = state.read().await;
            if is_available(&guard, span) {
                return Some(table_id);
            }
        }
        None
    }
}
