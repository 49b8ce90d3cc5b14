use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds, naive local wall-clock — the only time type.
/// Instants are stored as if the restaurant's local time were UTC, so
/// time-of-day arithmetic is plain integer math on the day offset.
pub type Ms = i64;

pub const MINUTE_MS: Ms = 60_000;
pub const HOUR_MS: Ms = 3_600_000;
pub const DAY_MS: Ms = 86_400_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// Strict interval intersection. Touching endpoints
    /// (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A booked reservation as stored on its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub name: String,
    pub guests: u32,
    pub span: Span,
}

/// In-memory state of one dining table: identity, seat count, and the
/// reservations currently booked on it, sorted by `span.start`.
#[derive(Debug, Clone)]
pub struct TableState {
    pub id: Ulid,
    /// Seat capacity. Never changes after creation.
    pub seats: u32,
    pub reservations: Vec<Reservation>,
}

impl TableState {
    pub fn new(id: Ulid, seats: u32) -> Self {
        Self {
            id,
            seats,
            reservations: Vec::new(),
        }
    }

    /// Insert a reservation maintaining sort order by span.start.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.span.start, |r| r.span.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    /// Remove a reservation by id.
    pub fn remove_reservation(&mut self, id: Ulid) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    /// Return only reservations whose span overlaps the query window.
    /// Uses binary search to skip reservations starting at or after
    /// `query.end`; touching endpoints are filtered out by the end check.
    pub fn overlapping(&self, query: &Span) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.span.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.span.end > query.start)
    }
}

/// The event types — flat, no nesting. This is the journal record format;
/// replaying the sequence from an empty ledger reproduces current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    TableAdded {
        id: Ulid,
        seats: u32,
    },
    ReservationBooked {
        id: Ulid,
        table_id: Ulid,
        name: String,
        guests: u32,
        span: Span,
    },
    ReservationCancelled {
        id: Ulid,
        table_id: Ulid,
    },
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    pub id: Ulid,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationInfo {
    pub id: Ulid,
    pub table_id: Ulid,
    pub name: String,
    pub guests: u32,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked(start: Ms, end: Ms) -> Reservation {
        Reservation {
            id: Ulid::new(),
            name: "Guest".into(),
            guests: 2,
            span: Span::new(start, end),
        }
    }

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn reservation_ordering() {
        let mut ts = TableState::new(Ulid::new(), 4);
        ts.insert_reservation(booked(300, 400));
        ts.insert_reservation(booked(100, 200));
        ts.insert_reservation(booked(200, 300));
        assert_eq!(ts.reservations[0].span.start, 100);
        assert_eq!(ts.reservations[1].span.start, 200);
        assert_eq!(ts.reservations[2].span.start, 300);
    }

    #[test]
    fn reservation_remove() {
        let mut ts = TableState::new(Ulid::new(), 4);
        let r = booked(100, 200);
        let id = r.id;
        ts.insert_reservation(r);
        assert_eq!(ts.reservations.len(), 1);
        ts.remove_reservation(id);
        assert!(ts.reservations.is_empty());
    }

    #[test]
    fn remove_nonexistent_returns_none() {
        let mut ts = TableState::new(Ulid::new(), 4);
        ts.insert_reservation(booked(100, 200));
        assert!(ts.remove_reservation(Ulid::new()).is_none());
        assert_eq!(ts.reservations.len(), 1);
    }

    #[test]
    fn overlapping_skips_disjoint() {
        let mut ts = TableState::new(Ulid::new(), 4);
        ts.insert_reservation(booked(100, 200));
        ts.insert_reservation(booked(450, 600));
        ts.insert_reservation(booked(1000, 1100));

        let query = Span::new(500, 800);
        let hits: Vec<_> = ts.overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span, Span::new(450, 600));
    }

    #[test]
    fn overlapping_adjacent_not_included() {
        // A reservation ending exactly at query.start is not a hit (half-open).
        let mut ts = TableState::new(Ulid::new(), 4);
        ts.insert_reservation(booked(100, 200));
        let query = Span::new(200, 300);
        assert_eq!(ts.overlapping(&query).count(), 0);
    }

    #[test]
    fn overlapping_spanning_query() {
        let mut ts = TableState::new(Ulid::new(), 4);
        ts.insert_reservation(booked(0, 10_000));
        let query = Span::new(500, 600);
        assert_eq!(ts.overlapping(&query).count(), 1);
    }

    #[test]
    fn overlapping_empty_table() {
        let ts = TableState::new(Ulid::new(), 4);
        let query = Span::new(0, 1000);
        assert_eq!(ts.overlapping(&query).count(), 0);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::ReservationBooked {
            id: Ulid::new(),
            table_id: Ulid::new(),
            name: "Ada".into(),
            guests: 3,
            span: Span::new(1000, 2000),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let decoded: Event = bincode::deserialize(&bytes).unwrap();
        assert_eq!(event, decoded);
    }
}
