use ulid::Ulid;

use crate::limits::*;
use crate::model::{Span, TableState};

use super::LedgerError;

/// Bounds-check a requested interval before it reaches any table.
pub(crate) fn validate_span(span: &Span) -> Result<(), LedgerError> {
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(LedgerError::LimitExceeded("timestamp out of range"));
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(LedgerError::LimitExceeded("interval too wide"));
    }
    Ok(())
}

/// First reservation on the table whose interval truly overlaps `span`,
/// where overlap is `NOT (existing.end <= span.start OR existing.start >=
/// span.end)`. Touching endpoints are not conflicts.
pub(crate) fn conflicting(table: &TableState, span: &Span) -> Option<Ulid> {
    table.overlapping(span).next().map(|r| r.id)
}

/// Whether the table can host `span`, judged against its current
/// reservations. `reserve` re-evaluates this under the table's write lock
/// immediately before commit, making check and insert one atomic unit.
pub fn is_available(table: &TableState, span: &Span) -> bool {
    conflicting(table, span).is_none()
}
