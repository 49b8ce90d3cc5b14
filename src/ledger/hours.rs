use crate::model::{DAY_MS, HOUR_MS, Ms, Span};

/// The daily operating window, as milliseconds after local midnight.
/// Timestamps are naive local wall-clock, so the window is date-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    open_ms: Ms,
    close_ms: Ms,
}

impl Default for OperatingHours {
    /// The house hours: 11:00–22:00.
    fn default() -> Self {
        Self {
            open_ms: 11 * HOUR_MS,
            close_ms: 22 * HOUR_MS,
        }
    }
}

impl OperatingHours {
    /// A window from `open_ms` to `close_ms` after midnight. `close_ms` may
    /// be `DAY_MS` (a closing time of 24:00). None if the window is empty
    /// or falls outside one day.
    pub fn new(open_ms: Ms, close_ms: Ms) -> Option<Self> {
        if open_ms < 0 || open_ms >= close_ms || close_ms > DAY_MS {
            return None;
        }
        Some(Self { open_ms, close_ms })
    }

    pub fn open_ms(&self) -> Ms {
        self.open_ms
    }

    pub fn close_ms(&self) -> Ms {
        self.close_ms
    }

    /// True iff the span stays inside the operating window of the civil day
    /// it starts on. Spans crossing midnight are rejected even when both
    /// wall-clock times fall inside the window; with a closing time of
    /// 24:00, a span ending exactly at the next midnight is accepted.
    pub fn is_within_hours(&self, span: &Span) -> bool {
        let day_start = span.start.div_euclid(DAY_MS) * DAY_MS;
        let start_offset = span.start - day_start;
        let end_offset = span.end - day_start;
        start_offset >= self.open_ms && end_offset <= self.close_ms
    }
}
