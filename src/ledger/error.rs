use ulid::Ulid;

use crate::model::Span;

#[derive(Debug)]
pub enum LedgerError {
    InvalidInput(&'static str),
    OutsideHours(Span),
    NoTableAvailable { guests: u32, span: Span },
    NotFound(Ulid),
    LimitExceeded(&'static str),
    StorageFailure(String),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            LedgerError::OutsideHours(span) => {
                write!(
                    f,
                    "interval [{}, {}) is outside opening hours",
                    span.start, span.end
                )
            }
            LedgerError::NoTableAvailable { guests, span } => {
                write!(
                    f,
                    "no table available for {guests} guests in [{}, {})",
                    span.start, span.end
                )
            }
            LedgerError::NotFound(id) => write!(f, "not found: {id}"),
            LedgerError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            LedgerError::StorageFailure(e) => write!(f, "journal error: {e}"),
        }
    }
}

impl std::error::Error for LedgerError {}
