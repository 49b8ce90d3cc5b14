//! Hard input bounds enforced at the ledger boundary.

use crate::model::{DAY_MS, Ms};

/// Maximum number of tables in the dining room.
pub const MAX_TABLES: usize = 1_024;

/// Maximum reservations held on a single table.
pub const MAX_RESERVATIONS_PER_TABLE: usize = 65_536;

/// Maximum guest-name length in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Maximum seats on one table.
pub const MAX_SEATS: u32 = 512;

/// Maximum party size accepted by a reservation request.
pub const MAX_GUESTS: u32 = MAX_SEATS;

/// Earliest accepted instant (1970-01-01T00:00).
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// Latest accepted instant (2100-01-01T00:00).
pub const MAX_VALID_TIMESTAMP_MS: Ms = 4_102_444_800_000;

/// Widest accepted reservation interval.
pub const MAX_SPAN_DURATION_MS: Ms = DAY_MS;
