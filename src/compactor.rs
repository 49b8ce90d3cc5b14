use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::ledger::Ledger;

/// Background task that rewrites the journal once enough appends have
/// accumulated since the last compaction.
pub async fn run_compactor(ledger: Arc<Ledger>, threshold: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        interval.tick().await;
        let appends = ledger.journal_appends_since_compact().await;
        if appends < threshold {
            continue;
        }
        match ledger.compact_journal().await {
            Ok(()) => info!("journal compacted after {appends} appends"),
            Err(e) => warn!("journal compaction failed: {e}"),
        }
    }
}
