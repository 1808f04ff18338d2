use std::time::Duration;
use tracing::{info, warn};

use portal_api::AppState;
use portal_api::updates::prune_expired;

/// Background task that prunes expired updates.
///
/// The same age purge also runs inline on every updates read; this loop only
/// guarantees the 48 h bound holds through quiet periods. Both paths are
/// idempotent deletes keyed by condition, so their interleaving is safe.
pub async fn run_retention_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let db = state.clone();
        match tokio::task::spawn_blocking(move || prune_expired(&db.db)).await {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Retention sweep: pruned {} expired updates", count);
                }
            }
            Ok(Err(e)) => warn!("Retention sweep error: {}", e),
            Err(e) => warn!("Retention sweep task error: {}", e),
        }
    }
}
