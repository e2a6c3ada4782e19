use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use chirpy_api::AppStateInner;

/// Background task that drops expired refresh tokens.
///
/// Validation already treats them as expired; this only keeps the document small.
pub async fn run_token_sweep(state: Arc<AppStateInner>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let db_state = state.clone();
        let result = tokio::task::spawn_blocking(move || {
            db_state.db.purge_expired_refresh_tokens(Utc::now())
        })
        .await;

        match result {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Sweep: removed {} expired refresh tokens", count);
                }
            }
            Ok(Err(e)) => warn!("Sweep error: {}", e),
            Err(e) => warn!("Sweep task failed: {}", e),
        }
    }
}
