// [libs/domain/ledger/src/sweeper.rs]
use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::CreditLedger;

/// Background daemon refunding reservations older than `ttl`. The only
/// writer of the reservation table besides `settle`/`refund` themselves;
/// guarantees no credits are leaked even if a client disconnects before
/// settlement completes.
pub fn spawn_reservation_sweeper(ledger: Arc<CreditLedger>, ttl: Duration, tick: Duration) {
    let mut ticker = interval(tick);

    tokio::spawn(async move {
        info!("reservation sweeper started");
        loop {
            ticker.tick().await;
            let swept = ledger.sweep_expired_reservations(ttl.as_millis() as i64);
            if swept > 0 {
                warn!(count = swept, "swept expired reservations");
            }
        }
    });
}
