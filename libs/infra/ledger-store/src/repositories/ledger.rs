// [libs/infra/ledger-store/src/repositories/ledger.rs]
use libsql::{params, Connection};

use crate::errors::StoreError;
use zakuro_models::ledger::{LedgerEntry, LedgerReason};

fn reason_label(reason: LedgerReason) -> &'static str {
    match reason {
        LedgerReason::Reserve => "reserve",
        LedgerReason::Settle => "settle",
        LedgerReason::Refund => "refund",
        LedgerReason::Deposit => "deposit",
    }
}

/// Durable mirror of the in-memory ledger's append-only log and cached
/// balance, written alongside every committed mutation. Read paths
/// (`/credits/{user}`, `/me`) serve from the in-memory engine; this
/// repository exists so balances survive a broker restart.
pub struct LedgerRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LedgerRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn append_entry(&self, entry: &LedgerEntry) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO ledger (ts, user_id, delta, reason, correlation_id, state)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'committed')",
                params![
                    entry.timestamp_ms,
                    entry.user_id.clone(),
                    entry.delta_micros,
                    reason_label(entry.reason),
                    entry.correlation_id.clone(),
                ],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn upsert_balance(&self, user_id: &str, balance_micros: i64) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO users (user_id, credits_balance) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET credits_balance = excluded.credits_balance",
                params![user_id, balance_micros],
            )
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    pub async fn cached_balance(&self, user_id: &str) -> Result<i64, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT credits_balance FROM users WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(StoreError::Query)?;

        match rows.next().await.map_err(StoreError::Query)? {
            Some(row) => row.get::<i64>(0).map_err(StoreError::Query),
            None => Ok(0),
        }
    }
}
