// [libs/infra/ledger-store/src/schema.rs]
use libsql::Connection;

use crate::errors::StoreError;

/// Persistent state layout per the broker's external-interfaces contract:
/// a `users` snapshot table and an append-only `ledger` table.
pub async fn apply_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            email TEXT,
            credits_balance INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )
    .await
    .map_err(StoreError::Query)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ledger (
            ts INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            delta INTEGER NOT NULL,
            reason TEXT NOT NULL,
            correlation_id TEXT NOT NULL,
            state TEXT NOT NULL
        )",
        (),
    )
    .await
    .map_err(StoreError::Query)?;

    Ok(())
}
