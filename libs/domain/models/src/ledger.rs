// [libs/domain/models/src/ledger.rs]
use serde::{Deserialize, Serialize};

/// Append-only ledger row. `sum(delta_micros for user)` equals the
/// user's `balance_micros`; reservation rows are matched by
/// `correlation_id` to exactly one settlement or refund row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp_ms: i64,
    pub user_id: String,
    pub delta_micros: i64,
    pub reason: LedgerReason,
    pub correlation_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerReason {
    Reserve,
    Settle,
    Refund,
    Deposit,
}
