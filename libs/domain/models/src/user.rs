// [libs/domain/models/src/user.rs]
use serde::{Deserialize, Serialize};

/// A user's credit account. `balance_micros` is fixed-point: 1 credit =
/// 1_000_000 micros. Invariant: `balance_micros >= 0` at all times,
/// enforced by the ledger engine, never by this record directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub balance_micros: i64,
    pub total_spent_micros: i64,
    pub rate_limit_rps: Option<f64>,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            balance_micros: 0,
            total_spent_micros: 0,
            rate_limit_rps: None,
        }
    }

    pub fn balance_credits(&self) -> f64 {
        self.balance_micros as f64 / 1_000_000.0
    }
}

pub const MICROS_PER_CREDIT: i64 = 1_000_000;

pub fn credits_to_micros(credits: f64) -> i64 {
    (credits * MICROS_PER_CREDIT as f64).round() as i64
}

pub fn micros_to_credits(micros: i64) -> f64 {
    micros as f64 / MICROS_PER_CREDIT as f64
}
