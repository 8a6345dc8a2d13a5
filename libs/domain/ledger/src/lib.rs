// [libs/domain/ledger/src/lib.rs]
//! Per-user credit accounting. Every mutation is atomic on a single
//! user's account; reservations and settlements on the same user
//! serialize through that account's mutex. Cross-user operations never
//! contend with each other.

pub mod sweeper;

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use zakuro_models::ledger::{LedgerEntry, LedgerReason};
use zakuro_models::user::UserRecord;

const HISTORY_CAPACITY: usize = 2000;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient credits: user {user_id} has {balance_micros} micros, needs {requested_micros}")]
    InsufficientCredits {
        user_id: String,
        balance_micros: i64,
        requested_micros: i64,
    },
    #[error("no reservation found for correlation_id {0}")]
    UnknownReservation(String),
    #[error("settle amount {actual_micros} exceeds reserved amount {reserved_micros}")]
    SettleExceedsReservation {
        actual_micros: i64,
        reserved_micros: i64,
    },
}

struct Account {
    record: UserRecord,
    history: VecDeque<LedgerEntry>,
}

impl Account {
    fn new(user_id: &str) -> Self {
        Self {
            record: UserRecord::new(user_id),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    fn push_entry(&mut self, delta_micros: i64, reason: LedgerReason, correlation_id: &str) {
        if self.history.len() >= HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(LedgerEntry {
            timestamp_ms: Utc::now().timestamp_millis(),
            user_id: self.record.user_id.clone(),
            delta_micros,
            reason,
            correlation_id: correlation_id.to_string(),
        });
    }
}

#[derive(Clone, Copy)]
struct Reservation {
    amount_micros: i64,
    created_at_ms: i64,
}

/// In-memory credit engine. `zakuro-ledger-store` provides an optional
/// persistent-backed variant with the same operation surface; the broker
/// falls back to this engine alone in `local_mode`.
pub struct CreditLedger {
    accounts: RwLock<HashMap<String, Mutex<Account>>>,
    reservations: Mutex<HashMap<String, (String, Reservation)>>,
}

impl Default for CreditLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditLedger {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            reservations: Mutex::new(HashMap::new()),
        }
    }

    fn ensure_account(&self, user_id: &str) {
        if self.accounts.read().expect("LOCK_POISONED").contains_key(user_id) {
            return;
        }
        let mut accounts = self.accounts.write().expect("LOCK_POISONED");
        accounts
            .entry(user_id.to_string())
            .or_insert_with(|| Mutex::new(Account::new(user_id)));
    }

    pub fn balance_micros(&self, user_id: &str) -> i64 {
        self.ensure_account(user_id);
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        accounts
            .get(user_id)
            .expect("ensured above")
            .lock()
            .expect("LOCK_POISONED")
            .record
            .balance_micros
    }

    pub fn user_record(&self, user_id: &str) -> UserRecord {
        self.ensure_account(user_id);
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        accounts
            .get(user_id)
            .expect("ensured above")
            .lock()
            .expect("LOCK_POISONED")
            .record
            .clone()
    }

    pub fn reserve(
        &self,
        user_id: &str,
        amount_micros: i64,
        correlation_id: &str,
    ) -> Result<(), LedgerError> {
        self.ensure_account(user_id);
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        let mut account = accounts
            .get(user_id)
            .expect("ensured above")
            .lock()
            .expect("LOCK_POISONED");

        if account.record.balance_micros < amount_micros {
            return Err(LedgerError::InsufficientCredits {
                user_id: user_id.to_string(),
                balance_micros: account.record.balance_micros,
                requested_micros: amount_micros,
            });
        }

        account.record.balance_micros -= amount_micros;
        account.push_entry(-amount_micros, LedgerReason::Reserve, correlation_id);
        drop(account);

        self.reservations.lock().expect("LOCK_POISONED").insert(
            correlation_id.to_string(),
            (
                user_id.to_string(),
                Reservation {
                    amount_micros,
                    created_at_ms: Utc::now().timestamp_millis(),
                },
            ),
        );
        Ok(())
    }

    pub fn settle(&self, correlation_id: &str, actual_micros: i64) -> Result<(), LedgerError> {
        let (user_id, reservation) = self
            .reservations
            .lock()
            .expect("LOCK_POISONED")
            .remove(correlation_id)
            .ok_or_else(|| LedgerError::UnknownReservation(correlation_id.to_string()))?;

        if actual_micros > reservation.amount_micros {
            return Err(LedgerError::SettleExceedsReservation {
                actual_micros,
                reserved_micros: reservation.amount_micros,
            });
        }

        let refund_difference = reservation.amount_micros - actual_micros;
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        let mut account = accounts
            .get(&user_id)
            .expect("reservation implies account exists")
            .lock()
            .expect("LOCK_POISONED");

        account.record.balance_micros += refund_difference;
        account.record.total_spent_micros += actual_micros;
        account.push_entry(refund_difference, LedgerReason::Settle, correlation_id);
        Ok(())
    }

    pub fn refund(&self, correlation_id: &str) -> Result<(), LedgerError> {
        let (user_id, reservation) = self
            .reservations
            .lock()
            .expect("LOCK_POISONED")
            .remove(correlation_id)
            .ok_or_else(|| LedgerError::UnknownReservation(correlation_id.to_string()))?;

        let accounts = self.accounts.read().expect("LOCK_POISONED");
        let mut account = accounts
            .get(&user_id)
            .expect("reservation implies account exists")
            .lock()
            .expect("LOCK_POISONED");

        account.record.balance_micros += reservation.amount_micros;
        account.push_entry(reservation.amount_micros, LedgerReason::Refund, correlation_id);
        Ok(())
    }

    pub fn add(&self, user_id: &str, amount_micros: i64, correlation_id: &str) {
        self.ensure_account(user_id);
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        let mut account = accounts
            .get(user_id)
            .expect("ensured above")
            .lock()
            .expect("LOCK_POISONED");
        account.record.balance_micros += amount_micros;
        account.push_entry(amount_micros, LedgerReason::Deposit, correlation_id);
    }

    pub fn history(&self, user_id: &str, limit: usize) -> Vec<LedgerEntry> {
        self.ensure_account(user_id);
        let accounts = self.accounts.read().expect("LOCK_POISONED");
        let account = accounts
            .get(user_id)
            .expect("ensured above")
            .lock()
            .expect("LOCK_POISONED");
        account
            .history
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Refunds every reservation older than `ttl_ms`. Called by the
    /// background sweeper; safe to call concurrently with `settle` since
    /// the reservation map entry is removed atomically — whichever wins
    /// the race, the other observes `UnknownReservation`.
    pub fn sweep_expired_reservations(&self, ttl_ms: i64) -> usize {
        let now = Utc::now().timestamp_millis();
        let expired_ids: Vec<String> = {
            let reservations = self.reservations.lock().expect("LOCK_POISONED");
            reservations
                .iter()
                .filter(|(_, (_, r))| now - r.created_at_ms > ttl_ms)
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut swept = 0;
        for id in expired_ids {
            if self.refund(&id).is_ok() {
                swept += 1;
            }
        }
        swept
    }
}
