// [libs/infra/ledger-store/src/lib.rs]
//! Optional persistence for the credit ledger. When no `DATABASE_URL` is
//! configured the broker runs on `zakuro-ledger`'s in-memory engine alone
//! (`local_mode`); when configured, this crate mirrors committed
//! mutations into a libSQL-backed `users`/`ledger` schema.

mod client;
mod errors;
mod schema;

pub mod repositories;

pub use client::SqlLedgerStore;
pub use errors::StoreError;
pub use repositories::LedgerRepository;
