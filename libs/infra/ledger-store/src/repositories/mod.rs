// [libs/infra/ledger-store/src/repositories/mod.rs]
pub mod ledger;

pub use ledger::LedgerRepository;
