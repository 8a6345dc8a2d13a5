// [libs/domain/models/src/lib.rs]
//! Shared record types for the compute mesh: worker capacity/pricing,
//! user balances, ledger entries, request requirements and affinity
//! bindings. Pure data — no I/O, no business logic.

pub mod affinity;
pub mod ledger;
pub mod requirements;
pub mod user;
pub mod worker;

pub use affinity::AffinityEntry;
pub use ledger::LedgerEntry;
pub use requirements::{RequestRequirements, SelectionStrategy};
pub use user::UserRecord;
pub use worker::{HardwareDescriptor, Pricing, Resources, WorkerRecord, WorkerStatus};
