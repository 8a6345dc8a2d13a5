// [apps/worker/src/handlers/mod.rs]
pub mod execute;
pub mod health;
pub mod info;

pub use execute::execute;
pub use health::{banner, health};
pub use info::info;
