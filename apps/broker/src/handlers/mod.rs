// [apps/broker/src/handlers/mod.rs]
pub mod credits;
pub mod execute;
pub mod me;
pub mod price;
pub mod workers;

pub use credits::{add_credits, get_credits};
pub use execute::execute;
pub use me::{health, whoami};
pub use price::estimate_price;
pub use workers::list_workers;
