//! Domain logic for wallet transaction monitoring.

pub mod monitor;
pub use monitor::*;
