//! Services layer: external collaborators consumed by the domain logic.

pub mod provider;
pub use provider::*;
