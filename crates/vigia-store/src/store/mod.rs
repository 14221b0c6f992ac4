//! High-level store API.

pub mod fleet_store;
pub mod seed;

pub use fleet_store::FleetStore;
pub use seed::seed_baseline;
