//! # vigia-store
//!
//! Relational integrity store for the Vigia vehicle-tracking backend.
//!
//! This is the core subsystem, responsible for:
//!
//! - **Entities**: cargos, usuarios, motos, cameras, reconhecimentos,
//!   registros, and the log_alteracoes audit trail
//! - **Integrity rules**: case-insensitive uniqueness, foreign-key existence
//!   checks, and block-on-dependents delete guards
//! - **`SQLite` backend**: `rusqlite` facade with repository pattern, one
//!   stateless repository per entity
//! - **`FleetStore`**: high-level transactional API — every write runs its
//!   checks and its mutation inside a single transaction
//! - **Seeding**: idempotent baseline dataset inserted through the public API
//! - **Migrations**: version-tracked SQL schema evolution

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;
pub mod validate;

pub use errors::{Result, StoreError};
pub use sqlite::connection::{new_file, new_in_memory, ConnectionConfig, ConnectionPool};
pub use sqlite::migrations::run_migrations;
pub use store::fleet_store::FleetStore;
pub use store::seed::seed_baseline;
