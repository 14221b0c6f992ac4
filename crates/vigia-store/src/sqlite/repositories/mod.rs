//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`
//! parameter. This makes every operation a pure function from
//! (connection, input) → output, trivially testable in isolation.
//!
//! Repositories do plain reads and writes. Cross-entity rules (uniqueness
//! pre-checks, reference checks, delete guards) are composed one level up in
//! the store, inside a transaction.

pub mod cargo;
pub mod usuario;
pub mod moto;
pub mod camera;
pub mod reconhecimento;
pub mod registro;
pub mod log_alteracao;
