//! Toll-management domain model.
//!
//! # Responsibility
//! - Define the records exchanged between callers and the toll repository.
//! - Own input validation for vehicle registration.
//!
//! # Invariants
//! - Every record is identified by the integer primary key of its table.
//! - Validation runs before any write reaches SQL.

pub mod on_board_unit;
pub mod toll;
pub mod vehicle;

/// Owner of one or more vehicles.
pub type UserId = i64;
